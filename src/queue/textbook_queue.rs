//! A monolithic bounded MPMC queue: single mutex, `VecDeque`, two condition
//! variables. Included as a hand-written baseline for benchmarking against
//! the `BlownQueue`-wrapped backings.

use std::collections::VecDeque;

use parking_lot::{Condvar, Mutex};

use super::MpmcPortionQueue;

struct State<E> {
    items: VecDeque<E>,
    work_done: bool,
}

/// Ground truth (`BlockingPortionQueue.hpp::TextbookPortionQueue`) takes the
/// mutex even to read `size` — it is not tracked as a separate atomic. This
/// crate mirrors that.
pub struct TextbookQueue<E> {
    state: Mutex<State<E>>,
    not_full: Condvar,
    not_empty: Condvar,
    max_size: usize,
}

impl<E> TextbookQueue<E> {
    pub fn new(max_size: usize) -> Self {
        Self {
            state: Mutex::new(State { items: VecDeque::new(), work_done: false }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
            max_size,
        }
    }
}

impl<E: Send> MpmcPortionQueue<E> for TextbookQueue<E> {
    fn add_portion(&self, portion: E) {
        let mut state = self.state.lock();
        while state.items.len() >= self.max_size {
            self.not_full.wait(&mut state);
        }
        state.items.push_back(portion);
        self.not_empty.notify_all();
    }

    fn retrieve_portion(&self) -> Option<E> {
        let mut state = self.state.lock();
        loop {
            if let Some(portion) = state.items.pop_front() {
                self.not_full.notify_all();
                return Some(portion);
            }
            if state.work_done {
                return None;
            }
            self.not_empty.wait(&mut state);
        }
    }

    fn ensure_all_portions_are_retrieved(&self) {
        let mut state = self.state.lock();
        self.not_empty.notify_all();
        while !state.items.is_empty() {
            // No dedicated empty condvar in the textbook design: the
            // producer side simply polls on not_full's wakeups, mirroring
            // the single-mutex baseline's simplicity.
            drop(state);
            std::thread::yield_now();
            state = self.state.lock();
        }
    }

    fn stop_consumers(&self, _consumer_count: usize) {
        let mut state = self.state.lock();
        state.work_done = true;
        self.not_empty.notify_all();
    }

    fn get_size(&self) -> usize {
        self.state.lock().items.len()
    }

    fn get_max_size(&self) -> usize {
        self.max_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_then_retrieve_round_trips() {
        let queue = TextbookQueue::new(4);
        queue.add_portion(1);
        queue.add_portion(2);
        assert_eq!(queue.get_size(), 2);
        assert_eq!(queue.retrieve_portion(), Some(1));
        assert_eq!(queue.retrieve_portion(), Some(2));
    }

    #[test]
    fn stop_consumers_unblocks_waiting_retrieve() {
        use std::sync::Arc;
        use std::thread;

        let queue = Arc::new(TextbookQueue::<i32>::new(4));
        let worker = queue.clone();
        let handle = thread::spawn(move || worker.retrieve_portion());
        thread::sleep(std::time::Duration::from_millis(20));
        queue.stop_consumers(1);
        assert_eq!(handle.join().unwrap(), None);
    }
}
