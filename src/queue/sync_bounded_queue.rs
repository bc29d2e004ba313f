//! A second monolithic bounded MPMC queue, structurally distinct from
//! `TextbookQueue`: a fixed `Vec` ring buffer with head/tail indices rather
//! than a `VecDeque`, so the two remain genuinely alternative designs
//! rather than one type under two names.

use parking_lot::{Condvar, Mutex};

use super::MpmcPortionQueue;

struct Ring<E> {
    slots: Vec<Option<E>>,
    head: usize,
    tail: usize,
    len: usize,
    work_done: bool,
}

pub struct SyncBoundedQueue<E> {
    ring: Mutex<Ring<E>>,
    not_full: Condvar,
    not_empty: Condvar,
    empty: Condvar,
    capacity: usize,
}

impl<E> SyncBoundedQueue<E> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self {
            ring: Mutex::new(Ring { slots, head: 0, tail: 0, len: 0, work_done: false }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
            empty: Condvar::new(),
            capacity,
        }
    }
}

impl<E: Send> MpmcPortionQueue<E> for SyncBoundedQueue<E> {
    fn add_portion(&self, portion: E) {
        let mut ring = self.ring.lock();
        while ring.len >= self.capacity {
            self.not_full.wait(&mut ring);
        }
        let tail = ring.tail;
        ring.slots[tail] = Some(portion);
        ring.tail = (tail + 1) % self.capacity;
        ring.len += 1;
        self.not_empty.notify_all();
    }

    fn retrieve_portion(&self) -> Option<E> {
        let mut ring = self.ring.lock();
        loop {
            if ring.len > 0 {
                let head = ring.head;
                let portion = ring.slots[head].take();
                ring.head = (head + 1) % self.capacity;
                ring.len -= 1;
                if ring.len == 0 {
                    self.empty.notify_all();
                }
                self.not_full.notify_all();
                return portion;
            }
            if ring.work_done {
                return None;
            }
            self.not_empty.wait(&mut ring);
        }
    }

    fn ensure_all_portions_are_retrieved(&self) {
        let mut ring = self.ring.lock();
        self.not_empty.notify_all();
        while ring.len != 0 {
            self.empty.wait(&mut ring);
        }
    }

    fn stop_consumers(&self, _consumer_count: usize) {
        let mut ring = self.ring.lock();
        ring.work_done = true;
        self.not_empty.notify_all();
    }

    fn get_size(&self) -> usize {
        self.ring.lock().len
    }

    fn get_max_size(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_then_retrieve_round_trips_through_wraparound() {
        let queue = SyncBoundedQueue::new(3);
        for i in 0..9 {
            queue.add_portion(i);
            assert_eq!(queue.retrieve_portion(), Some(i));
        }
    }

    #[test]
    fn capacity_is_enforced() {
        use std::sync::Arc;
        use std::thread;

        let queue = Arc::new(SyncBoundedQueue::new(2));
        queue.add_portion(1);
        queue.add_portion(2);
        assert_eq!(queue.get_size(), 2);

        let producer_queue = queue.clone();
        let handle = thread::spawn(move || producer_queue.add_portion(3));
        thread::sleep(std::time::Duration::from_millis(20));
        assert_eq!(queue.get_size(), 2);
        queue.retrieve_portion();
        handle.join().unwrap();
        assert_eq!(queue.get_size(), 2);
    }
}
