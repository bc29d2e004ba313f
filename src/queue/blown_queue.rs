//! `BlownQueue`: turns any `NonBlockingQueue` into a strict-capacity MPMC
//! queue with blocking back-pressure.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crossbeam::utils::CachePadded;
use parking_lot::{Condvar, Mutex};

use super::{MpmcPortionQueue, NonBlockingQueue};

/// Wraps a [`NonBlockingQueue`] backing with an atomic size counter and a
/// single shared mutex backing three condition variables, giving the
/// backing strict-capacity, blocking MPMC semantics.
///
/// The wake hints (`producer_waiting` / `consumer_waiting`) keep the
/// uncontended fast path purely atomic: a mutex is taken only when a waiter
/// has published itself. The mutex must be the one shared by all three
/// condvars, or a waiter publishing itself between a would-be waker's hint
/// check and its mutex acquisition would be a lost wakeup.
pub struct BlownQueue<E, Q: NonBlockingQueue<E>> {
    backing: Q,
    size: CachePadded<AtomicUsize>,
    max_size: usize,
    work_done: AtomicBool,
    producer_waiting: AtomicBool,
    consumer_waiting: AtomicBool,
    mutex: Mutex<()>,
    not_full: Condvar,
    not_empty: Condvar,
    empty: Condvar,
    /// The `NikolaevBounded` backing corrupts the caller's value when a
    /// failed push moves out of it; for that backing only, `add_portion`
    /// clones before each retry instead of moving.
    clone_on_retry: bool,
    _marker: std::marker::PhantomData<E>,
}

impl<E, Q: NonBlockingQueue<E>> BlownQueue<E, Q> {
    /// Build a blown queue over `backing` with the given capacity.
    pub fn new(backing: Q, max_size: usize) -> Self {
        Self::with_clone_on_retry(backing, max_size, false)
    }

    /// Build a blown queue whose `add_portion` clones on every retry,
    /// working around the `NikolaevBounded` move-on-failed-push bug.
    pub fn with_clone_on_retry(backing: Q, max_size: usize, clone_on_retry: bool) -> Self {
        Self {
            backing,
            size: CachePadded::new(AtomicUsize::new(0)),
            max_size,
            work_done: AtomicBool::new(false),
            producer_waiting: AtomicBool::new(false),
            consumer_waiting: AtomicBool::new(false),
            mutex: Mutex::new(()),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
            empty: Condvar::new(),
            clone_on_retry,
            _marker: std::marker::PhantomData,
        }
    }

    fn wait_for_room(&self) {
        if self.size.load(Ordering::Acquire) >= self.max_size {
            self.producer_waiting.store(true, Ordering::Release);
            let mut guard = self.mutex.lock();
            while self.size.load(Ordering::Acquire) >= self.max_size {
                self.not_full.wait(&mut guard);
            }
        }
    }

    fn after_enqueue(&self) {
        self.size.fetch_add(1, Ordering::Release);
        if self.consumer_waiting.compare_exchange(
            true,
            false,
            Ordering::AcqRel,
            Ordering::Relaxed,
        ).is_ok() {
            let _guard = self.mutex.lock();
            self.not_empty.notify_all();
        }
    }

    fn after_dequeue(&self) {
        let new_size = self.size.fetch_sub(1, Ordering::AcqRel) - 1;
        if self.producer_waiting.compare_exchange(
            true,
            false,
            Ordering::AcqRel,
            Ordering::Relaxed,
        ).is_ok() {
            let _guard = self.mutex.lock();
            self.not_full.notify_all();
        }
        if new_size == 0 {
            let _guard = self.mutex.lock();
            self.empty.notify_all();
        }
    }

    /// Add a portion by cloning it on each retry rather than moving it,
    /// used only by the `nikolaev_bounded` backing's factory function.
    pub fn add_portion_by_clone(&self, portion: &E)
    where
        E: Clone,
    {
        loop {
            self.wait_for_room();
            match self.backing.try_enqueue(portion.clone()) {
                Ok(()) => break,
                Err(_rejected) => continue,
            }
        }
        self.after_enqueue();
    }
}

impl<E: Send + Clone, Q: NonBlockingQueue<E>> MpmcPortionQueue<E> for BlownQueue<E, Q> {
    fn add_portion(&self, portion: E) {
        if self.clone_on_retry {
            self.add_portion_by_clone(&portion);
            return;
        }
        let mut portion = portion;
        loop {
            self.wait_for_room();
            match self.backing.try_enqueue(portion) {
                Ok(()) => break,
                Err(rejected) => {
                    portion = rejected;
                    continue;
                }
            }
        }
        self.after_enqueue();
    }

    fn retrieve_portion(&self) -> Option<E> {
        if let Some(portion) = self.backing.try_dequeue() {
            self.after_dequeue();
            return Some(portion);
        }
        let mut guard = self.mutex.lock();
        loop {
            if let Some(portion) = self.backing.try_dequeue() {
                drop(guard);
                self.after_dequeue();
                return Some(portion);
            }
            if self.work_done.load(Ordering::Acquire) {
                return None;
            }
            self.consumer_waiting.store(true, Ordering::Release);
            self.not_empty.wait(&mut guard);
        }
    }

    fn ensure_all_portions_are_retrieved(&self) {
        let mut guard = self.mutex.lock();
        self.not_empty.notify_all();
        while self.size.load(Ordering::Acquire) != 0 {
            self.empty.wait(&mut guard);
        }
    }

    fn stop_consumers(&self, _consumer_count: usize) {
        let _guard = self.mutex.lock();
        self.work_done.store(true, Ordering::Release);
        self.not_empty.notify_all();
    }

    fn get_size(&self) -> usize {
        self.size.load(Ordering::Acquire)
    }

    fn get_max_size(&self) -> usize {
        self.max_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::nonblocking::spinlock_queue::SpinlockQueueBacking;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn add_then_retrieve_round_trips() {
        let queue = BlownQueue::new(SpinlockQueueBacking::new(), 4);
        queue.add_portion(1);
        queue.add_portion(2);
        assert_eq!(queue.get_size(), 2);
        assert_eq!(queue.retrieve_portion(), Some(1));
        assert_eq!(queue.retrieve_portion(), Some(2));
        assert_eq!(queue.get_size(), 0);
    }

    #[test]
    fn stop_consumers_unblocks_waiting_retrieve() {
        let queue = Arc::new(BlownQueue::new(SpinlockQueueBacking::<i32>::new(), 4));
        let worker_queue = queue.clone();
        let handle = thread::spawn(move || worker_queue.retrieve_portion());
        thread::sleep(std::time::Duration::from_millis(20));
        queue.stop_consumers(1);
        assert_eq!(handle.join().unwrap(), None);
    }

    #[test]
    fn capacity_never_exceeded_under_concurrent_load() {
        let max_size = 4;
        let queue = Arc::new(BlownQueue::new(SpinlockQueueBacking::new(), max_size));
        let producers: Vec<_> = (0..4)
            .map(|_| {
                let q = queue.clone();
                thread::spawn(move || {
                    for i in 0..50 {
                        q.add_portion(i);
                        assert!(q.get_size() <= max_size);
                    }
                })
            })
            .collect();
        let consumer_queue = queue.clone();
        let consumer = thread::spawn(move || {
            let mut received = 0;
            while received < 200 {
                if consumer_queue.retrieve_portion().is_some() {
                    received += 1;
                }
            }
        });
        for p in producers {
            p.join().unwrap();
        }
        consumer.join().unwrap();
        assert_eq!(queue.get_size(), 0);
    }
}
