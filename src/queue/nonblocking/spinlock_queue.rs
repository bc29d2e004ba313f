//! A `VecDeque` behind a test-and-set spinlock.
//!
//! The simplest possible non-blocking backing: not lock-free in the formal
//! sense, but still non-blocking at the `try_enqueue`/`try_dequeue`
//! granularity the composite `BlownQueue` needs (the actual CV-based
//! blocking lives one layer up). Backs the `atomic` CLI variant.

use std::cell::UnsafeCell;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::queue::NonBlockingQueue;

pub struct SpinlockQueueBacking<E> {
    locked: AtomicBool,
    items: UnsafeCell<VecDeque<E>>,
}

unsafe impl<E: Send> Sync for SpinlockQueueBacking<E> {}

impl<E> SpinlockQueueBacking<E> {
    pub fn new() -> Self {
        Self { locked: AtomicBool::new(false), items: UnsafeCell::new(VecDeque::new()) }
    }

    fn with_lock<R>(&self, f: impl FnOnce(&mut VecDeque<E>) -> R) -> R {
        while self
            .locked
            .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            std::hint::spin_loop();
        }
        // SAFETY: the compare_exchange above is the sole gate into this
        // critical section; exactly one thread holds `locked == true`.
        let result = f(unsafe { &mut *self.items.get() });
        self.locked.store(false, Ordering::Release);
        result
    }
}

impl<E> Default for SpinlockQueueBacking<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Send> NonBlockingQueue<E> for SpinlockQueueBacking<E> {
    fn try_enqueue(&self, portion: E) -> Result<(), E> {
        self.with_lock(|items| items.push_back(portion));
        Ok(())
    }

    fn try_dequeue(&self) -> Option<E> {
        self.with_lock(|items| items.pop_front())
    }
}
