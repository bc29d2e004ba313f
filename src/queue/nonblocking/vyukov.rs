//! Vyukov's bounded MPMC ring buffer, using a per-slot sequence number to
//! let producers and consumers race over the same ring without a lock.
//!
//! Backs the `vyukov` CLI variant directly. The ground truth's
//! `kirsch_bounded_kfifo_queue` (backing `kirsch_bounded_1fifo`) is also a
//! bounded ring with per-slot accounting and has no Rust-crate binding; the
//! hand-rolled Vyukov ring is the closest grounded behavioral equivalent,
//! exposed as a second thin wrapper type over the same core.

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::queue::NonBlockingQueue;

struct Cell<E> {
    sequence: AtomicUsize,
    value: UnsafeCell<MaybeUninit<E>>,
}

/// Private ring shared by `VyukovBoundedQueueBacking` and
/// `KirschBounded1FifoQueueBacking`.
struct VyukovRing<E> {
    buffer: Box<[Cell<E>]>,
    mask: usize,
    enqueue_pos: AtomicUsize,
    dequeue_pos: AtomicUsize,
}

unsafe impl<E: Send> Send for VyukovRing<E> {}
unsafe impl<E: Send> Sync for VyukovRing<E> {}

impl<E> VyukovRing<E> {
    fn new(capacity: usize) -> Self {
        let capacity = capacity.max(2).next_power_of_two();
        let buffer = (0..capacity)
            .map(|i| Cell { sequence: AtomicUsize::new(i), value: UnsafeCell::new(MaybeUninit::uninit()) })
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self { buffer, mask: capacity - 1, enqueue_pos: AtomicUsize::new(0), dequeue_pos: AtomicUsize::new(0) }
    }

    fn capacity(&self) -> usize {
        self.mask + 1
    }

    fn try_enqueue(&self, portion: E) -> Result<(), E> {
        let mut pos = self.enqueue_pos.load(Ordering::Relaxed);
        loop {
            let cell = &self.buffer[pos & self.mask];
            let seq = cell.sequence.load(Ordering::Acquire);
            let diff = seq as isize - pos as isize;
            if diff == 0 {
                match self.enqueue_pos.compare_exchange_weak(
                    pos,
                    pos + 1,
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => {
                        unsafe { (*cell.value.get()).write(portion) };
                        cell.sequence.store(pos + 1, Ordering::Release);
                        return Ok(());
                    }
                    Err(current) => pos = current,
                }
            } else if diff < 0 {
                return Err(portion);
            } else {
                pos = self.enqueue_pos.load(Ordering::Relaxed);
            }
        }
    }

    fn try_dequeue(&self) -> Option<E> {
        let mut pos = self.dequeue_pos.load(Ordering::Relaxed);
        loop {
            let cell = &self.buffer[pos & self.mask];
            let seq = cell.sequence.load(Ordering::Acquire);
            let diff = seq as isize - (pos as isize + 1);
            if diff == 0 {
                match self.dequeue_pos.compare_exchange_weak(
                    pos,
                    pos + 1,
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => {
                        let value = unsafe { (*cell.value.get()).assume_init_read() };
                        cell.sequence.store(pos + self.mask + 1, Ordering::Release);
                        return Some(value);
                    }
                    Err(current) => pos = current,
                }
            } else if diff < 0 {
                return None;
            } else {
                pos = self.dequeue_pos.load(Ordering::Relaxed);
            }
        }
    }
}

/// Backs the `vyukov` CLI variant.
pub struct VyukovBoundedQueueBacking<E> {
    ring: VyukovRing<E>,
}

impl<E> VyukovBoundedQueueBacking<E> {
    pub fn new(capacity: usize) -> Self {
        Self { ring: VyukovRing::new(capacity) }
    }

    pub fn rounded_capacity(&self) -> usize {
        self.ring.capacity()
    }
}

impl<E: Send> NonBlockingQueue<E> for VyukovBoundedQueueBacking<E> {
    fn try_enqueue(&self, portion: E) -> Result<(), E> {
        self.ring.try_enqueue(portion)
    }

    fn try_dequeue(&self) -> Option<E> {
        self.ring.try_dequeue()
    }
}

/// Backs the `kirsch_bounded_1fifo` CLI variant.
pub struct KirschBounded1FifoQueueBacking<E> {
    ring: VyukovRing<E>,
}

impl<E> KirschBounded1FifoQueueBacking<E> {
    pub fn new(capacity: usize) -> Self {
        Self { ring: VyukovRing::new(capacity) }
    }

    pub fn rounded_capacity(&self) -> usize {
        self.ring.capacity()
    }
}

impl<E: Send> NonBlockingQueue<E> for KirschBounded1FifoQueueBacking<E> {
    fn try_enqueue(&self, portion: E) -> Result<(), E> {
        self.ring.try_enqueue(portion)
    }

    fn try_dequeue(&self) -> Option<E> {
        self.ring.try_dequeue()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn fifo_within_capacity() {
        let queue = VyukovBoundedQueueBacking::new(4);
        queue.try_enqueue(1).unwrap();
        queue.try_enqueue(2).unwrap();
        assert_eq!(queue.try_dequeue(), Some(1));
        assert_eq!(queue.try_dequeue(), Some(2));
        assert_eq!(queue.try_dequeue(), None);
    }

    #[test]
    fn rejects_when_full() {
        let queue = VyukovBoundedQueueBacking::new(2);
        queue.try_enqueue(1).unwrap();
        queue.try_enqueue(2).unwrap();
        assert_eq!(queue.try_enqueue(3), Err(3));
    }

    #[test]
    fn capacity_rounds_up_to_power_of_two() {
        let queue = VyukovBoundedQueueBacking::<i32>::new(5);
        assert_eq!(queue.rounded_capacity(), 8);
    }

    #[test]
    fn concurrent_producers_and_consumers_conserve_totals() {
        let queue = Arc::new(VyukovBoundedQueueBacking::new(64));
        let producers: Vec<_> = (0..4)
            .map(|_| {
                let q = queue.clone();
                thread::spawn(move || {
                    for i in 0..2000 {
                        while q.try_enqueue(i).is_err() {
                            std::thread::yield_now();
                        }
                    }
                })
            })
            .collect();
        let consumer_queue = queue.clone();
        let consumer = thread::spawn(move || {
            let mut count = 0;
            while count < 8000 {
                if consumer_queue.try_dequeue().is_some() {
                    count += 1;
                }
            }
            count
        });
        for p in producers {
            p.join().unwrap();
        }
        assert_eq!(consumer.join().unwrap(), 8000);
    }
}
