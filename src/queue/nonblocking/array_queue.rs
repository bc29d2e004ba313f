//! Capacity-bounded, ring-backed MPMC queues with no Rust-crate binding for
//! their original library.
//!
//! Ground truth: `oneapi::tbb::concurrent_bounded_queue` for
//! `onetbb_bounded`, `xenium::nikolaev_bounded_queue` for
//! `nikolaev_bounded`. Both are ring-backed bounded MPMC queues; both share
//! `crossbeam::queue::ArrayQueue` as their backing, distinguished by wrapper
//! type. `nikolaev_bounded` additionally rounds its requested capacity up
//! to a power of two, per `NikolaevBoundedPortionQueue`'s
//! `1 << ceil(log2(maxSize))`.

use crossbeam::queue::ArrayQueue;

use crate::queue::NonBlockingQueue;

/// Backs the `onetbb_bounded` CLI variant. Capacity is used as given.
pub struct ArrayQueueBacking<E> {
    queue: ArrayQueue<E>,
}

impl<E> ArrayQueueBacking<E> {
    pub fn new(capacity: usize) -> Self {
        Self { queue: ArrayQueue::new(capacity.max(1)) }
    }
}

impl<E: Send> NonBlockingQueue<E> for ArrayQueueBacking<E> {
    fn try_enqueue(&self, portion: E) -> Result<(), E> {
        self.queue.push(portion)
    }

    fn try_dequeue(&self) -> Option<E> {
        self.queue.pop()
    }
}

/// Backs the `nikolaev_bounded` CLI variant. Capacity is rounded up to the
/// next power of two, matching the ground truth's hard requirement.
pub struct NikolaevBoundedQueueBacking<E> {
    queue: ArrayQueue<E>,
}

impl<E> NikolaevBoundedQueueBacking<E> {
    pub fn new(capacity: usize) -> Self {
        Self { queue: ArrayQueue::new(capacity.max(1).next_power_of_two()) }
    }

    /// The rounded-up capacity actually in effect.
    pub fn rounded_capacity(&self) -> usize {
        self.queue.capacity()
    }
}

impl<E: Send> NonBlockingQueue<E> for NikolaevBoundedQueueBacking<E> {
    fn try_enqueue(&self, portion: E) -> Result<(), E> {
        self.queue.push(portion)
    }

    fn try_dequeue(&self) -> Option<E> {
        self.queue.pop()
    }
}
