//! Unbounded, unlimited-growth MPMC queues with no Rust-crate binding for
//! their original library.
//!
//! The ground truth backs `lockfree` with `boost::lockfree::queue`,
//! `onetbb` with `oneapi::tbb::concurrent_queue`, and `nikolaev` with
//! `xenium::nikolaev_queue` — three distinct libraries that are, at the
//! `try_enqueue`/`try_dequeue` granularity this crate cares about,
//! behaviorally identical: unbounded segment-backed MPMC queues that never
//! reject a push. There is no idiomatic Rust crate binding for any of the
//! three specific algorithms, so all three share one backing,
//! `crossbeam::queue::SegQueue`, distinguished by a distinctly named and
//! documented wrapper type per CLI variant.

use crossbeam::queue::SegQueue;

use crate::queue::NonBlockingQueue;

/// Shared plumbing for the `SegQueue`-backed variants.
struct SegQueueBackingInner<E> {
    queue: SegQueue<E>,
}

impl<E> SegQueueBackingInner<E> {
    fn new() -> Self {
        Self { queue: SegQueue::new() }
    }

    fn try_enqueue(&self, portion: E) -> Result<(), E> {
        self.queue.push(portion);
        Ok(())
    }

    fn try_dequeue(&self) -> Option<E> {
        self.queue.pop()
    }
}

macro_rules! seg_queue_backing {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        pub struct $name<E> {
            inner: SegQueueBackingInner<E>,
        }

        impl<E> $name<E> {
            pub fn new() -> Self {
                Self { inner: SegQueueBackingInner::new() }
            }
        }

        impl<E> Default for $name<E> {
            fn default() -> Self {
                Self::new()
            }
        }

        impl<E: Send> NonBlockingQueue<E> for $name<E> {
            fn try_enqueue(&self, portion: E) -> Result<(), E> {
                self.inner.try_enqueue(portion)
            }

            fn try_dequeue(&self) -> Option<E> {
                self.inner.try_dequeue()
            }
        }
    };
}

seg_queue_backing!(SegQueueBacking, "Backs the `lockfree` CLI variant.");
seg_queue_backing!(OneTbbQueueBacking, "Backs the `onetbb` CLI variant.");
seg_queue_backing!(NikolaevQueueBacking, "Backs the `nikolaev` CLI variant.");
