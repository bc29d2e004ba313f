//! Concrete `NonBlockingQueue` backings.
//!
//! Each backing is a behavioral equivalent of a named backing in the
//! original search space, grounded either in a hand-rolled algorithm or, for
//! the several ground-truth backings that lean on a C++ lock-free queue
//! library with no Rust-crate equivalent binding, in `crossbeam::queue`.

pub mod array_queue;
pub mod ms_queue;
pub mod seg_queue;
pub mod segment_core;
pub mod spinlock_queue;
pub mod vyukov;

pub use array_queue::{ArrayQueueBacking, NikolaevBoundedQueueBacking};
pub use ms_queue::MsQueueBacking;
pub use seg_queue::{NikolaevQueueBacking, OneTbbQueueBacking, SegQueueBacking};
pub use segment_core::{Kirsch1FifoQueueBacking, RamalheteQueueBacking};
pub use spinlock_queue::SpinlockQueueBacking;
pub use vyukov::{KirschBounded1FifoQueueBacking, VyukovBoundedQueueBacking};
