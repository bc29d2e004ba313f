//! Builds the boxed `MpmcPortionQueue` for a named CLI variant.
//!
//! Direct translation of the ground truth's small `create*BlownQueue`
//! factory functions, one per named backing: a single match arm per
//! `Variant` constructing the right `BlownQueue<Grille, _>` (or monolithic
//! queue), boxed behind the shared trait object.

use crate::cli::Variant;
use crate::grille::Grille;

use super::nonblocking::{
    ArrayQueueBacking, Kirsch1FifoQueueBacking, KirschBounded1FifoQueueBacking, MsQueueBacking,
    NikolaevBoundedQueueBacking, NikolaevQueueBacking, OneTbbQueueBacking, RamalheteQueueBacking,
    SegQueueBacking, SpinlockQueueBacking, VyukovBoundedQueueBacking,
};
use super::{BlownQueue, MpmcPortionQueue, SyncBoundedQueue, TextbookQueue};

/// Build the queue for `variant`, sized to `max_queue_size` (already
/// rounded up by the caller for backings that require a power of two).
pub fn build_queue(variant: Variant, max_queue_size: usize) -> Box<dyn MpmcPortionQueue<Grille>> {
    match variant {
        Variant::Concurrent => Box::new(BlownQueue::new(MsQueueBacking::new(), max_queue_size)),
        Variant::MichaelScott => Box::new(BlownQueue::new(MsQueueBacking::new(), max_queue_size)),
        Variant::Atomic => Box::new(BlownQueue::new(SpinlockQueueBacking::new(), max_queue_size)),
        Variant::Lockfree => Box::new(BlownQueue::new(SegQueueBacking::new(), max_queue_size)),
        Variant::Onetbb => Box::new(BlownQueue::new(OneTbbQueueBacking::new(), max_queue_size)),
        Variant::Nikolaev => Box::new(BlownQueue::new(NikolaevQueueBacking::new(), max_queue_size)),
        Variant::OnetbbBounded => {
            Box::new(BlownQueue::new(ArrayQueueBacking::new(max_queue_size), max_queue_size))
        }
        Variant::NikolaevBounded => {
            let backing = NikolaevBoundedQueueBacking::new(max_queue_size);
            let rounded = backing.rounded_capacity();
            Box::new(BlownQueue::with_clone_on_retry(backing, rounded, true))
        }
        Variant::Ramalhete => {
            Box::new(BlownQueue::new(RamalheteQueueBacking::new(), max_queue_size))
        }
        Variant::Kirsch1Fifo => {
            Box::new(BlownQueue::new(Kirsch1FifoQueueBacking::new(), max_queue_size))
        }
        Variant::Vyukov => {
            let backing = VyukovBoundedQueueBacking::new(max_queue_size);
            let rounded = backing.rounded_capacity();
            Box::new(BlownQueue::new(backing, rounded))
        }
        Variant::KirschBounded1Fifo => {
            let backing = KirschBounded1FifoQueueBacking::new(max_queue_size);
            let rounded = backing.rounded_capacity();
            Box::new(BlownQueue::new(backing, rounded))
        }
        Variant::Textbook => Box::new(TextbookQueue::new(max_queue_size)),
        Variant::SyncBounded => Box::new(SyncBoundedQueue::new(max_queue_size)),
        Variant::Syncless | Variant::Serial => {
            unreachable!("syncless/serial drivers do not use a shared queue")
        }
    }
}
