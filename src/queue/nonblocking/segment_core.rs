//! Shared core for the segment-based unbounded queues.
//!
//! An atomically-published linked list of fixed-size slot arrays
//! ("segments"); producers and consumers each claim a slot index within the
//! current segment via `fetch_add`, and move to the next segment once
//! theirs is exhausted. This is the shape shared by the `ramalhete` and
//! `kirsch_1fifo` CLI variants — the ground truth backs them with two
//! different libraries (a queue in the Ramalhete/Correia lineage, and
//! `kirsch_kfifo_queue`) that are, behaviorally, the same segment-queue
//! design; the spec's own framing of "alternative implementations and
//! redundant snapshots" licenses one shared core behind two distinctly
//! named public wrapper types.

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

use crossbeam::epoch::{self, Atomic, Owned};

const SEGMENT_SIZE: usize = 128;

const SLOT_EMPTY: u8 = 0;
const SLOT_FULL: u8 = 1;

struct Slot<E> {
    state: AtomicU8,
    value: UnsafeCell<MaybeUninit<E>>,
}

impl<E> Slot<E> {
    fn empty() -> Self {
        Self { state: AtomicU8::new(SLOT_EMPTY), value: UnsafeCell::new(MaybeUninit::uninit()) }
    }
}

struct Segment<E> {
    slots: Box<[Slot<E>]>,
    push_index: AtomicUsize,
    pop_index: AtomicUsize,
    next: Atomic<Segment<E>>,
}

impl<E> Segment<E> {
    fn new() -> Self {
        let slots = (0..SEGMENT_SIZE).map(|_| Slot::empty()).collect::<Vec<_>>().into_boxed_slice();
        Self { slots, push_index: AtomicUsize::new(0), pop_index: AtomicUsize::new(0), next: Atomic::null() }
    }
}

/// Private core shared by every segment-queue wrapper type.
pub(crate) struct SegmentQueueCore<E> {
    head: Atomic<Segment<E>>,
    tail: Atomic<Segment<E>>,
}

impl<E> SegmentQueueCore<E> {
    pub(crate) fn new() -> Self {
        let guard = epoch::pin();
        let first = Owned::new(Segment::new()).into_shared(&guard);
        Self { head: Atomic::from(first), tail: Atomic::from(first) }
    }

    pub(crate) fn try_enqueue(&self, portion: E) -> Result<(), E> {
        let guard = epoch::pin();
        let mut portion = Some(portion);
        loop {
            let tail_shared = self.tail.load(Ordering::Acquire, &guard);
            // SAFETY: segments are only reclaimed after being unlinked from
            // both head and tail, guarded by the epoch.
            let tail_ref = unsafe { tail_shared.deref() };
            let index = tail_ref.push_index.fetch_add(1, Ordering::AcqRel);
            if index < SEGMENT_SIZE {
                let slot = &tail_ref.slots[index];
                unsafe { (*slot.value.get()).write(portion.take().unwrap()) };
                slot.state.store(SLOT_FULL, Ordering::Release);
                return Ok(());
            }

            // This segment is full; make sure a follow-on segment exists,
            // then advance `tail` and retry.
            let next = tail_ref.next.load(Ordering::Acquire, &guard);
            if next.is_null() {
                let new_segment = Owned::new(Segment::new());
                match tail_ref.next.compare_exchange(
                    next,
                    new_segment,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                    &guard,
                ) {
                    Ok(linked) => {
                        let _ = self.tail.compare_exchange(
                            tail_shared,
                            linked,
                            Ordering::AcqRel,
                            Ordering::Acquire,
                            &guard,
                        );
                    }
                    Err(_) => continue,
                }
            } else {
                let _ = self.tail.compare_exchange(
                    tail_shared,
                    next,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                    &guard,
                );
            }
        }
    }

    pub(crate) fn try_dequeue(&self) -> Option<E> {
        let guard = epoch::pin();
        loop {
            let head_shared = self.head.load(Ordering::Acquire, &guard);
            // SAFETY: see try_enqueue.
            let head_ref = unsafe { head_shared.deref() };
            let index = head_ref.pop_index.fetch_add(1, Ordering::AcqRel);
            if index < SEGMENT_SIZE {
                let slot = &head_ref.slots[index];
                if slot.state.load(Ordering::Acquire) == SLOT_FULL {
                    let value = unsafe { (*slot.value.get()).assume_init_read() };
                    return Some(value);
                }
                // Claimed a slot the matching producer hasn't published yet;
                // per the NonBlockingQueue contract this is a spurious miss,
                // not emptiness.
                return None;
            }

            // This segment is drained; move to the next one if it exists.
            let next = head_ref.next.load(Ordering::Acquire, &guard);
            if next.is_null() {
                return None;
            }
            if self
                .head
                .compare_exchange(head_shared, next, Ordering::AcqRel, Ordering::Acquire, &guard)
                .is_ok()
            {
                unsafe { guard.defer_destroy(head_shared) };
            }
        }
    }
}

unsafe impl<E: Send> Send for SegmentQueueCore<E> {}
unsafe impl<E: Send> Sync for SegmentQueueCore<E> {}

macro_rules! segment_queue_backing {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        pub struct $name<E> {
            core: SegmentQueueCore<E>,
        }

        impl<E> $name<E> {
            pub fn new() -> Self {
                Self { core: SegmentQueueCore::new() }
            }
        }

        impl<E> Default for $name<E> {
            fn default() -> Self {
                Self::new()
            }
        }

        impl<E: Send> crate::queue::NonBlockingQueue<E> for $name<E> {
            fn try_enqueue(&self, portion: E) -> Result<(), E> {
                self.core.try_enqueue(portion)
            }

            fn try_dequeue(&self) -> Option<E> {
                self.core.try_dequeue()
            }
        }
    };
}

segment_queue_backing!(RamalheteQueueBacking, "Backs the `ramalhete` CLI variant.");
segment_queue_backing!(Kirsch1FifoQueueBacking, "Backs the `kirsch_1fifo` CLI variant.");
