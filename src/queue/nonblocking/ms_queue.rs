//! Michael & Scott's unbounded lock-free linked queue.
//!
//! Backs the `concurrent` and `michael_scott` CLI variants (the ground
//! truth's `moodycamel`-backed queue and its generic "concurrent lock free
//! queue" are both, at heart, MS-style linked queues). Memory reclamation
//! uses `crossbeam_epoch`, re-exported by the `crossbeam` umbrella crate.

use crossbeam::epoch::{self, Atomic, Owned, Shared};
use std::sync::atomic::Ordering;

use crate::queue::NonBlockingQueue;

struct Node<E> {
    data: Option<E>,
    next: Atomic<Node<E>>,
}

pub struct MsQueueBacking<E> {
    head: Atomic<Node<E>>,
    tail: Atomic<Node<E>>,
}

impl<E> MsQueueBacking<E> {
    pub fn new() -> Self {
        let sentinel = Owned::new(Node { data: None, next: Atomic::null() });
        let guard = epoch::pin();
        let sentinel = sentinel.into_shared(&guard);
        Self { head: Atomic::from(sentinel), tail: Atomic::from(sentinel) }
    }
}

impl<E> Default for MsQueueBacking<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Send + 'static> NonBlockingQueue<E> for MsQueueBacking<E> {
    fn try_enqueue(&self, portion: E) -> Result<(), E> {
        let guard = epoch::pin();
        let mut new_node = Owned::new(Node { data: Some(portion), next: Atomic::null() });
        loop {
            let tail_shared = self.tail.load(Ordering::Acquire, &guard);
            // SAFETY: tail is never unlinked while reachable; nodes behind
            // it are only reclaimed after this epoch's guard is dropped.
            let tail_ref = unsafe { tail_shared.deref() };
            let next = tail_ref.next.load(Ordering::Acquire, &guard);
            if next.is_null() {
                match tail_ref.next.compare_exchange(
                    Shared::null(),
                    new_node,
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
                        return Ok(());
                    }
                    Err(failure) => {
                        new_node = failure.new;
                        continue;
                    }
                }
            } else {
                // Tail lagged behind; help advance it before retrying.
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

    fn try_dequeue(&self) -> Option<E> {
        let guard = epoch::pin();
        loop {
            let head_shared = self.head.load(Ordering::Acquire, &guard);
            // SAFETY: see try_enqueue.
            let head_ref = unsafe { head_shared.deref() };
            let next = head_ref.next.load(Ordering::Acquire, &guard);
            let next_ptr = match unsafe { next.as_ref() } {
                None => return None,
                Some(_) => next,
            };
            match self.head.compare_exchange(
                head_shared,
                next_ptr,
                Ordering::AcqRel,
                Ordering::Acquire,
                &guard,
            ) {
                Ok(_) => {
                    // SAFETY: the old sentinel is unreachable after the CAS
                    // above; the epoch guard defers its actual reclamation
                    // until no thread can still hold a reference.
                    let data = unsafe {
                        let next_raw = next_ptr.as_raw() as *mut Node<E>;
                        (*next_raw).data.take()
                    };
                    unsafe { guard.defer_destroy(head_shared) };
                    return data;
                }
                Err(_) => continue,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn fifo_within_single_thread() {
        let queue = MsQueueBacking::new();
        queue.try_enqueue(1).unwrap();
        queue.try_enqueue(2).unwrap();
        assert_eq!(queue.try_dequeue(), Some(1));
        assert_eq!(queue.try_dequeue(), Some(2));
        assert_eq!(queue.try_dequeue(), None);
    }

    #[test]
    fn concurrent_producers_and_consumers_conserve_totals() {
        let queue = Arc::new(MsQueueBacking::new());
        let producers: Vec<_> = (0..4)
            .map(|_| {
                let q = queue.clone();
                thread::spawn(move || {
                    for i in 0..1000 {
                        while q.try_enqueue(i).is_err() {}
                    }
                })
            })
            .collect();
        for p in producers {
            p.join().unwrap();
        }
        let mut count = 0;
        while queue.try_dequeue().is_some() {
            count += 1;
        }
        assert_eq!(count, 4000);
    }
}
