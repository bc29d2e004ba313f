//! Self-tuning fleet: fixed producers enumerate the ordinal space into a
//! shared bounded queue; a dynamically-tuned pool of consumers drains it
//! and scores each grille.

use std::sync::atomic::{AtomicIsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::utils::CachePadded;
use parking_lot::Mutex;

use crate::constants::{TUNER_GROW_THRESHOLD, TUNER_SHRINK_THRESHOLD};
use crate::context::CrackerContext;
use crate::grille::{Grille, GrilleEnumerator};
use crate::queue::MpmcPortionQueue;

struct TunerState {
    improving: i64,
    adding_threads: bool,
    prev_grilles_per_second: f64,
    best_consumer_count: usize,
}

/// `consumer_count` and `shutdown_n_consumers` may transiently go negative
/// under contention (fetch-then-adjust is not atomic as a pair); the
/// invariant is restored by the compensating increment in
/// `ProducerConsumerDriver::maybe_shutdown`.
struct ProducerConsumerMetrics {
    consumer_count: CachePadded<AtomicIsize>,
    shutdown_n_consumers: CachePadded<AtomicIsize>,
    tuner: Mutex<TunerState>,
}

impl ProducerConsumerMetrics {
    fn new(initial_consumer_count: usize) -> Self {
        Self {
            consumer_count: CachePadded::new(AtomicIsize::new(initial_consumer_count as isize)),
            shutdown_n_consumers: CachePadded::new(AtomicIsize::new(0)),
            tuner: Mutex::new(TunerState {
                improving: 0,
                adding_threads: true,
                prev_grilles_per_second: 0.0,
                best_consumer_count: initial_consumer_count,
            }),
        }
    }
}

pub struct ProducerConsumerDriver {
    context: Arc<CrackerContext>,
    queue: Arc<dyn MpmcPortionQueue<Grille>>,
    metrics: ProducerConsumerMetrics,
    half_side: usize,
    producer_count: usize,
    consumer_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl ProducerConsumerDriver {
    pub fn new(
        context: Arc<CrackerContext>,
        queue: Box<dyn MpmcPortionQueue<Grille>>,
        half_side: usize,
        producer_count: usize,
        initial_consumer_count: usize,
    ) -> Arc<Self> {
        Arc::new(Self {
            context,
            queue: Arc::from(queue),
            metrics: ProducerConsumerMetrics::new(initial_consumer_count),
            half_side,
            producer_count: producer_count.max(1),
            consumer_handles: Mutex::new(Vec::new()),
        })
    }

    /// Run the workload to completion, following the termination sequence
    /// exactly: join producers, drain the queue, busy-wait for conservation,
    /// stop consumers, join consumers.
    pub fn run(self: &Arc<Self>) {
        let grille_count = self.context.grille_count;
        let per_producer = grille_count / self.producer_count as u64;

        let producer_handles: Vec<_> = (0..self.producer_count)
            .map(|i| {
                let begin = i as u64 * per_producer;
                let end = if i == self.producer_count - 1 { grille_count } else { begin + per_producer };
                let queue = self.queue.clone();
                let half_side = self.half_side;
                thread::spawn(move || {
                    let mut enumerator = GrilleEnumerator::new(half_side, begin, end);
                    while let Some(grille) = enumerator.clone_next() {
                        queue.add_portion(grille);
                    }
                })
            })
            .collect();

        let initial_consumer_count = self.metrics.consumer_count.load(Ordering::Relaxed).max(0) as usize;
        for _ in 0..initial_consumer_count {
            self.spawn_one_consumer();
        }

        for handle in producer_handles {
            handle.join().expect("producer thread panicked");
        }

        // Step 2: ensure every accepted portion has been retrieved.
        self.queue.ensure_all_portions_are_retrieved();

        // Step 3: guard against consumers finishing their last batch before
        // ensure_all_portions_are_retrieved returns. No consumers are
        // spawned or stopped during this window.
        while self.context.grille_count_so_far() != grille_count {
            std::hint::spin_loop();
        }

        // Step 4: shut down consumers, then step 5: join them.
        let consumer_count = self.metrics.consumer_count.load(Ordering::Acquire).max(0) as usize;
        self.queue.stop_consumers(consumer_count);

        let handles = std::mem::take(&mut *self.consumer_handles.lock());
        for handle in handles {
            handle.join().expect("consumer thread panicked");
        }
    }

    /// `"best consumer threads: N"`, folded into the final summary line.
    pub fn milestones_summary(&self) -> String {
        format!("best consumer threads: {}", self.metrics.tuner.lock().best_consumer_count)
    }

    /// Number of consumer threads still tracked as live. Reaches 0 only
    /// after every consumer has joined.
    pub fn consumer_count(&self) -> isize {
        self.metrics.consumer_count.load(Ordering::Acquire)
    }

    fn spawn_one_consumer(self: &Arc<Self>) {
        let driver = Arc::clone(self);
        let handle = thread::spawn(move || driver.consumer_loop());
        self.consumer_handles.lock().push(handle);
    }

    fn consumer_loop(self: Arc<Self>) {
        let mut already_decremented = false;
        loop {
            let grille = match self.queue.retrieve_portion() {
                Some(grille) => grille,
                None => break,
            };
            let (_count, crossed) = self.context.apply_and_register(&grille);
            if crossed {
                self.try_milestone();
            }
            if self.maybe_shutdown() {
                already_decremented = true;
                break;
            }
        }
        if !already_decremented {
            self.metrics.consumer_count.fetch_sub(1, Ordering::AcqRel);
        }
    }

    /// Consult `shutdown_n_consumers`: if positive, CAS-decrement; if the
    /// decrement wins and `consumer_count > 1`, this consumer should exit;
    /// otherwise both counters are reverted and the consumer continues.
    /// Protects against over-shrinking the pool to zero.
    fn maybe_shutdown(&self) -> bool {
        let current = self.metrics.shutdown_n_consumers.load(Ordering::Relaxed);
        if current <= 0 {
            return false;
        }
        if self
            .metrics
            .shutdown_n_consumers
            .compare_exchange(current, current - 1, Ordering::AcqRel, Ordering::Relaxed)
            .is_err()
        {
            return false;
        }
        let consumer_count_before = self.metrics.consumer_count.fetch_sub(1, Ordering::AcqRel);
        if consumer_count_before > 1 {
            return true;
        }
        self.metrics.consumer_count.fetch_add(1, Ordering::AcqRel);
        self.metrics.shutdown_n_consumers.fetch_add(1, Ordering::AcqRel);
        false
    }

    /// The milestone tuner: biased `+1`/`-2` thresholds so the pool grows
    /// eagerly and shrinks only after two consecutive degradations,
    /// guarded end-to-end by `CrackerContext::try_tick_milestone`'s
    /// try-lock — a contended attempt skips the whole tuner silently.
    fn try_milestone(self: &Arc<Self>) {
        let Some((gps, best_gps)) = self.context.try_tick_milestone() else {
            return;
        };

        let consumer_count_now = self.metrics.consumer_count.load(Ordering::Acquire).max(0) as usize;
        self.context.log_milestone(
            gps,
            best_gps,
            &format!(
                "consumer threads: {consumer_count_now}; queue size: {} / {}",
                self.queue.get_size(),
                self.queue.get_max_size()
            ),
        );

        let mut should_spawn_consumer = false;
        {
            let mut tuner = self.metrics.tuner.lock();
            let consumer_count = self.metrics.consumer_count.load(Ordering::Acquire).max(0) as usize;

            if gps >= best_gps {
                tuner.best_consumer_count = consumer_count;
            }

            // The ground truth guards the whole grow/shrink decision (and
            // the prev-speed update it depends on) with this same check:
            // the final grille's milestone must not spawn or stop a
            // consumer during the termination sequence's conservation
            // busy-wait (SPEC_FULL §4.5 step 3).
            if self.context.grille_count_so_far() < self.context.grille_count {
                if gps < tuner.prev_grilles_per_second {
                    tuner.improving -= 1;
                } else if gps > tuner.prev_grilles_per_second {
                    tuner.improving += 1;
                }

                if tuner.improving >= TUNER_GROW_THRESHOLD || tuner.improving <= TUNER_SHRINK_THRESHOLD {
                    if tuner.improving <= TUNER_SHRINK_THRESHOLD {
                        tuner.adding_threads = !tuner.adding_threads;
                    }
                    tuner.improving = 0;
                    if tuner.adding_threads {
                        self.metrics.consumer_count.fetch_add(1, Ordering::AcqRel);
                        should_spawn_consumer = true;
                    } else {
                        self.metrics.shutdown_n_consumers.fetch_add(1, Ordering::AcqRel);
                    }
                }

                tuner.prev_grilles_per_second = gps;
            }
        }

        if should_spawn_consumer {
            self.spawn_one_consumer();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::factory::build_queue;
    use crate::scoring::{CipherScorer, WordsTrie};
    use crate::cli::Variant;

    fn tiny_context() -> Arc<CrackerContext> {
        let scorer = CipherScorer::new("ABCDEFGHIJKLMNOP", WordsTrie::empty());
        Arc::new(CrackerContext::new("ABCDEFGHIJKLMNOP".to_string(), 4, 256, scorer, false))
    }

    #[test]
    fn conserves_all_grilles_with_single_consumer() {
        let context = tiny_context();
        let queue = build_queue(Variant::Textbook, 16);
        let driver = ProducerConsumerDriver::new(context.clone(), queue, 2, 2, 1);
        driver.run();
        assert_eq!(context.grille_count_so_far(), 256);
        assert_eq!(driver.consumer_count(), 0);
    }

    #[test]
    fn self_tuner_converges_and_joins_every_consumer() {
        let context = tiny_context();
        let queue = build_queue(Variant::Textbook, 16);
        let driver = ProducerConsumerDriver::new(context.clone(), queue, 2, 2, 1);
        driver.run();
        assert_eq!(context.grille_count_so_far(), 256);
        assert_eq!(driver.consumer_count(), 0);
        assert!(driver.milestones_summary().starts_with("best consumer threads: "));
    }
}
