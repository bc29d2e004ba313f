//! Queue-free baseline: a fixed pool of workers, each owning an exclusive
//! sub-range of the ordinal space, with no shared queue between them.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam::utils::CachePadded;

use crate::context::CrackerContext;
use crate::grille::GrilleEnumerator;

/// Per-worker completion: grilles applied so far and the fixed length of
/// that worker's ordinal range, mirroring the ground truth's
/// `grilleIntervalsCompletion: Vec<(atomic<u64>, u64)>` used only for the
/// verbose "completion per thread" milestone line.
struct WorkerCompletion {
    processed: CachePadded<AtomicU64>,
    interval_length: u64,
}

impl WorkerCompletion {
    fn percent(&self) -> f64 {
        let processed = self.processed.load(Ordering::Relaxed);
        if self.interval_length == 0 {
            return 100.0;
        }
        processed as f64 * 100.0 / self.interval_length as f64
    }
}

pub struct SynclessDriver {
    context: Arc<CrackerContext>,
    half_side: usize,
    worker_count: usize,
    workers_live: CachePadded<AtomicI64>,
    completion: Vec<WorkerCompletion>,
}

impl SynclessDriver {
    pub fn new(context: Arc<CrackerContext>, half_side: usize, worker_count: usize) -> Self {
        let worker_count = worker_count.max(1);
        let grille_count = context.grille_count;
        let per_worker = grille_count / worker_count as u64;
        let completion = (0..worker_count)
            .map(|i| {
                let begin = i as u64 * per_worker;
                let end = if i == worker_count - 1 { grille_count } else { begin + per_worker };
                WorkerCompletion { processed: CachePadded::new(AtomicU64::new(0)), interval_length: end - begin }
            })
            .collect();
        Self {
            context,
            half_side,
            worker_count,
            workers_live: CachePadded::new(AtomicI64::new(0)),
            completion,
        }
    }

    /// Partition `[0, grille_count)` into `worker_count` contiguous ranges
    /// and run one worker thread per range to completion. Each worker owns
    /// its enumerator outright via `borrow_next`, so there is no handoff
    /// and no queue contention to amortize.
    pub fn run(self: &Arc<Self>) {
        let grille_count = self.context.grille_count;
        let per_worker = grille_count / self.worker_count as u64;
        self.workers_live.store(self.worker_count as i64, Ordering::Release);

        let handles: Vec<_> = (0..self.worker_count)
            .map(|i| {
                let begin = i as u64 * per_worker;
                let end = if i == self.worker_count - 1 { grille_count } else { begin + per_worker };
                let driver = Arc::clone(self);
                thread::spawn(move || {
                    let mut enumerator = GrilleEnumerator::new(driver.half_side, begin, end);
                    while let Some(grille) = enumerator.borrow_next() {
                        let (_count, crossed) = driver.context.apply_and_register(grille);
                        driver.completion[i].processed.fetch_add(1, Ordering::Relaxed);
                        if crossed {
                            driver.try_milestone();
                        }
                    }
                    driver.workers_live.fetch_sub(1, Ordering::AcqRel);
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("syncless worker panicked");
        }
    }

    /// Best-effort milestone tick, guarded the same way as the
    /// producer/consumer driver's: a contended tuner-state lock skips the
    /// attempt silently. There is no tuner here, only the verbose status
    /// line with per-thread completion.
    fn try_milestone(&self) {
        let Some((gps, best_gps)) = self.context.try_tick_milestone() else {
            return;
        };
        let workers_live = self.workers_live.load(Ordering::Acquire);
        let completion_status: String =
            self.completion.iter().map(|c| format!("{:.1}", c.percent())).collect::<Vec<_>>().join("/");
        self.context.log_milestone(
            gps,
            best_gps,
            &format!("worker threads: {workers_live}; completion per thread: {completion_status}% done"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{CipherScorer, WordsTrie};

    #[test]
    fn conserves_every_grille_across_workers() {
        let scorer = CipherScorer::new("ABCDEFGHIJKLMNOP", WordsTrie::empty());
        let context = Arc::new(CrackerContext::new("ABCDEFGHIJKLMNOP".to_string(), 4, 256, scorer, false));
        let driver = Arc::new(SynclessDriver::new(Arc::clone(&context), 2, 4));
        driver.run();
        assert_eq!(context.grille_count_so_far(), 256);
    }

    #[test]
    fn single_worker_still_completes() {
        let scorer = CipherScorer::new("ABCDEFGHIJKLMNOP", WordsTrie::empty());
        let context = Arc::new(CrackerContext::new("ABCDEFGHIJKLMNOP".to_string(), 4, 16, scorer, false));
        let driver = Arc::new(SynclessDriver::new(Arc::clone(&context), 2, 1));
        driver.run();
        assert_eq!(context.grille_count_so_far(), 16);
    }
}
