//! Single-thread baseline: walks the whole ordinal space on the calling
//! thread, with no locking anywhere in the hot loop.

use std::sync::Arc;
use std::time::Instant;

use crate::context::CrackerContext;
use crate::grille::GrilleEnumerator;

pub struct SerialDriver {
    context: Arc<CrackerContext>,
    half_side: usize,
}

impl SerialDriver {
    pub fn new(context: Arc<CrackerContext>, half_side: usize) -> Self {
        Self { context, half_side }
    }

    /// Walk every grille in `[0, grille_count)` on this thread. Milestone
    /// timing is kept entirely in local variables rather than touching
    /// `CrackerContext`'s shared milestone mutex — a single thread has no
    /// contention to guard against, so the mutex would be pure overhead.
    /// Returns the best observed grilles/second.
    pub fn run(&self) -> f64 {
        let mut enumerator = GrilleEnumerator::new(self.half_side, 0, self.context.grille_count);

        let mut milestone_start = Instant::now();
        let mut count_at_milestone_start = 0u64;
        let mut best_grilles_per_second = 0.0f64;

        while let Some(grille) = enumerator.borrow_next() {
            let (count, crossed) = self.context.apply_and_register(grille);
            if crossed {
                let now = Instant::now();
                let elapsed = now.duration_since(milestone_start).as_secs_f64().max(1e-9);
                let delta = count.saturating_sub(count_at_milestone_start);
                let grilles_per_second = delta as f64 / elapsed;
                if grilles_per_second > best_grilles_per_second {
                    best_grilles_per_second = grilles_per_second;
                }
                milestone_start = now;
                count_at_milestone_start = count;
            }
        }

        best_grilles_per_second
    }
}
