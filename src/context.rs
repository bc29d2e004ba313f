//! `CrackerContext`: the state every driver shares — cipher text, scorer,
//! progress counters, and milestone timing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crossbeam::utils::CachePadded;
use parking_lot::Mutex;

use crate::constants::MILESTONE_FRACTION;
use crate::grille::Grille;
use crate::scoring::CipherScorer;

struct MilestoneState {
    milestone_start: Instant,
    grille_count_at_milestone_start: u64,
    best_grilles_per_second: f64,
}

/// Owns the cipher text, trie-backed scorer, and progress/milestone state
/// shared across every driver. `SerialDriver` is the one exception: it
/// keeps its own local milestone timing rather than touching the
/// `milestone` field here (see the serial driver's module docs).
pub struct CrackerContext {
    pub cipher_text: String,
    pub side_length: usize,
    pub grille_count: u64,
    pub verbose: bool,
    pub scorer: CipherScorer,
    grille_count_so_far: CachePadded<AtomicU64>,
    start: Instant,
    milestone: Mutex<MilestoneState>,
}

impl CrackerContext {
    pub fn new(cipher_text: String, side_length: usize, grille_count: u64, scorer: CipherScorer, verbose: bool) -> Self {
        let now = Instant::now();
        Self {
            cipher_text,
            side_length,
            grille_count,
            verbose,
            scorer,
            grille_count_so_far: CachePadded::new(AtomicU64::new(0)),
            start: now,
            milestone: Mutex::new(MilestoneState {
                milestone_start: now,
                grille_count_at_milestone_start: 0,
                best_grilles_per_second: 0.0,
            }),
        }
    }

    /// A milestone fires every `grille_count / MILESTONE_FRACTION`
    /// applications (every 0.1% of total work).
    pub fn milestone_interval(&self) -> u64 {
        (self.grille_count / MILESTONE_FRACTION).max(1)
    }

    pub fn grille_count_so_far(&self) -> u64 {
        self.grille_count_so_far.load(Ordering::Acquire)
    }

    /// Score `grille` and record one applied grille. Returns the new total
    /// and whether this call crossed a milestone boundary.
    pub fn apply_and_register(&self, grille: &Grille) -> (u64, bool) {
        self.scorer.apply_grille(grille, self.verbose);
        let new_count = self.grille_count_so_far.fetch_add(1, Ordering::AcqRel) + 1;
        let crossed = new_count % self.milestone_interval() == 0;
        (new_count, crossed)
    }

    /// Best-effort milestone tick: computes throughput over the window
    /// since the last tick and resets it, or returns `None` if another
    /// thread is already mid-tick. Deliberately `try_lock`-only —
    /// progress logging is best-effort and must never block a producer or
    /// consumer.
    pub fn try_tick_milestone(&self) -> Option<(f64, f64)> {
        let mut state = self.milestone.try_lock()?;
        let now = Instant::now();
        let elapsed = now.duration_since(state.milestone_start).as_secs_f64().max(1e-9);
        let current_total = self.grille_count_so_far();
        let delta = current_total.saturating_sub(state.grille_count_at_milestone_start);
        let gps = delta as f64 / elapsed;
        if gps > state.best_grilles_per_second {
            state.best_grilles_per_second = gps;
        }
        state.milestone_start = now;
        state.grille_count_at_milestone_start = current_total;
        Some((gps, state.best_grilles_per_second))
    }

    pub fn best_grilles_per_second(&self) -> f64 {
        self.milestone.lock().best_grilles_per_second
    }

    /// Emit the verbose progress line for a milestone that was just ticked
    /// via [`Self::try_tick_milestone`]. A no-op when `verbose` is false, so
    /// callers may compute `extra_status` unconditionally without it ever
    /// reaching stderr in the common case.
    pub fn log_milestone(&self, gps: f64, best_gps: f64, extra_status: &str) {
        if !self.verbose {
            return;
        }
        let done = self.grille_count_so_far() as f64 * 100.0 / self.grille_count as f64;
        if extra_status.is_empty() {
            tracing::debug!(
                "{done:.1}% done; current speed: {gps:.0} grilles/s; best speed so far: {best_gps:.0} grilles/s"
            );
        } else {
            tracing::debug!(
                "{done:.1}% done; current speed: {gps:.0} grilles/s; best speed so far: {best_gps:.0} grilles/s; {extra_status}"
            );
        }
    }

    /// Average throughput since the driver started.
    pub fn average_grilles_per_second(&self) -> f64 {
        let elapsed = Instant::now().duration_since(self.start).as_secs_f64().max(1e-9);
        self.grille_count_so_far() as f64 / elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::WordsTrie;

    fn tiny_context() -> CrackerContext {
        let scorer = CipherScorer::new("ABCDEFGHIJKLMNOP", WordsTrie::empty());
        CrackerContext::new("ABCDEFGHIJKLMNOP".to_string(), 4, 256, scorer, false)
    }

    #[test]
    fn milestone_interval_never_goes_below_one() {
        let context = tiny_context();
        assert_eq!(context.milestone_interval(), 1);
    }

    #[test]
    fn apply_and_register_accumulates_count() {
        let context = tiny_context();
        let grille = Grille::from_ordinal(2, 0);
        let (count, _crossed) = context.apply_and_register(&grille);
        assert_eq!(count, 1);
        assert_eq!(context.grille_count_so_far(), 1);
    }

    #[test]
    fn try_tick_milestone_reports_monotonic_best() {
        let context = tiny_context();
        let grille = Grille::from_ordinal(2, 0);
        for _ in 0..10 {
            context.apply_and_register(&grille);
        }
        let (_gps, best) = context.try_tick_milestone().unwrap();
        assert!(best >= 0.0);
        assert_eq!(context.best_grilles_per_second(), best);
    }
}
