//! Wires the rest of the crate into the binary entry point: file I/O for
//! the cipher/clear text and dictionary, CLI variant dispatch to the right
//! driver, the CPU warm-up spin, and the top-level invariant/exit-code
//! policy described for `main`.

use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::cli::Variant;
use crate::constants;
use crate::context::CrackerContext;
use crate::cpu::{get_cpu_count, pin_to_cpu};
use crate::drivers::{ProducerConsumerDriver, SerialDriver, SynclessDriver};
use crate::error::{CrackError, Result};
use crate::grille::Grille;
use crate::queue::factory::build_queue;
use crate::scoring::{CipherScorer, WordsTrie};

/// Run the cracking workload for `variant` to completion: load and validate
/// inputs, warm up the CPU (unless `verbose`), run the selected driver,
/// and enforce the conservation and clear-text invariants before
/// returning.
pub fn run(variant: Variant, verbose: bool) -> Result<()> {
    let cipher_text = load_first_line(constants::ENCRYPTED_MSG_PATH)?.to_uppercase();
    let clear_text = normalize_clear_text(&load_first_line(constants::DECRYPTED_MSG_PATH)?);
    let trie = WordsTrie::load_from_file(constants::WORDS_FILE_PATH)?;

    validate_cipher_text(&cipher_text)?;
    let side_length = (cipher_text.len() as f64).sqrt().round() as usize;
    let half_side = side_length / 2;
    let grille_count = Grille::population(half_side);

    let scorer = CipherScorer::new(&cipher_text, trie);
    let context = Arc::new(CrackerContext::new(cipher_text, side_length, grille_count, scorer, verbose));

    if !verbose {
        heat_cpu();
    }

    let cpu_count = get_cpu_count();
    let start = Instant::now();

    let (best_grilles_per_second, summary) = match variant {
        Variant::Syncless => {
            let driver = Arc::new(SynclessDriver::new(Arc::clone(&context), half_side, cpu_count));
            driver.run();
            (context.best_grilles_per_second(), None)
        }
        Variant::Serial => {
            let driver = SerialDriver::new(Arc::clone(&context), half_side);
            let best = driver.run();
            (best, None)
        }
        _ => {
            let initial_consumer_count = constants::INITIAL_CONSUMER_MULTIPLIER * cpu_count;
            let producer_count = cpu_count;
            let mut max_queue_size = initial_consumer_count * producer_count * constants::QUEUE_SIZE_MULTIPLIER;
            if variant.requires_power_of_two_capacity() {
                max_queue_size = max_queue_size.next_power_of_two();
            }
            let queue = build_queue(variant, max_queue_size);
            let driver =
                ProducerConsumerDriver::new(Arc::clone(&context), queue, half_side, producer_count, initial_consumer_count);
            driver.run();
            (context.best_grilles_per_second(), Some(driver.milestones_summary()))
        }
    };

    let elapsed = start.elapsed().as_secs_f64().max(1e-9);
    let average_grilles_per_second = grille_count as f64 / elapsed;

    match summary {
        Some(summary) => tracing::info!(
            "Average speed: {average_grilles_per_second:.0} grilles/s; best speed: {best_grilles_per_second:.0} grilles/s; {summary}"
        ),
        None => tracing::info!(
            "Average speed: {average_grilles_per_second:.0} grilles/s; best speed: {best_grilles_per_second:.0} grilles/s"
        ),
    }

    if context.grille_count_so_far() != grille_count {
        return Err(CrackError::invariant("some grilles got lost"));
    }

    if !context.scorer.contains_candidate(&clear_text) {
        return Err(CrackError::invariant(
            "the correct clear text was not found among the decrypted candidates",
        ));
    }

    Ok(())
}

fn load_first_line(path: &str) -> Result<String> {
    let contents = fs::read_to_string(path)?;
    contents
        .lines()
        .next()
        .map(str::to_string)
        .ok_or_else(|| CrackError::config(format!("{path} is empty")))
}

fn normalize_clear_text(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_alphabetic()).map(|c| c.to_ascii_uppercase()).collect()
}

fn validate_cipher_text(cipher_text: &str) -> Result<()> {
    if cipher_text.is_empty() || !cipher_text.bytes().all(|b| b.is_ascii_uppercase()) {
        return Err(CrackError::config("the ciphertext must contain only English letters"));
    }
    let side_length = (cipher_text.len() as f64).sqrt().round() as usize;
    if side_length == 0 || side_length % 2 != 0 || side_length * side_length != cipher_text.len() {
        return Err(CrackError::config(
            "the ciphertext length must be a square of a positive even number",
        ));
    }
    Ok(())
}

/// Busy-spin `cpu_count` threads for [`constants::WARMUP_DURATION_SECS`] to
/// bring the CPU to steady-state frequency before the cracker starts. A
/// benchmarking artefact, not a correctness requirement — skipped whenever
/// `VERBOSE` is set, matching the ground truth's `if (!VERBOSE) heatCpu();`.
fn heat_cpu() {
    let cpu_count = get_cpu_count();
    let stop = Arc::new(AtomicBool::new(false));

    let handles: Vec<_> = (0..cpu_count)
        .map(|cpu_id| {
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                // Best-effort: pinning spreads the warm-up evenly across
                // cores, but an unsupported platform shouldn't abort it.
                let _ = pin_to_cpu(cpu_id);
                while !stop.load(Ordering::Relaxed) {}
            })
        })
        .collect();

    thread::sleep(Duration::from_secs(constants::WARMUP_DURATION_SECS));
    stop.store(true, Ordering::Relaxed);

    for handle in handles {
        handle.join().expect("warm-up thread panicked");
    }
}
