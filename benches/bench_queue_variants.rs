//! Standalone throughput benchmark for the MPMC portion-queue family.
//!
//! Pushes a fixed number of grilles through every `BlownQueue` backing (and
//! the two monolithic queues) with a fixed producer/consumer fleet and
//! reports grilles/second per variant. `harness = false` in Cargo.toml: this
//! is a plain `main()`, not a criterion harness, matching the other
//! standalone throughput benches in this workspace.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use grillecrack::cli::Variant;
use grillecrack::grille::Grille;
use grillecrack::queue::factory::build_queue;
use grillecrack::queue::MpmcPortionQueue;

const PRODUCERS: usize = 4;
const CONSUMERS: usize = 4;
const PORTIONS_PER_PRODUCER: usize = 250_000;
const MAX_QUEUE_SIZE: usize = 4096;

const VARIANTS: &[Variant] = &[
    Variant::Concurrent,
    Variant::Atomic,
    Variant::Lockfree,
    Variant::Onetbb,
    Variant::OnetbbBounded,
    Variant::MichaelScott,
    Variant::Ramalhete,
    Variant::Vyukov,
    Variant::Kirsch1Fifo,
    Variant::KirschBounded1Fifo,
    Variant::Nikolaev,
    Variant::NikolaevBounded,
    Variant::SyncBounded,
    Variant::Textbook,
];

fn bench_variant(variant: Variant) -> f64 {
    let queue: Arc<dyn MpmcPortionQueue<Grille>> = Arc::from(build_queue(variant, MAX_QUEUE_SIZE));
    let total_portions = PRODUCERS * PORTIONS_PER_PRODUCER;
    let received = Arc::new(AtomicUsize::new(0));

    let start = Instant::now();

    let producer_handles: Vec<_> = (0..PRODUCERS)
        .map(|_| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for ordinal in 0..PORTIONS_PER_PRODUCER {
                    queue.add_portion(Grille::from_ordinal(2, ordinal as u64));
                }
            })
        })
        .collect();

    let consumer_handles: Vec<_> = (0..CONSUMERS)
        .map(|_| {
            let queue = Arc::clone(&queue);
            let received = Arc::clone(&received);
            thread::spawn(move || {
                while let Some(_grille) = queue.retrieve_portion() {
                    received.fetch_add(1, Ordering::Relaxed);
                }
            })
        })
        .collect();

    for handle in producer_handles {
        handle.join().expect("producer thread panicked");
    }
    queue.ensure_all_portions_are_retrieved();
    while received.load(Ordering::Acquire) != total_portions {
        std::hint::spin_loop();
    }
    queue.stop_consumers(CONSUMERS);
    for handle in consumer_handles {
        handle.join().expect("consumer thread panicked");
    }

    let elapsed = start.elapsed().as_secs_f64().max(1e-9);
    total_portions as f64 / elapsed
}

fn main() {
    println!("QUEUE VARIANT THROUGHPUT BENCHMARK");
    println!("===================================");
    println!("producers: {PRODUCERS}, consumers: {CONSUMERS}, portions/producer: {PORTIONS_PER_PRODUCER}");
    println!();

    for &variant in VARIANTS {
        let grilles_per_second = bench_variant(variant);
        println!("  {variant:?}: {grilles_per_second:.0} grilles/s");
    }
}
