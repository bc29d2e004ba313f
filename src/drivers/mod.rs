//! The three ways to run the cracking workload: a self-tuning
//! producer/consumer fleet over a shared queue, a queue-free pool of
//! independent workers, and a single-thread serial walk.

pub mod producer_consumer;
pub mod serial;
pub mod syncless;

pub use producer_consumer::ProducerConsumerDriver;
pub use serial::SerialDriver;
pub use syncless::SynclessDriver;
