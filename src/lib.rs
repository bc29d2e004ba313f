//! grillecrack — a concurrency-benchmarking workbench that races MPMC
//! bounded queue designs against each other on a brute-force turning-grille
//! cipher crack.

pub mod cli;
pub mod constants;
pub mod context;
pub mod cpu;
pub mod drivers;
pub mod error;
pub mod grille;
pub mod queue;
pub mod runner;
pub mod scoring;

pub use context::CrackerContext;
pub use error::{CrackError, Result};
pub use grille::Grille;

/// Version information, mirroring the teacher's re-export convention.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
