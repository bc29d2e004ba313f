//! Entry point: parses the variant argument, wires up tracing, and
//! translates a fatal `CrackError` into the process's exit code.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use grillecrack::cli::Args;
use grillecrack::constants::VERBOSE_ENV_VAR;
use grillecrack::runner;

fn main() {
    let args = Args::parse();
    let verbose = std::env::var(VERBOSE_ENV_VAR)
        .map(|value| value.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = runner::run(args.variant, verbose) {
        eprintln!("{}: {err}", err.variant_name());
        std::process::exit(1);
    }
}
