//! Command-line surface: a single positional argument selecting which
//! queue backing (or syncless/serial driver) races the cracking workload.

use clap::{Parser, ValueEnum};

/// Selects the queue backing (or driver, for `syncless`/`serial`) used to
/// run the cracking workload. The first fourteen variants select a
/// `ProducerConsumerDriver` over a `BlownQueue` (or monolithic queue)
/// parameterised with the named backing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum Variant {
    Concurrent,
    Atomic,
    Lockfree,
    Onetbb,
    OnetbbBounded,
    MichaelScott,
    Ramalhete,
    Vyukov,
    #[value(name = "kirsch_1fifo")]
    Kirsch1Fifo,
    #[value(name = "kirsch_bounded_1fifo")]
    KirschBounded1Fifo,
    Nikolaev,
    NikolaevBounded,
    SyncBounded,
    Textbook,
    Syncless,
    Serial,
}

impl Variant {
    /// Whether this variant selects a `ProducerConsumerDriver` over a
    /// queue, as opposed to `syncless`/`serial`'s queue-free drivers.
    pub fn uses_producer_consumer_driver(self) -> bool {
        !matches!(self, Variant::Syncless | Variant::Serial)
    }

    /// Whether this variant's backing requires power-of-two capacity.
    pub fn requires_power_of_two_capacity(self) -> bool {
        matches!(self, Variant::NikolaevBounded | Variant::Vyukov)
    }
}

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(
    name = "grillecrack",
    about = "Races MPMC bounded queue designs against a turning-grille cipher crack"
)]
pub struct Args {
    /// Which queue backing or driver to run.
    #[arg(value_enum, default_value_t = Variant::Syncless)]
    pub variant: Variant,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_variant_is_syncless() {
        let args = Args::parse_from(["grillecrack"]);
        assert_eq!(args.variant, Variant::Syncless);
    }

    #[test]
    fn accepts_named_variant() {
        let args = Args::parse_from(["grillecrack", "vyukov"]);
        assert_eq!(args.variant, Variant::Vyukov);
    }

    #[test]
    fn accepts_the_spec_s_exact_kirsch_tokens() {
        let args = Args::parse_from(["grillecrack", "kirsch_1fifo"]);
        assert_eq!(args.variant, Variant::Kirsch1Fifo);

        let args = Args::parse_from(["grillecrack", "kirsch_bounded_1fifo"]);
        assert_eq!(args.variant, Variant::KirschBounded1Fifo);
    }

    #[test]
    fn rejects_unknown_variant() {
        let result = Args::try_parse_from(["grillecrack", "bogus"]);
        assert!(result.is_err());
    }

    #[test]
    fn only_syncless_and_serial_skip_the_producer_consumer_driver() {
        for variant in Variant::value_variants() {
            let expects_driver = !matches!(variant, Variant::Syncless | Variant::Serial);
            assert_eq!(variant.uses_producer_consumer_driver(), expects_driver);
        }
    }
}
