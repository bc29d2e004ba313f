//! Error types for the grille cracker.

use thiserror::Error;

/// Result type alias for cracker operations.
pub type Result<T> = std::result::Result<T, CrackError>;

/// Main error type for the grille cracker.
#[derive(Error, Debug)]
pub enum CrackError {
    /// I/O errors reading the cipher text, clear text, or words file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration: unknown CLI variant, malformed cipher text, missing files.
    #[error("Invalid configuration: {message}")]
    Config {
        /// Description of the configuration problem.
        message: String,
    },

    /// A correctness invariant was violated at termination.
    #[error("Invariant violation: {message}")]
    Invariant {
        /// Description of the invariant that failed.
        message: String,
    },
}

impl CrackError {
    /// Create a new configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    /// Create a new invariant-violation error.
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::Invariant { message: message.into() }
    }

    /// The name of this error's variant, used for the top-level diagnostic line.
    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::Io(_) => "Io",
            Self::Config { .. } => "Config",
            Self::Invariant { .. } => "Invariant",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_carries_message() {
        let err = CrackError::config("unknown variant: bogus");
        assert!(matches!(err, CrackError::Config { .. }));
        assert_eq!(err.variant_name(), "Config");
    }

    #[test]
    fn invariant_error_carries_message() {
        let err = CrackError::invariant("grilleCountSoFar != grilleCount");
        assert!(matches!(err, CrackError::Invariant { .. }));
        assert_eq!(err.variant_name(), "Invariant");
    }
}
