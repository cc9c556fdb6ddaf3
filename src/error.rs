//! Error taxonomy for round construction, rate lookup and matching.
//!
//! Every variant is terminal for the operation that produced it. The engine
//! never retries and never substitutes a default rate.

use std::path::PathBuf;

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, QfError>;

/// Failures raised while building a round, resolving rates, matching a
/// batch or moving documents on and off disk.
#[derive(Debug, Error)]
pub enum QfError {
    /// Bad round parameters (negative pool, empty token, negative count) or a
    /// rate table that is not expressed in the round token.
    #[error("invalid round configuration: {0}")]
    InvalidConfiguration(String),

    /// The rate resolver has no entry for this `(token, epoch)` pair.
    #[error("no exchange rate for token `{token}` at epoch {epoch}")]
    UnknownRate { token: String, epoch: u64 },

    /// A vote, round or rate document could not be parsed or failed validation.
    #[error("malformed {source_name}: {reason}")]
    MalformedInput { source_name: String, reason: String },

    /// A checked decimal operation overflowed the 96-bit mantissa.
    #[error("decimal overflow while computing {0}")]
    ArithmeticOverflow(&'static str),

    /// Reading or writing `path` failed.
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl QfError {
    pub fn malformed(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        QfError::MalformedInput {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    pub fn unknown_rate(token: &str, epoch: u64) -> Self {
        QfError::UnknownRate {
            token: token.to_string(),
            epoch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_rate_message() {
        let err = QfError::unknown_rate("ftm", 3);
        assert_eq!(err.to_string(), "no exchange rate for token `ftm` at epoch 3");
    }

    #[test]
    fn test_malformed_message() {
        let err = QfError::malformed("votes.json", "expected array");
        assert_eq!(err.to_string(), "malformed votes.json: expected array");
    }
}
