//! Vote: a single donation event.
//!
//! ## JSON Layout
//!
//! Votes are read from JSON arrays with camelCase keys. `amount` is a
//! decimal string so no precision is lost on the way in:
//!
//! ```json
//! { "timestamp": 0, "projectRef": "0", "voter": "0xabc", "amount": "4", "token": "eth" }
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{QfError, Result};

/// A donation of `amount` units of `token` to project `project_ref`.
///
/// ## Example
///
/// ```
/// use qf_match::types::Vote;
/// use rust_decimal::Decimal;
///
/// let vote = Vote::new(0, "1", "alice", Decimal::from(16), "eth");
/// assert_eq!(vote.project_ref, "1");
/// assert!(vote.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    /// Rate epoch used to select an exchange-rate snapshot.
    /// Not a wall-clock time.
    pub timestamp: u64,

    /// Id of the targeted project
    pub project_ref: String,

    /// Donor identifier (unused by the matching math)
    pub voter: String,

    /// Donation quantity in `token` units, never negative
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,

    /// Currency symbol resolved through the rate lookup
    pub token: String,
}

impl Vote {
    pub fn new(
        timestamp: u64,
        project_ref: impl Into<String>,
        voter: impl Into<String>,
        amount: Decimal,
        token: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            project_ref: project_ref.into(),
            voter: voter.into(),
            amount,
            token: token.into(),
        }
    }

    /// Reject negative amounts and empty token symbols.
    pub fn validate(&self) -> Result<()> {
        if self.amount.is_sign_negative() && !self.amount.is_zero() {
            return Err(QfError::malformed(
                "vote",
                format!(
                    "negative amount {} from voter `{}` to project `{}`",
                    self.amount, self.voter, self.project_ref
                ),
            ));
        }
        if self.token.is_empty() {
            return Err(QfError::malformed(
                "vote",
                format!("empty token on vote from voter `{}`", self.voter),
            ));
        }
        Ok(())
    }
}

/// Parse a JSON array of votes and validate each one.
///
/// `source_name` labels errors (typically the file name).
pub fn parse_votes(json: &str, source_name: &str) -> Result<Vec<Vote>> {
    let votes: Vec<Vote> = serde_json::from_str(json)
        .map_err(|err| QfError::malformed(source_name, err.to_string()))?;
    for (index, vote) in votes.iter().enumerate() {
        vote.validate().map_err(|err| match err {
            QfError::MalformedInput { reason, .. } => {
                QfError::malformed(source_name, format!("vote #{index}: {reason}"))
            }
            other => other,
        })?;
    }
    Ok(votes)
}

// ============================================================================
// Unit Tests
// ============================================================================
