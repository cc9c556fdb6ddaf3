//! Project: one grant recipient inside a round.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::Vote;

/// A project eligible for matching.
///
/// `donated` and `match_amount` are expressed in the round's denomination.
/// In JSON they are plain numbers, and `match_amount` is stored under the
/// key `match`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Stable identifier, unique within the round
    pub id: String,

    /// Votes attributed by the most recent batch that mentioned this project
    #[serde(default)]
    pub votes: Vec<Vote>,

    /// Share of the matching pool
    #[serde(rename = "match", with = "rust_decimal::serde::float")]
    pub match_amount: Decimal,

    /// Total donated value
    #[serde(with = "rust_decimal::serde::float")]
    pub donated: Decimal,
}

impl Project {
    /// Create an empty project with zero donated and zero match.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            votes: Vec::new(),
            match_amount: Decimal::ZERO,
            donated: Decimal::ZERO,
        }
    }

    pub fn vote_count(&self) -> usize {
        self.votes.len()
    }

    /// Number of distinct voters in the current vote set.
    pub fn unique_voters(&self) -> usize {
        let mut voters: Vec<&str> = self.votes.iter().map(|v| v.voter.as_str()).collect();
        voters.sort_unstable();
        voters.dedup();
        voters.len()
    }
}
