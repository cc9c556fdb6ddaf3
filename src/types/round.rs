//! Round: the aggregate root of a funding cycle.
//!
//! ## JSON Layout
//!
//! ```json
//! { "matchingPool": 100, "token": "eth",
//!   "projects": [ { "id": "0", "votes": [], "match": 0, "donated": 0 } ] }
//! ```
//!
//! ## State Root
//!
//! [`Round::compute_state_root`] hashes a canonical byte encoding of the
//! whole round with SHA-256. Decimals are normalized before hashing so the
//! root depends on values only, never on their internal scale.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{QfError, Result};
use crate::types::amount::canonical_bytes;
use crate::types::Project;

/// One funding cycle: a matching pool, its denomination, and a project roster.
///
/// ## Example
///
/// ```
/// use qf_match::types::Round;
/// use rust_decimal::Decimal;
///
/// let round = Round::new(Decimal::from(100), "eth", 3).unwrap();
/// let ids: Vec<&str> = round.projects.iter().map(|p| p.id.as_str()).collect();
/// assert_eq!(ids, ["0", "1", "2"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    /// Total budget to distribute, in `token` units
    #[serde(with = "rust_decimal::serde::float")]
    pub matching_pool: Decimal,

    /// Denomination symbol every donation is converted into
    pub token: String,

    /// Insertion-ordered roster, ids unique
    pub projects: Vec<Project>,
}

impl Round {
    /// Create a round with exactly `project_count` projects, ids `"0"` upward.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` when the pool is negative or the token is empty.
    pub fn new(
        matching_pool: Decimal,
        token: impl Into<String>,
        project_count: usize,
    ) -> Result<Self> {
        let token = token.into();
        if matching_pool.is_sign_negative() && !matching_pool.is_zero() {
            return Err(QfError::InvalidConfiguration(format!(
                "matching pool must be non-negative, got {matching_pool}"
            )));
        }
        if token.trim().is_empty() {
            return Err(QfError::InvalidConfiguration(
                "token symbol must not be empty".to_string(),
            ));
        }

        let projects = (0..project_count)
            .map(|i| Project::new(i.to_string()))
            .collect();

        Ok(Self {
            matching_pool,
            token,
            projects,
        })
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    #[inline]
    pub fn project_count(&self) -> usize {
        self.projects.len()
    }

    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    // ========================================================================
    // Totals
    // ========================================================================

    /// Sum of every project's match.
    ///
    /// # Errors
    ///
    /// `ArithmeticOverflow` if the sum exceeds the decimal range.
    pub fn total_match(&self) -> Result<Decimal> {
        checked_total(self.projects.iter().map(|p| p.match_amount), "total match")
    }

    /// Sum of every project's donated value.
    ///
    /// # Errors
    ///
    /// `ArithmeticOverflow` if the sum exceeds the decimal range.
    pub fn total_donated(&self) -> Result<Decimal> {
        checked_total(self.projects.iter().map(|p| p.donated), "total donated")
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Check the invariants of a round read from an untrusted document.
    ///
    /// Failures are reported as `MalformedInput` labelled with `source_name`.
    pub fn validate(&self, source_name: &str) -> Result<()> {
        let fail =
            |reason: String| -> Result<()> { Err(QfError::malformed(source_name, reason)) };

        if self.matching_pool.is_sign_negative() && !self.matching_pool.is_zero() {
            return fail(format!("negative matching pool {}", self.matching_pool));
        }
        if self.token.trim().is_empty() {
            return fail("empty round token".to_string());
        }

        let mut seen = HashSet::with_capacity(self.projects.len());
        for project in &self.projects {
            if !seen.insert(project.id.as_str()) {
                return fail(format!("duplicate project id `{}`", project.id));
            }
            if project.donated.is_sign_negative() && !project.donated.is_zero() {
                return fail(format!("project `{}` has negative donated", project.id));
            }
            if project.match_amount.is_sign_negative() && !project.match_amount.is_zero() {
                return fail(format!("project `{}` has negative match", project.id));
            }
            for vote in &project.votes {
                vote.validate().or_else(|err| {
                    fail(format!("project `{}`: {err}", project.id))
                })?;
            }
        }
        Ok(())
    }

    // ========================================================================
    // State Root
    // ========================================================================

    /// SHA-256 over the canonical encoding of the round.
    ///
    /// Layout: token, pool, then per project in roster order: id, donated,
    /// match, vote count and every vote. Strings are length-prefixed
    /// (u64 little-endian); decimals use [`canonical_bytes`].
    pub fn compute_state_root(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();

        hash_str(&mut hasher, &self.token);
        hasher.update(canonical_bytes(self.matching_pool));
        hasher.update((self.projects.len() as u64).to_le_bytes());

        for project in &self.projects {
            hash_str(&mut hasher, &project.id);
            hasher.update(canonical_bytes(project.donated));
            hasher.update(canonical_bytes(project.match_amount));
            hasher.update((project.votes.len() as u64).to_le_bytes());
            for vote in &project.votes {
                hasher.update(vote.timestamp.to_le_bytes());
                hash_str(&mut hasher, &vote.project_ref);
                hash_str(&mut hasher, &vote.voter);
                hasher.update(canonical_bytes(vote.amount));
                hash_str(&mut hasher, &vote.token);
            }
        }

        let result = hasher.finalize();
        let mut root = [0u8; 32];
        root.copy_from_slice(&result);
        root
    }
}

fn checked_total(mut values: impl Iterator<Item = Decimal>, what: &'static str) -> Result<Decimal> {
    values.try_fold(Decimal::ZERO, |acc, value| {
        acc.checked_add(value).ok_or(QfError::ArithmeticOverflow(what))
    })
}

fn hash_str(hasher: &mut Sha256, value: &str) {
    hasher.update((value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Vote;

    #[test]
    fn test_round_new() {
        let round = Round::new(Decimal::from(100), "eth", 2).unwrap();

        assert_eq!(round.matching_pool, Decimal::from(100));
        assert_eq!(round.token, "eth");
        assert_eq!(round.project_count(), 2);
        assert!(round.project("0").is_some());
        assert!(round.project("1").is_some());
        assert!(round.project("2").is_none());
        assert_eq!(round.total_match().unwrap(), Decimal::ZERO);
        assert_eq!(round.total_donated().unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_round_exact_project_count() {
        for count in [0usize, 1, 3, 10] {
            let round = Round::new(Decimal::ONE, "eth", count).unwrap();
            assert_eq!(round.project_count(), count);
        }
    }

    #[test]
    fn test_round_zero_pool_is_valid() {
        assert!(Round::new(Decimal::ZERO, "dai", 1).is_ok());
    }

    #[test]
    fn test_round_negative_pool() {
        let err = Round::new(Decimal::from(-1), "eth", 2).unwrap_err();
        assert!(matches!(err, QfError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_round_empty_token() {
        let err = Round::new(Decimal::from(10), "  ", 2).unwrap_err();
        assert!(matches!(err, QfError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_round_json_layout() {
        let round = Round::new(Decimal::from(100), "eth", 1).unwrap();
        let value = serde_json::to_value(&round).unwrap();

        assert_eq!(value["matchingPool"], 100.0);
        assert_eq!(value["token"], "eth");
        assert_eq!(value["projects"][0]["id"], "0");
        assert_eq!(value["projects"][0]["match"], 0.0);
    }

    #[test]
    fn test_validate_duplicate_ids() {
        let mut round = Round::new(Decimal::from(100), "eth", 2).unwrap();
        round.projects[1].id = "0".to_string();

        let err = round.validate("data.json").unwrap_err();
        assert!(err.to_string().contains("duplicate project id"));
    }

    #[test]
    fn test_validate_negative_values() {
        let mut round = Round::new(Decimal::from(100), "eth", 1).unwrap();
        round.projects[0].donated = Decimal::from(-5);
        assert!(round.validate("data.json").is_err());

        let mut round = Round::new(Decimal::from(100), "eth", 1).unwrap();
        round.projects[0].votes.push(Vote::new(0, "0", "a", Decimal::from(-1), "eth"));
        assert!(round.validate("data.json").is_err());
    }

    #[test]
    fn test_state_root_determinism() {
        let a = Round::new(Decimal::from(100), "eth", 3).unwrap();
        let b = Round::new(Decimal::from(100), "eth", 3).unwrap();
        assert_eq!(a.compute_state_root(), b.compute_state_root());

        let c = Round::new(Decimal::from(101), "eth", 3).unwrap();
        assert_ne!(a.compute_state_root(), c.compute_state_root());
    }

    #[test]
    fn test_state_root_ignores_decimal_scale() {
        let a = Round::new(Decimal::from(100), "eth", 1).unwrap();
        let b = Round::new(Decimal::new(10000, 2), "eth", 1).unwrap();
        assert_eq!(a.compute_state_root(), b.compute_state_root());
    }

    #[test]
    fn test_totals_overflow() {
        let huge = Decimal::from_str_exact("50000000000000000000000000000").unwrap();
        let mut round = Round::new(Decimal::from(100), "eth", 2).unwrap();
        round.projects[0].donated = huge;
        round.projects[1].donated = huge;
        round.projects[0].match_amount = huge;
        round.projects[1].match_amount = huge;

        assert!(round.validate("data.json").is_ok());
        assert!(matches!(
            round.total_donated(),
            Err(QfError::ArithmeticOverflow("total donated"))
        ));
        assert!(matches!(
            round.total_match(),
            Err(QfError::ArithmeticOverflow("total match"))
        ));
    }
}
