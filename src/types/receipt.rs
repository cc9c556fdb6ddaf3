//! Match receipt summarizing one vote batch.
//!
//! The receipt is returned alongside every committed batch. Its state root
//! lets two runs over the same round and votes be compared byte-for-byte.

use rust_decimal::Decimal;

/// Summary of a committed vote batch.
///
/// ## State Root
///
/// The 32-byte state root is the SHA-256 digest of the round produced by
/// the batch (see `Round::compute_state_root`).
///
/// ## Example
///
/// ```
/// use qf_match::types::MatchReceipt;
/// use rust_decimal::Decimal;
///
/// let receipt = MatchReceipt {
///     votes_received: 3,
///     votes_applied: 2,
///     votes_ignored: 1,
///     projects_updated: 1,
///     total_donated: Decimal::from(8),
///     total_raw_match: Decimal::from(16),
///     state_root: [0u8; 32],
/// };
/// assert!(!receipt.is_empty());
/// assert!(receipt.distributed());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MatchReceipt {
    /// Votes in the submitted batch
    pub votes_received: u64,

    /// Votes that named an existing project
    pub votes_applied: u64,

    /// Votes dropped because their project does not exist
    pub votes_ignored: u64,

    /// Projects whose vote set was replaced by this batch
    pub projects_updated: u64,

    /// Sum of `donated` across the resulting round
    pub total_donated: Decimal,

    /// Sum of raw quadratic scores before normalization
    pub total_raw_match: Decimal,

    /// SHA-256 of the resulting round
    pub state_root: [u8; 32],
}

impl MatchReceipt {
    /// Get the state root as a hex string
    pub fn state_root_hex(&self) -> String {
        hex::encode(self.state_root)
    }

    /// `true` when the batch carried no votes at all
    pub fn is_empty(&self) -> bool {
        self.votes_received == 0
    }

    /// `true` when the matching pool was distributed (some raw match > 0)
    pub fn distributed(&self) -> bool {
        self.total_raw_match > Decimal::ZERO
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
