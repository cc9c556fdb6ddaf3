//! # QF Match
//!
//! Quadratic-funding matching engine for grant rounds.
//!
//! ## Architecture
//!
//! - **Types**: Core data structures (Vote, Project, Round, MatchReceipt)
//! - **Rates**: Injected exchange-rate resolution (token, epoch) -> rate
//! - **Engine**: Aggregation, quadratic scoring and atomic commit
//! - **Store**: JSON round documents with atomic replace
//!
//! ## Design Principles
//!
//! 1. **Determinism**: Same round, votes and rates give the same state root
//! 2. **No Floating Point**: All math uses `rust_decimal::Decimal`
//! 3. **Injected Rates**: No embedded rate table; a missing rate is an error
//! 4. **Atomic Batches**: A failed batch never leaves a half-updated round
//!
//! ## Example
//!
//! ```
//! use qf_match::types::amount::{approx_eq, EPSILON};
//! use qf_match::{Denominated, RateTable, Round, Vote};
//! use rust_decimal::Decimal;
//!
//! let mut round = Round::new(Decimal::from(100), "eth", 2).unwrap();
//! let votes = vec![
//!     Vote::new(0, "0", "alice", Decimal::from(4), "eth"),
//!     Vote::new(0, "1", "bob", Decimal::from(4), "eth"),
//! ];
//!
//! round.vote(&votes, &Denominated::new("eth", RateTable::new())).unwrap();
//! assert!(approx_eq(round.total_match().unwrap(), Decimal::from(100), EPSILON));
//! ```

// ============================================================================
// Module declarations
// ============================================================================

/// Error taxonomy
pub mod error;

/// Core data types: Vote, Project, Round, MatchReceipt
pub mod types;

/// Exchange-rate resolvers
pub mod rates;

/// Matching engine: aggregation, quadratic scoring, commit
pub mod engine;

/// JSON persistence
pub mod store;

/// stderr logging bootstrap for the CLI
pub mod logging;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use error::{QfError, Result};
pub use types::{MatchReceipt, Project, Round, Vote};
pub use rates::{Denominated, RateResolver, RateTable};
pub use engine::{compute_matches, MatchOutcome};
pub use store::RoundStore;
