//! Quadratic-funding matching engine.
//!
//! ## Design Principles
//!
//! The engine is designed for:
//!
//! 1. **Purity**: `(Round, Votes, RateResolver) -> Result<Round>`, no hidden state
//! 2. **Fixed-Point Math**: Every step runs on `rust_decimal::Decimal`
//! 3. **Synchronous Execution**: One batch runs to completion before commit
//! 4. **Atomic Commit**: A failed batch leaves the round untouched
//!
//! ## Pipeline
//!
//! - [`aggregate`]: partition the batch by project, drop unknown project refs
//! - [`quadratic`]: convert, sum, square-of-sum-of-roots, normalize
//! - [`matcher`]: run the pipeline and build the new round plus its receipt
//!
//! ## Example
//!
//! ```
//! use qf_match::rates::{Denominated, RateTable};
//! use qf_match::types::{Round, Vote};
//! use rust_decimal::Decimal;
//!
//! let mut round = Round::new(Decimal::from(100), "eth", 2).unwrap();
//! let votes = vec![
//!     Vote::new(0, "0", "a", Decimal::from(4), "eth"),
//!     Vote::new(0, "0", "b", Decimal::from(4), "eth"),
//!     Vote::new(0, "1", "c", Decimal::from(16), "eth"),
//! ];
//!
//! let receipt = round.vote(&votes, &Denominated::new("eth", RateTable::new())).unwrap();
//!
//! assert!(receipt.distributed());
//! assert_eq!(round.project("0").unwrap().donated, Decimal::from(8));
//! ```

pub mod aggregate;
pub mod quadratic;
pub mod matcher;

pub use aggregate::{partition_votes, PartitionedVotes};
pub use quadratic::{normalize, score_votes, ProjectScore};
pub use matcher::{compute_matches, MatchOutcome};
