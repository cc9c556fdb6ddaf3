//! Core data types for QF Match
//!
//! All quantities are `rust_decimal::Decimal`; see [`amount`].
//!
//! ## Types
//!
//! - [`Vote`]: A single donation to one project
//! - [`Project`]: A grant recipient with its donated total and match
//! - [`Round`]: Matching pool, denomination and project roster
//! - [`MatchReceipt`]: Summary of a committed vote batch

mod vote;
mod project;
mod round;
mod receipt;
pub mod amount;

// Re-export all types at module level
pub use vote::{parse_votes, Vote};
pub use project::Project;
pub use round::Round;
pub use receipt::MatchReceipt;
