//! Batch matcher: validate, aggregate, score, normalize, commit.
//!
//! ## Atomicity
//!
//! [`compute_matches`] reads the input round and builds a brand-new one. The
//! input is never touched, so a failure at any step (bad vote, unknown rate,
//! overflow) leaves the caller's round exactly as it was. [`Round::vote`]
//! swaps the new round in only after the whole batch succeeded.
//!
//! ## Carry-over Policy
//!
//! A batch replaces the vote set of every project it mentions. Projects it
//! does not mention keep their previous votes and donated value, and their
//! raw score is recomputed from those retained votes, so the resolver must
//! also cover the `(token, epoch)` pairs of retained votes. Every project's
//! match is then renormalized against the new total.

use log::{debug, info};
use rust_decimal::Decimal;

use crate::engine::aggregate::partition_votes;
use crate::engine::quadratic::{normalize, score_votes};
use crate::error::Result;
use crate::rates::RateResolver;
use crate::types::amount::format_amount;
use crate::types::{MatchReceipt, Project, Round, Vote};

/// Result of a successful batch: the recomputed round and its receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    pub round: Round,
    pub receipt: MatchReceipt,
}

/// Apply a vote batch to `round` and return the recomputed round.
///
/// # Errors
///
/// - `MalformedInput` if a vote has a negative amount or empty token
/// - `UnknownRate` if the resolver misses a `(token, epoch)` pair
/// - `ArithmeticOverflow` if a decimal operation overflows
///
/// # Example
///
/// ```
/// use qf_match::engine::compute_matches;
/// use qf_match::rates::{Denominated, RateTable};
/// use qf_match::types::amount::{approx_eq, EPSILON};
/// use qf_match::types::{Round, Vote};
/// use rust_decimal::Decimal;
///
/// let round = Round::new(Decimal::from(100), "eth", 2).unwrap();
/// let votes = vec![
///     Vote::new(0, "0", "alice", Decimal::from(4), "eth"),
///     Vote::new(0, "1", "bob", Decimal::from(4), "eth"),
/// ];
/// let rates = Denominated::new("eth", RateTable::new());
///
/// let outcome = compute_matches(&round, &votes, &rates).unwrap();
/// assert!(approx_eq(outcome.round.projects[0].match_amount, Decimal::from(50), EPSILON));
/// assert_eq!(outcome.receipt.votes_applied, 2);
/// ```
pub fn compute_matches<R>(round: &Round, votes: &[Vote], rates: &R) -> Result<MatchOutcome>
where
    R: RateResolver + ?Sized,
{
    for vote in votes {
        vote.validate()?;
    }

    let partitioned = partition_votes(round, votes);

    // Steps 1-3: per-project scores, independent of each other.
    let mut updated: Vec<Project> = Vec::with_capacity(round.projects.len());
    let mut raw_matches: Vec<Decimal> = Vec::with_capacity(round.projects.len());

    for (index, project) in round.projects.iter().enumerate() {
        let mut next = project.clone();
        match partitioned.votes_for(index) {
            Some(batch_votes) => {
                let score = score_votes(batch_votes, rates)?;
                next.votes = batch_votes.to_vec();
                next.donated = score.donated;
                raw_matches.push(score.raw_match);
                debug!(
                    "event=project_scored project={} votes={} donated={} raw_match={}",
                    next.id,
                    next.votes.len(),
                    format_amount(score.donated),
                    format_amount(score.raw_match)
                );
            }
            None => {
                let score = score_votes(&project.votes, rates)?;
                raw_matches.push(score.raw_match);
            }
        }
        updated.push(next);
    }

    // Steps 4-6: normalization waits for every raw score.
    let (matches, total_raw_match) = normalize(&raw_matches, round.matching_pool)?;
    for (project, match_amount) in updated.iter_mut().zip(matches) {
        project.match_amount = match_amount;
    }

    let next_round = Round {
        matching_pool: round.matching_pool,
        token: round.token.clone(),
        projects: updated,
    };

    let receipt = MatchReceipt {
        votes_received: votes.len() as u64,
        votes_applied: partitioned.applied,
        votes_ignored: partitioned.ignored,
        projects_updated: partitioned.projects_touched() as u64,
        total_donated: next_round.total_donated()?,
        total_raw_match,
        state_root: next_round.compute_state_root(),
    };

    info!(
        "event=match_batch status=ok votes={} applied={} ignored={} projects_updated={} total_raw_match={} distributed={}",
        receipt.votes_received,
        receipt.votes_applied,
        receipt.votes_ignored,
        receipt.projects_updated,
        format_amount(total_raw_match),
        receipt.distributed()
    );

    Ok(MatchOutcome {
        round: next_round,
        receipt,
    })
}

impl Round {
    /// Apply a vote batch in place.
    ///
    /// On error `self` is left exactly as it was before the call.
    pub fn vote<R>(&mut self, votes: &[Vote], rates: &R) -> Result<MatchReceipt>
    where
        R: RateResolver + ?Sized,
    {
        let outcome = compute_matches(self, votes, rates)?;
        *self = outcome.round;
        Ok(outcome.receipt)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
