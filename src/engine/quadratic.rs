//! Quadratic-funding arithmetic.
//!
//! ## Formula
//!
//! For a project with contributions `c1..ck` (already converted into the
//! round denomination):
//!
//! ```text
//! donated   = c1 + c2 + ... + ck
//! raw_match = (sqrt(c1) + sqrt(c2) + ... + sqrt(ck))^2
//! match     = raw_match / total_raw_match * matching_pool
//! ```
//!
//! Many small contributions score higher than one large contribution of the
//! same total: 100 x 1 gives 10000, 1 x 100 gives 100.
//!
//! When `total_raw_match` is zero nothing can be normalized and every match
//! is zero.

use rust_decimal::Decimal;

use crate::error::{QfError, Result};
use crate::rates::RateResolver;
use crate::types::amount::{checked_div, checked_mul, checked_sqrt};
use crate::types::Vote;

/// Donated total and un-normalized quadratic score for one project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProjectScore {
    pub donated: Decimal,
    pub raw_match: Decimal,
}

/// Value of one vote in the round denomination: `amount * rate`.
pub fn contribution_value<R>(vote: &Vote, rates: &R) -> Result<Decimal>
where
    R: RateResolver + ?Sized,
{
    let rate = rates.rate(&vote.token, vote.timestamp)?;
    if rate.is_sign_negative() && !rate.is_zero() {
        return Err(QfError::malformed(
            "exchange rate",
            format!(
                "negative rate {rate} for `{}` at epoch {}",
                vote.token, vote.timestamp
            ),
        ));
    }
    checked_mul(vote.amount, rate).ok_or(QfError::ArithmeticOverflow("contribution value"))
}

/// Score a project's vote set.
///
/// An empty slice scores zero.
pub fn score_votes<R>(votes: &[Vote], rates: &R) -> Result<ProjectScore>
where
    R: RateResolver + ?Sized,
{
    let mut donated = Decimal::ZERO;
    let mut sum_of_roots = Decimal::ZERO;

    for vote in votes {
        let value = contribution_value(vote, rates)?;
        let root = checked_sqrt(value).ok_or_else(|| {
            QfError::malformed(
                "vote",
                format!("negative contribution {value} from voter `{}`", vote.voter),
            )
        })?;

        donated = donated
            .checked_add(value)
            .ok_or(QfError::ArithmeticOverflow("donated total"))?;
        sum_of_roots = sum_of_roots
            .checked_add(root)
            .ok_or(QfError::ArithmeticOverflow("sum of square roots"))?;
    }

    let raw_match = sum_of_roots
        .checked_mul(sum_of_roots)
        .ok_or(QfError::ArithmeticOverflow("raw match"))?;

    Ok(ProjectScore { donated, raw_match })
}

/// Split `pool` across projects in proportion to their raw scores.
///
/// Returns one match per input score, in order, plus the total raw match.
/// A zero total yields all-zero matches.
pub fn normalize(raw_matches: &[Decimal], pool: Decimal) -> Result<(Vec<Decimal>, Decimal)> {
    let total = raw_matches.iter().try_fold(Decimal::ZERO, |acc, raw| {
        acc.checked_add(*raw)
            .ok_or(QfError::ArithmeticOverflow("total raw match"))
    })?;

    if total.is_zero() {
        return Ok((vec![Decimal::ZERO; raw_matches.len()], total));
    }

    let matches = raw_matches
        .iter()
        .map(|raw| {
            let share =
                checked_div(*raw, total).ok_or(QfError::ArithmeticOverflow("match share"))?;
            checked_mul(share, pool).ok_or(QfError::ArithmeticOverflow("match amount"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok((matches, total))
}

// ============================================================================
// Unit Tests
// ============================================================================
