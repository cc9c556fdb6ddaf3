//! Exchange-rate resolution.
//!
//! The matching engine never owns a rate table. It is handed a
//! [`RateResolver`] and asks it for the factor converting one unit of a vote
//! token into one unit of the round's denomination at the vote's epoch.
//!
//! ## Resolvers
//!
//! - [`RateTable`]: fixed `(token, epoch) -> rate` table, loadable from JSON
//! - [`Denominated`]: answers `1` for the round token, delegates the rest
//! - any `Fn(&str, u64) -> Result<Decimal>` closure
//!
//! ## Example
//!
//! ```
//! use qf_match::rates::{Denominated, RateResolver, RateTable};
//! use rust_decimal::Decimal;
//!
//! let table = RateTable::new().with_rate("dai", 0, Decimal::new(5, 4)).unwrap();
//! let rates = Denominated::new("eth", table);
//!
//! assert_eq!(rates.rate("eth", 7).unwrap(), Decimal::ONE);
//! assert_eq!(rates.rate("dai", 0).unwrap(), Decimal::new(5, 4));
//! assert!(rates.rate("dai", 1).is_err());
//! ```

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{QfError, Result};

/// Source of exchange rates keyed by `(token, epoch)`.
///
/// Implementations must be pure: the same pair always yields the same
/// answer. A missing pair is an `UnknownRate` error, never a default.
pub trait RateResolver {
    fn rate(&self, token: &str, epoch: u64) -> Result<Decimal>;
}

impl<F> RateResolver for F
where
    F: Fn(&str, u64) -> Result<Decimal>,
{
    fn rate(&self, token: &str, epoch: u64) -> Result<Decimal> {
        self(token, epoch)
    }
}

// ============================================================================
// RateTable
// ============================================================================

/// In-memory rate table.
///
/// JSON form maps token to epoch to rate; rates may be numbers or strings:
///
/// ```json
/// { "ftm": { "0": 23, "1": "27" }, "dai": { "0": 1 } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RateTable {
    rates: BTreeMap<String, BTreeMap<u64, Decimal>>,
}

impl RateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a JSON rate table.
    pub fn from_json(json: &str, source_name: &str) -> Result<Self> {
        let table: RateTable = serde_json::from_str(json)
            .map_err(|err| QfError::malformed(source_name, err.to_string()))?;
        for (token, epochs) in &table.rates {
            for (epoch, rate) in epochs {
                if rate.is_sign_negative() && !rate.is_zero() {
                    return Err(QfError::malformed(
                        source_name,
                        format!("negative rate {rate} for `{token}` at epoch {epoch}"),
                    ));
                }
            }
        }
        Ok(table)
    }

    /// Insert or replace a rate.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` for a negative rate.
    pub fn insert(&mut self, token: impl Into<String>, epoch: u64, rate: Decimal) -> Result<()> {
        let token = token.into();
        if rate.is_sign_negative() && !rate.is_zero() {
            return Err(QfError::InvalidConfiguration(format!(
                "negative rate {rate} for `{token}` at epoch {epoch}"
            )));
        }
        self.rates.entry(token).or_default().insert(epoch, rate);
        Ok(())
    }

    /// Builder form of [`RateTable::insert`].
    pub fn with_rate(mut self, token: impl Into<String>, epoch: u64, rate: Decimal) -> Result<Self> {
        self.insert(token, epoch, rate)?;
        Ok(self)
    }

    pub fn get(&self, token: &str, epoch: u64) -> Option<Decimal> {
        self.rates.get(token)?.get(&epoch).copied()
    }

    /// Number of `(token, epoch)` entries.
    pub fn len(&self) -> usize {
        self.rates.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reject a table that quotes `token` at anything but 1.
    ///
    /// A round's rates convert into its own token, so a table where that
    /// token is not worth exactly 1 is denominated in something else.
    pub fn check_denomination(&self, token: &str) -> Result<()> {
        let Some(epochs) = self.rates.get(token) else {
            return Ok(());
        };
        match epochs.iter().find(|(_, rate)| **rate != Decimal::ONE) {
            Some((epoch, rate)) => Err(QfError::InvalidConfiguration(format!(
                "rate table quotes the round token `{token}` at {rate} for epoch {epoch}; \
                 rates must be expressed in `{token}` units"
            ))),
            None => Ok(()),
        }
    }
}

impl RateResolver for RateTable {
    fn rate(&self, token: &str, epoch: u64) -> Result<Decimal> {
        self.get(token, epoch)
            .ok_or_else(|| QfError::unknown_rate(token, epoch))
    }
}

// ============================================================================
// Denominated
// ============================================================================

/// Resolver that converts the round's own token at exactly 1.
///
/// Every other token is delegated to `inner`. If `inner` does quote the
/// round token, the quote must be 1: any other value means the table is
/// expressed in a different unit and is rejected as `InvalidConfiguration`.
#[derive(Debug, Clone)]
pub struct Denominated<R> {
    denomination: String,
    inner: R,
}

impl<R: RateResolver> Denominated<R> {
    pub fn new(denomination: impl Into<String>, inner: R) -> Self {
        Self {
            denomination: denomination.into(),
            inner,
        }
    }

    pub fn denomination(&self) -> &str {
        &self.denomination
    }
}

impl<R: RateResolver> RateResolver for Denominated<R> {
    fn rate(&self, token: &str, epoch: u64) -> Result<Decimal> {
        if token != self.denomination {
            return self.inner.rate(token, epoch);
        }
        match self.inner.rate(token, epoch) {
            Ok(rate) if rate == Decimal::ONE => Ok(rate),
            Ok(rate) => Err(QfError::InvalidConfiguration(format!(
                "rate table quotes the round token `{token}` at {rate} for epoch {epoch}; \
                 rates must be expressed in `{token}` units"
            ))),
            Err(QfError::UnknownRate { .. }) => Ok(Decimal::ONE),
            Err(err) => Err(err),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
