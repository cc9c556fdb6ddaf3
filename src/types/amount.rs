//! Decimal amount utilities.
//!
//! ## Overview
//!
//! Every quantity in a round (vote amounts, rates, donated totals, matches)
//! is a `rust_decimal::Decimal`: a 96-bit mantissa with up to 28 decimal
//! places. Nothing in the matching path touches `f64`; floats only appear at
//! the JSON boundary of the persisted round document.
//!
//! ## Examples
//!
//! ```
//! use qf_match::types::amount::{parse_amount, format_amount};
//!
//! let amount = parse_amount("4.50").unwrap();
//! assert_eq!(format_amount(amount), "4.5");
//! assert!(parse_amount("-1").is_none());
//! ```

use std::str::FromStr;

use rust_decimal::{Decimal, MathematicalOps};

/// Tolerance used when comparing normalized shares: 10^-12.
pub const EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 12);

// ============================================================================
// Conversion Functions
// ============================================================================

/// Parse a non-negative decimal string.
///
/// # Returns
///
/// * `Some(Decimal)` - The parsed amount
/// * `None` - If parsing fails or the value is negative
///
/// # Example
///
/// ```
/// use qf_match::types::amount::parse_amount;
/// use rust_decimal::Decimal;
///
/// assert_eq!(parse_amount("16"), Some(Decimal::from(16)));
/// assert_eq!(parse_amount("abc"), None);
/// ```
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let decimal = Decimal::from_str(s.trim()).ok()?;
    if decimal.is_sign_negative() && !decimal.is_zero() {
        return None;
    }
    Some(decimal)
}

/// Render a decimal without trailing zeros.
///
/// ```
/// use qf_match::types::amount::format_amount;
/// use rust_decimal::Decimal;
///
/// assert_eq!(format_amount(Decimal::new(1500, 3)), "1.5");
/// assert_eq!(format_amount(Decimal::from(50)), "50");
/// ```
pub fn format_amount(value: Decimal) -> String {
    value.normalize().to_string()
}

/// Canonical 16-byte encoding, identical for numerically equal values.
///
/// `1.0` and `1.00` carry different scales internally; normalizing first
/// keeps the encoding a function of the value alone.
pub fn canonical_bytes(value: Decimal) -> [u8; 16] {
    value.normalize().serialize()
}

// ============================================================================
// Arithmetic Functions
// ============================================================================

/// Square root of a non-negative decimal.
///
/// Returns `Some(0)` for zero and `None` for negative input.
pub fn checked_sqrt(value: Decimal) -> Option<Decimal> {
    if value.is_zero() {
        return Some(Decimal::ZERO);
    }
    if value.is_sign_negative() {
        return None;
    }
    value.sqrt()
}

/// `a * b`, `None` on overflow.
pub fn checked_mul(a: Decimal, b: Decimal) -> Option<Decimal> {
    a.checked_mul(b)
}

/// `a / b`, `None` on zero divisor or overflow.
pub fn checked_div(a: Decimal, b: Decimal) -> Option<Decimal> {
    if b.is_zero() {
        return None;
    }
    a.checked_div(b)
}

// ============================================================================
// Comparison Helpers
// ============================================================================

/// `true` if |a - b| <= tolerance
pub fn approx_eq(a: Decimal, b: Decimal, tolerance: Decimal) -> bool {
    (a - b).abs() <= tolerance
}

// ============================================================================
// Unit Tests
// ============================================================================
