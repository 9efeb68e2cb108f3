//! Money primitives for the scheduling engine.
//!
//! Every monetary value inside the engine is an integer number of cents
//! (`Cents = i64`). `Decimal` appears only at the ingest boundary, while
//! parsing dollar amounts from external input; no floating point enters the
//! computation path at any point.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::{CfsError, CfsResult};

/// Integer cents. Signed; adjustments may be negative.
pub type Cents = i64;

/// Hard per-amount ceiling: 1,000,000,000 cents ($10,000,000).
pub const MAX_AMOUNT_CENTS: Cents = 1_000_000_000;

/// Convert a decimal dollar amount to cents.
///
/// Exact for amounts with up to two fractional digits; anything finer is
/// rejected rather than silently rounded. The per-amount ceiling is enforced
/// on the result.
///
/// # Errors
///
/// `InvalidAmount` when the amount carries more than two fractional digits,
/// overflows during scaling, or exceeds the ceiling.
pub fn to_cents(dollars: Decimal) -> CfsResult<Cents> {
    let normalized = dollars.normalize();
    if normalized.scale() > 2 {
        return Err(CfsError::invalid_amount(format!(
            "{dollars} has more than two fractional digits"
        )));
    }

    let scaled = normalized
        .checked_mul(dec!(100))
        .ok_or_else(|| CfsError::invalid_amount(format!("{dollars} overflows cent scaling")))?;

    let cents = scaled
        .to_i64()
        .ok_or_else(|| CfsError::invalid_amount(format!("{dollars} does not fit in 64 bits")))?;

    check_amount(cents)
}

/// Enforce the per-amount ceiling on a cent value.
pub fn check_amount(cents: Cents) -> CfsResult<Cents> {
    if cents.abs() > MAX_AMOUNT_CENTS {
        return Err(CfsError::invalid_amount(format!(
            "{} exceeds the maximum allowed amount of {}",
            cents_to_string(cents),
            cents_to_string(MAX_AMOUNT_CENTS),
        )));
    }
    Ok(cents)
}

/// Render cents as a `"D.CC"` string, e.g. `22500` -> `"225.00"`,
/// `-5000` -> `"-50.00"`.
pub fn cents_to_string(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(dec!(100.00), 10_000; "two fractional digits")]
    #[test_case(dec!(90.50), 9_050; "fifty cents")]
    #[test_case(dec!(0), 0; "zero")]
    #[test_case(dec!(1021), 102_100; "whole dollars")]
    #[test_case(dec!(-50.00), -5_000; "negative")]
    #[test_case(dec!(2.500), 250; "trailing zero normalizes away")]
    fn test_to_cents(dollars: Decimal, expected: Cents) {
        assert_eq!(to_cents(dollars).unwrap(), expected);
    }

    #[test]
    fn test_to_cents_rejects_extra_precision() {
        let result = to_cents(dec!(10.125));
        assert!(matches!(result, Err(CfsError::InvalidAmount { .. })));
    }

    #[test]
    fn test_to_cents_rejects_over_ceiling() {
        let result = to_cents(dec!(10_000_000.01));
        assert!(matches!(result, Err(CfsError::InvalidAmount { .. })));

        // The ceiling itself is allowed.
        assert_eq!(to_cents(dec!(10_000_000)).unwrap(), MAX_AMOUNT_CENTS);
    }

    #[test]
    fn test_cents_to_string() {
        assert_eq!(cents_to_string(22_500), "225.00");
        assert_eq!(cents_to_string(9_050), "90.50");
        assert_eq!(cents_to_string(5), "0.05");
        assert_eq!(cents_to_string(0), "0.00");
        assert_eq!(cents_to_string(-5_000), "-50.00");
        assert_eq!(cents_to_string(-5), "-0.05");
    }

    #[test]
    fn test_check_amount_bounds() {
        assert!(check_amount(MAX_AMOUNT_CENTS).is_ok());
        assert!(check_amount(-MAX_AMOUNT_CENTS).is_ok());
        assert!(check_amount(MAX_AMOUNT_CENTS + 1).is_err());
        assert!(check_amount(-MAX_AMOUNT_CENTS - 1).is_err());
    }
}
