use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use crate::error::{LoanCoreError, LoanCoreResult};

/// Fractional digits stored/transported for money fields.
pub const AMOUNT_SCALE: u32 = 2;
/// Fractional digits stored/transported for rate fields.
pub const RATE_SCALE: u32 = 3;

/// Rounds `value` HALF_UP to `scale` fractional digits. This is the only
/// rounding primitive the calculator uses — intermediate schedule-walk
/// values are never rounded until emission.
pub fn round_half_up(value: Decimal, scale: u32) -> Decimal {
    value.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero)
}

pub fn round_amount(value: Decimal) -> Decimal {
    round_half_up(value, AMOUNT_SCALE)
}

pub fn round_rate(value: Decimal) -> Decimal {
    round_half_up(value, RATE_SCALE)
}

/// Parses the canonical textual form ("123.45") into a `Decimal`. Money
/// never arrives as binary floating point in persisted or transported form;
/// this is the only entry point the HTTP/JSON boundary and the storage
/// layer use to produce a `Decimal` from a string.
pub fn parse_canonical(input: &str) -> LoanCoreResult<Decimal> {
    Decimal::from_str(input.trim()).map_err(|e| LoanCoreError::ValidationError {
        field: "amount".to_string(),
        message: format!("'{input}' is not a valid decimal amount: {e}"),
    })
}

/// Formats `value` as its canonical textual form, rounded to `scale` digits.
pub fn to_canonical(value: Decimal, scale: u32) -> String {
    round_half_up(value, scale).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn half_up_rounds_away_from_zero_at_midpoint() {
        assert_eq!(round_amount(dec!(1.005)), dec!(1.01));
        assert_eq!(round_amount(dec!(1.004)), dec!(1.00));
        assert_eq!(round_amount(dec!(-1.005)), dec!(-1.01));
    }

    #[test]
    fn canonical_round_trip() {
        let original = dec!(123.45);
        let text = to_canonical(original, AMOUNT_SCALE);
        assert_eq!(text, "123.45");
        assert_eq!(parse_canonical(&text).unwrap(), original);
    }

    #[test]
    fn rejects_non_decimal_text() {
        assert!(parse_canonical("not-a-number").is_err());
    }
}
