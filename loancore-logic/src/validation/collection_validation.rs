//! Fails fast, before a transaction is opened, on the request shapes the
//! allocator would otherwise reject only after the row lock is held.

use loancore_api::{LoanCoreError, LoanCoreResult};
use rust_decimal::Decimal;

pub fn validate_amount(amount: Decimal) -> LoanCoreResult<()> {
    if amount <= Decimal::ZERO {
        return Err(LoanCoreError::InvalidCollectionAmount(amount));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn zero_and_negative_amounts_fail() {
        assert!(validate_amount(dec!(0)).is_err());
        assert!(validate_amount(dec!(-1)).is_err());
    }

    #[test]
    fn positive_amount_passes() {
        assert!(validate_amount(dec!(0.01)).is_ok());
    }
}
