//! Boundary validation the calculator does not perform on its own:
//! `validator::Validate` checks string-shaped constraints on request DTOs,
//! `loancore_api::calculator::validate_terms` (reached indirectly through
//! `installment_amount`/`generate_schedule`) checks the numeric term
//! preconditions. What is left is the charges-vs-principal relationship,
//! which spans both the request and the terms at once.

use loancore_api::{ChargeInput, LoanCoreError, LoanCoreResult};
use rust_decimal::Decimal;

/// Sums `charges` and fails with `ChargesExceedPrincipal` unless
/// `disbursed_amount = principal - sum(charges)` is strictly positive,
/// matching the `disbursed-amount + Σ(charges.amount) = principal`
/// invariant.
pub fn validate_charges(principal: Decimal, charges: &[ChargeInput]) -> LoanCoreResult<Decimal> {
    let total: Decimal = charges.iter().map(|c| c.amount).sum();
    if total >= principal {
        return Err(LoanCoreError::ChargesExceedPrincipal {
            principal,
            charges: total,
        });
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use loancore_api::ChargeType;
    use rust_decimal_macros::dec;

    #[test]
    fn charges_below_principal_pass() {
        let charges = vec![ChargeInput {
            charge_type: ChargeType::ProcessingFee,
            amount: dec!(200),
        }];
        assert_eq!(validate_charges(dec!(10000), &charges).unwrap(), dec!(200));
    }

    #[test]
    fn charges_at_or_above_principal_fail() {
        let charges = vec![ChargeInput {
            charge_type: ChargeType::ProcessingFee,
            amount: dec!(10000),
        }];
        let err = validate_charges(dec!(10000), &charges);
        assert!(matches!(err, Err(LoanCoreError::ChargesExceedPrincipal { .. })));
    }
}
