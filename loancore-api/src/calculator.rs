//! Pure, side-effect-free money calculations. These functions never
//! perform I/O and never see a raw string — the HTTP and repository
//! boundaries convert to `Decimal`/`NaiveDate`/enum values before calling
//! in here.

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;

use crate::domain::{AllocationBreakdown, Frequency, RepaymentType};
use crate::error::{LoanCoreError, LoanCoreResult};
use crate::money::round_amount;

/// One computed installment row, before a loan id / schedule row id exist.
/// `loancore-logic` maps these into `ScheduleRow` domain records.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduleEntry {
    pub installment_number: u32,
    pub due_date: NaiveDate,
    pub principal_due: Decimal,
    pub interest_due: Decimal,
    pub total_due: Decimal,
    pub outstanding_after: Decimal,
}

/// Per-period rate `r = (annual_percent / 100) / installments_per_year`.
pub fn period_rate(annual_interest_percent: Decimal, frequency: Frequency) -> Decimal {
    (annual_interest_percent / Decimal::from(100)) / Decimal::from(frequency.installments_per_year())
}

fn validate_terms(
    principal: Decimal,
    annual_interest_percent: Decimal,
    tenure_installments: u32,
    frequency: Frequency,
) -> LoanCoreResult<()> {
    if principal <= Decimal::ZERO {
        return Err(LoanCoreError::InvalidTerms(
            "principal must be positive".to_string(),
        ));
    }
    if tenure_installments == 0 {
        return Err(LoanCoreError::InvalidTerms(
            "tenure must be at least 1".to_string(),
        ));
    }
    if annual_interest_percent < Decimal::ZERO || annual_interest_percent > Decimal::from(100) {
        return Err(LoanCoreError::InvalidTerms(
            "interest rate must be between 0 and 100".to_string(),
        ));
    }
    if let Frequency::Custom(period_days) = frequency {
        if period_days == 0 {
            return Err(LoanCoreError::InvalidTerms(
                "custom frequency requires a positive period_days".to_string(),
            ));
        }
    }
    Ok(())
}

/// Standard amortization installment amount. Only meaningful for
/// `RepaymentType::Emi`; other repayment types compute their own periodic
/// amount in [`generate_schedule`].
pub fn installment_amount(
    principal: Decimal,
    annual_interest_percent: Decimal,
    tenure_installments: u32,
    frequency: Frequency,
) -> LoanCoreResult<Decimal> {
    validate_terms(principal, annual_interest_percent, tenure_installments, frequency)?;

    let r = period_rate(annual_interest_percent, frequency);
    let n = tenure_installments;

    let raw = if r.is_zero() {
        principal / Decimal::from(n)
    } else if n == 1 {
        principal * (Decimal::ONE + r)
    } else {
        let mut compounded = Decimal::ONE;
        for _ in 0..n {
            compounded *= Decimal::ONE + r;
        }
        (principal * r * compounded) / (compounded - Decimal::ONE)
    };

    Ok(round_amount(raw))
}

pub fn total_interest(installment: Decimal, tenure_installments: u32, principal: Decimal) -> Decimal {
    round_amount(installment * Decimal::from(tenure_installments) - principal)
}

/// Advances `start_date` by `n` periods. Calendar-month arithmetic for
/// monthly/quarterly/half-yearly/yearly; fixed day-count arithmetic for
/// daily/weekly/custom.
pub fn advance_due_date(start_date: NaiveDate, installment_number: u32, frequency: Frequency) -> NaiveDate {
    match frequency {
        Frequency::Daily => start_date + chrono::Duration::days(installment_number as i64),
        Frequency::Weekly => start_date + chrono::Duration::days(7 * installment_number as i64),
        Frequency::Custom(period_days) => {
            start_date + chrono::Duration::days(period_days as i64 * installment_number as i64)
        }
        Frequency::Monthly | Frequency::Quarterly | Frequency::HalfYearly | Frequency::Yearly => {
            let months_per_period = match frequency {
                Frequency::Monthly => 1,
                Frequency::Quarterly => 3,
                Frequency::HalfYearly => 6,
                Frequency::Yearly => 12,
                _ => unreachable!(),
            };
            let total_months = months_per_period * installment_number;
            let day = start_date.day();
            start_date
                .with_day(1)
                .expect("day 1 always valid")
                .checked_add_months(Months::new(total_months))
                .and_then(|d| d.with_day(day.min(28)))
                .unwrap_or(start_date)
        }
    }
}

/// Walks installments 1..=n emitting one `ScheduleEntry` per row. The walk
/// absorbs rounding drift into the final row's principal, never rounds an
/// intermediate outstanding balance, and guarantees
/// `sum(principal_due) == principal` exactly.
pub fn generate_schedule(
    principal: Decimal,
    annual_interest_percent: Decimal,
    tenure_installments: u32,
    frequency: Frequency,
    repayment_type: RepaymentType,
    start_date: NaiveDate,
) -> LoanCoreResult<Vec<ScheduleEntry>> {
    validate_terms(principal, annual_interest_percent, tenure_installments, frequency)?;

    let r = period_rate(annual_interest_percent, frequency);
    let n = tenure_installments;

    match repayment_type {
        RepaymentType::Emi => {
            let installment = installment_amount(principal, annual_interest_percent, n, frequency)?;
            let mut outstanding = principal;
            let mut rows = Vec::with_capacity(n as usize);
            for i in 1..=n {
                let interest_due = round_amount(outstanding * r);
                let mut principal_due = installment - interest_due;
                if i == n {
                    principal_due = outstanding;
                }
                principal_due = principal_due.min(outstanding);
                let total_due = principal_due + interest_due;
                outstanding = (outstanding - principal_due).max(Decimal::ZERO);
                rows.push(ScheduleEntry {
                    installment_number: i,
                    due_date: advance_due_date(start_date, i, frequency),
                    principal_due,
                    interest_due,
                    total_due,
                    outstanding_after: outstanding,
                });
            }
            Ok(rows)
        }
        RepaymentType::ReducingBalance => {
            let base_principal_due = round_amount(principal / Decimal::from(n));
            let mut outstanding = principal;
            let mut rows = Vec::with_capacity(n as usize);
            for i in 1..=n {
                let interest_due = round_amount(outstanding * r);
                let mut principal_due = base_principal_due;
                if i == n {
                    principal_due = outstanding;
                }
                principal_due = principal_due.min(outstanding);
                let total_due = principal_due + interest_due;
                outstanding = (outstanding - principal_due).max(Decimal::ZERO);
                rows.push(ScheduleEntry {
                    installment_number: i,
                    due_date: advance_due_date(start_date, i, frequency),
                    principal_due,
                    interest_due,
                    total_due,
                    outstanding_after: outstanding,
                });
            }
            Ok(rows)
        }
        RepaymentType::InterestOnly | RepaymentType::Bullet => {
            let mut rows = Vec::with_capacity(n as usize);
            let interest_only_payment = round_amount(principal * r);
            for i in 1..n {
                rows.push(ScheduleEntry {
                    installment_number: i,
                    due_date: advance_due_date(start_date, i, frequency),
                    principal_due: Decimal::ZERO,
                    interest_due: interest_only_payment,
                    total_due: interest_only_payment,
                    outstanding_after: principal,
                });
            }
            rows.push(ScheduleEntry {
                installment_number: n,
                due_date: advance_due_date(start_date, n, frequency),
                principal_due: principal,
                interest_due: interest_only_payment,
                total_due: principal + interest_only_payment,
                outstanding_after: Decimal::ZERO,
            });
            Ok(rows)
        }
    }
}

/// Outstanding principal balance after `k` installments have been paid in
/// full, per the same walk as [`generate_schedule`].
pub fn outstanding_after(
    principal: Decimal,
    annual_interest_percent: Decimal,
    tenure_installments: u32,
    frequency: Frequency,
    repayment_type: RepaymentType,
    k: i64,
    start_date: NaiveDate,
) -> LoanCoreResult<Decimal> {
    if k < 0 {
        return Err(LoanCoreError::NegativeInstallmentIndex(k));
    }
    if k as u32 >= tenure_installments {
        return Ok(Decimal::ZERO);
    }
    let rows = generate_schedule(
        principal,
        annual_interest_percent,
        tenure_installments,
        frequency,
        repayment_type,
        start_date,
    )?;
    Ok(rows[k as usize].outstanding_after)
}

/// Days strictly after `due_date`, minus the grace period, floored at zero.
pub fn overdue_days_with_grace(today: NaiveDate, due_date: NaiveDate, grace_period_days: u32) -> i64 {
    if today <= due_date {
        return 0;
    }
    let diff = (today - due_date).num_days();
    (diff - grace_period_days as i64).max(0)
}

/// `late_fee = base_amount * daily_rate * overdue_days`, base is the
/// installment amount unless a tenant configures otherwise, optionally capped.
pub fn late_fee(
    base_amount: Decimal,
    daily_rate_percent: Decimal,
    overdue_days: i64,
    cap: Option<Decimal>,
) -> Decimal {
    if overdue_days <= 0 {
        return Decimal::ZERO;
    }
    let raw = base_amount * (daily_rate_percent / Decimal::from(100)) * Decimal::from(overdue_days);
    let rounded = round_amount(raw);
    match cap {
        Some(cap) => rounded.min(cap),
        None => rounded,
    }
}

/// Either a flat amount or a percent of `base`; `reason` is recorded
/// verbatim by the caller.
pub fn penalty_amount(base: Decimal, percent: Option<Decimal>, flat: Option<Decimal>) -> Decimal {
    match (flat, percent) {
        (Some(flat), _) => round_amount(flat),
        (None, Some(percent)) => round_amount(base * (percent / Decimal::from(100))),
        (None, None) => Decimal::ZERO,
    }
}

/// `preclosure = outstanding_principal + accrued_interest_this_period +
/// penalty`; remaining scheduled interest is waived.
pub fn preclosure_amount(
    outstanding_principal: Decimal,
    accrued_interest_current_period: Decimal,
    preclosure_penalty_percent: Decimal,
) -> Decimal {
    let penalty = round_amount(outstanding_principal * (preclosure_penalty_percent / Decimal::from(100)));
    round_amount(outstanding_principal + accrued_interest_current_period + penalty)
}

/// Recomputed terms for a top-up.
#[derive(Debug, Clone, Copy)]
pub struct TopUpCalculation {
    pub new_principal: Decimal,
    pub new_installment: Decimal,
    pub increment_in_emi: Decimal,
    pub disbursed_to_customer: Decimal,
}

pub fn recompute_top_up(
    existing_outstanding_principal: Decimal,
    top_up_amount: Decimal,
    new_tenure: u32,
    new_annual_interest_percent: Decimal,
    frequency: Frequency,
    previous_installment: Decimal,
    new_charges_total: Decimal,
) -> LoanCoreResult<TopUpCalculation> {
    let new_principal = existing_outstanding_principal + top_up_amount;
    let new_installment = installment_amount(new_principal, new_annual_interest_percent, new_tenure, frequency)?;
    let disbursed_to_customer = round_amount(top_up_amount - new_charges_total);
    if disbursed_to_customer <= Decimal::ZERO {
        return Err(LoanCoreError::InvalidTerms(
            "top-up charges leave nothing to disburse".to_string(),
        ));
    }
    Ok(TopUpCalculation {
        new_principal,
        new_installment,
        increment_in_emi: round_amount(new_installment - previous_installment),
        disbursed_to_customer,
    })
}

/// Priority-ordered collection allocation: unpaid late fees (oldest first)
/// -> unpaid penalties (oldest first) -> interest -> principal. Any
/// remainder after principal is fully repaid is an overpayment and fails
/// the request; callers never see a non-zero remainder out of this
/// function. `unpaid_fees`/`unpaid_penalties` are passed as per-item
/// amounts already sorted oldest-first by the caller.
pub fn allocate_collection(
    amount: Decimal,
    unpaid_fees: &[Decimal],
    unpaid_penalties: &[Decimal],
    outstanding_interest: Decimal,
    outstanding_principal: Decimal,
) -> LoanCoreResult<AllocationBreakdown> {
    if amount <= Decimal::ZERO {
        return Err(LoanCoreError::InvalidCollectionAmount(amount));
    }

    let mut remaining = amount;
    let mut out = AllocationBreakdown::default();

    for fee in unpaid_fees {
        if remaining <= Decimal::ZERO {
            break;
        }
        let pay = (*fee).min(remaining);
        out.fee_paid += pay;
        remaining -= pay;
    }

    for penalty in unpaid_penalties {
        if remaining <= Decimal::ZERO {
            break;
        }
        let pay = (*penalty).min(remaining);
        out.penalty_paid += pay;
        remaining -= pay;
    }

    if remaining > Decimal::ZERO {
        let pay = outstanding_interest.min(remaining);
        out.interest_paid = pay;
        remaining -= pay;
    }

    if remaining > Decimal::ZERO {
        let pay = outstanding_principal.min(remaining);
        out.principal_paid = pay;
        remaining -= pay;
    }

    if remaining > Decimal::ZERO {
        let outstanding_total = unpaid_fees.iter().sum::<Decimal>()
            + unpaid_penalties.iter().sum::<Decimal>()
            + outstanding_interest
            + outstanding_principal;
        return Err(LoanCoreError::Overpayment {
            amount,
            outstanding: outstanding_total,
        });
    }

    Ok(out)
}

/// Degenerate two-bucket allocator (interest then principal) used when no
/// fees or penalties exist on the loan.
pub fn allocate_collection_two_bucket(
    amount: Decimal,
    outstanding_interest: Decimal,
    outstanding_principal: Decimal,
) -> LoanCoreResult<AllocationBreakdown> {
    allocate_collection(amount, &[], &[], outstanding_interest, outstanding_principal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn emi_monthly_standard_case() {
        let installment =
            installment_amount(dec!(100000), dec!(12), 12, Frequency::Monthly).unwrap();
        assert_eq!(installment, dec!(8884.88));
    }

    #[test]
    fn zero_rate_splits_principal_evenly() {
        let installment = installment_amount(dec!(5200), dec!(0), 52, Frequency::Weekly).unwrap();
        assert_eq!(installment, dec!(100.00));
        let rows = generate_schedule(
            dec!(5200),
            dec!(0),
            52,
            Frequency::Weekly,
            RepaymentType::Emi,
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        )
        .unwrap();
        for row in &rows {
            assert_eq!(row.principal_due, dec!(100.00));
            assert_eq!(row.interest_due, dec!(0.00));
        }
        let outstanding_after_10 = rows[9].outstanding_after;
        assert_eq!(outstanding_after_10, dec!(4200.00));
    }

    #[test]
    fn tenure_one_pays_principal_plus_one_period_interest() {
        let installment = installment_amount(dec!(1000), dec!(12), 1, Frequency::Monthly).unwrap();
        assert_eq!(installment, dec!(1010.00));
    }

    #[test]
    fn schedule_principal_sums_to_exactly_principal() {
        let principal = dec!(100000);
        let rows = generate_schedule(
            principal,
            dec!(12),
            12,
            Frequency::Monthly,
            RepaymentType::Emi,
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        )
        .unwrap();
        let total: Decimal = rows.iter().map(|r| r.principal_due).sum();
        assert_eq!(total, principal);
        assert_eq!(rows.last().unwrap().outstanding_after, Decimal::ZERO);
    }

    #[test]
    fn reducing_balance_principal_sums_to_principal() {
        let principal = dec!(9999.97);
        let rows = generate_schedule(
            principal,
            dec!(10),
            7,
            Frequency::Monthly,
            RepaymentType::ReducingBalance,
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        )
        .unwrap();
        let total: Decimal = rows.iter().map(|r| r.principal_due).sum();
        assert_eq!(total, principal);
    }

    #[test]
    fn bullet_schedule_has_n_minus_one_interest_only_rows() {
        let rows = generate_schedule(
            dec!(10000),
            dec!(12),
            6,
            Frequency::Monthly,
            RepaymentType::Bullet,
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        )
        .unwrap();
        for row in &rows[..5] {
            assert_eq!(row.principal_due, Decimal::ZERO);
        }
        assert_eq!(rows[5].principal_due, dec!(10000));
        assert_eq!(rows[5].outstanding_after, Decimal::ZERO);
    }

    #[test]
    fn custom_frequency_requires_positive_period_days() {
        let err = installment_amount(dec!(1000), dec!(10), 5, Frequency::Custom(0));
        assert!(err.is_err());
    }

    #[test]
    fn overdue_days_before_due_date_is_zero() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let due = NaiveDate::from_ymd_opt(2026, 1, 10).unwrap();
        assert_eq!(overdue_days_with_grace(today, due, 0), 0);
    }

    #[test]
    fn overdue_days_within_grace_is_zero() {
        let due = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 1, 4).unwrap();
        assert_eq!(overdue_days_with_grace(today, due, 5), 0);
    }

    #[test]
    fn overdue_days_past_grace_subtracts_grace() {
        let due = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 1, 20).unwrap();
        assert_eq!(overdue_days_with_grace(today, due, 5), 14);
    }

    #[test]
    fn allocation_with_fees_and_penalties_matches_priority_order() {
        let result = allocate_collection(dec!(6000), &[dec!(200)], &[dec!(500)], dec!(5000), dec!(50000)).unwrap();
        assert_eq!(result.fee_paid, dec!(200));
        assert_eq!(result.penalty_paid, dec!(500));
        assert_eq!(result.interest_paid, dec!(5000));
        assert_eq!(result.principal_paid, dec!(300));
    }

    #[test]
    fn allocation_rejects_overpayment() {
        let result = allocate_collection_two_bucket(dec!(1500), dec!(500), dec!(500));
        assert!(matches!(result, Err(LoanCoreError::Overpayment { .. })));
    }

    #[test]
    fn allocation_exact_outstanding_succeeds() {
        let result = allocate_collection_two_bucket(dec!(0.50), dec!(0.00), dec!(0.50)).unwrap();
        assert_eq!(result.principal_paid, dec!(0.50));
    }

    #[test]
    fn top_up_recomputation() {
        let calc = recompute_top_up(
            dec!(60000),
            dec!(40000),
            12,
            dec!(12),
            Frequency::Monthly,
            dec!(8885),
            dec!(1000),
        )
        .unwrap();
        assert_eq!(calc.new_principal, dec!(100000));
        assert_eq!(calc.disbursed_to_customer, dec!(39000));
    }
}
