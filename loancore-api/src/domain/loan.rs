use chrono::{DateTime, NaiveDate, Utc};
use heapless::String as HeaplessString;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Repayment frequency. `Custom` carries the period length in days; the
/// calculator derives installments-per-year as `365 / period_days` floored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    HalfYearly,
    Yearly,
    Custom(u32),
}

impl Frequency {
    /// Installments per year. `Custom` with `period_days == 0` is rejected
    /// by the calculator's term validation, never reaches here.
    pub fn installments_per_year(&self) -> u32 {
        match self {
            Frequency::Daily => 365,
            Frequency::Weekly => 52,
            Frequency::Monthly => 12,
            Frequency::Quarterly => 4,
            Frequency::HalfYearly => 2,
            Frequency::Yearly => 1,
            Frequency::Custom(period_days) => 365 / (*period_days).max(1),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Daily => write!(f, "Daily"),
            Frequency::Weekly => write!(f, "Weekly"),
            Frequency::Monthly => write!(f, "Monthly"),
            Frequency::Quarterly => write!(f, "Quarterly"),
            Frequency::HalfYearly => write!(f, "HalfYearly"),
            Frequency::Yearly => write!(f, "Yearly"),
            Frequency::Custom(period_days) => write!(f, "Custom:{period_days}"),
        }
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Daily" => Ok(Frequency::Daily),
            "Weekly" => Ok(Frequency::Weekly),
            "Monthly" => Ok(Frequency::Monthly),
            "Quarterly" => Ok(Frequency::Quarterly),
            "HalfYearly" => Ok(Frequency::HalfYearly),
            "Yearly" => Ok(Frequency::Yearly),
            other => {
                let period_days = other
                    .strip_prefix("Custom:")
                    .and_then(|n| n.parse::<u32>().ok())
                    .ok_or_else(|| format!("'{other}' is not a valid Frequency"))?;
                Ok(Frequency::Custom(period_days))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepaymentType {
    Emi,
    InterestOnly,
    Bullet,
    ReducingBalance,
}

impl fmt::Display for RepaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepaymentType::Emi => write!(f, "Emi"),
            RepaymentType::InterestOnly => write!(f, "InterestOnly"),
            RepaymentType::Bullet => write!(f, "Bullet"),
            RepaymentType::ReducingBalance => write!(f, "ReducingBalance"),
        }
    }
}

impl FromStr for RepaymentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Emi" => Ok(RepaymentType::Emi),
            "InterestOnly" => Ok(RepaymentType::InterestOnly),
            "Bullet" => Ok(RepaymentType::Bullet),
            "ReducingBalance" => Ok(RepaymentType::ReducingBalance),
            other => Err(format!("'{other}' is not a valid RepaymentType")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanStatus {
    Pending,
    Active,
    Closed,
    Preclosed,
    Defaulted,
}

impl LoanStatus {
    pub fn accepts_collections(&self) -> bool {
        matches!(self, LoanStatus::Active)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LoanStatus::Closed | LoanStatus::Preclosed | LoanStatus::Defaulted
        )
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoanStatus::Pending => write!(f, "Pending"),
            LoanStatus::Active => write!(f, "Active"),
            LoanStatus::Closed => write!(f, "Closed"),
            LoanStatus::Preclosed => write!(f, "Preclosed"),
            LoanStatus::Defaulted => write!(f, "Defaulted"),
        }
    }
}

impl FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(LoanStatus::Pending),
            "Active" => Ok(LoanStatus::Active),
            "Closed" => Ok(LoanStatus::Closed),
            "Preclosed" => Ok(LoanStatus::Preclosed),
            "Defaulted" => Ok(LoanStatus::Defaulted),
            other => Err(format!("'{other}' is not a valid LoanStatus")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChargeType {
    StampDuty,
    DocumentFee,
    ProcessingFee,
    Other,
}

impl fmt::Display for ChargeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChargeType::StampDuty => write!(f, "StampDuty"),
            ChargeType::DocumentFee => write!(f, "DocumentFee"),
            ChargeType::ProcessingFee => write!(f, "ProcessingFee"),
            ChargeType::Other => write!(f, "Other"),
        }
    }
}

impl FromStr for ChargeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "StampDuty" => Ok(ChargeType::StampDuty),
            "DocumentFee" => Ok(ChargeType::DocumentFee),
            "ProcessingFee" => Ok(ChargeType::ProcessingFee),
            "Other" => Ok(ChargeType::Other),
            other => Err(format!("'{other}' is not a valid ChargeType")),
        }
    }
}

/// The loan's fixed terms, as agreed at creation or at top-up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Decimal,
    pub annual_interest_percent: Decimal,
    pub tenure_installments: u32,
    pub frequency: Frequency,
    pub repayment_type: RepaymentType,
    pub grace_period_days: u32,
    pub late_fee_daily_percent: Decimal,
    pub penalty_percent: Decimal,
}

/// The central entity. Field groups follow: identity, terms
/// (embedded), derived-at-creation, disbursement, ledger, status, top-up
/// linkage, ownership.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loan {
    pub id: Uuid,
    pub loan_number: i64,

    pub terms: LoanTerms,

    // Derived at creation.
    pub installment_amount: Decimal,
    pub total_interest: Decimal,
    pub total_amount: Decimal,

    // Disbursement.
    pub disbursed_amount: Decimal,
    pub disbursed_at: Option<DateTime<Utc>>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,

    // Ledger.
    pub outstanding_principal: Decimal,
    pub outstanding_interest: Decimal,
    pub total_collected: Decimal,
    pub total_late_fees_paid: Decimal,
    pub total_penalties_paid: Decimal,

    pub status: LoanStatus,
    pub closed_at: Option<DateTime<Utc>>,

    // Top-up linkage.
    pub is_top_up: bool,
    pub original_loan_id: Option<Uuid>,
    pub top_up_amount: Option<Decimal>,

    // Ownership.
    pub customer_id: Uuid,
    pub created_by: Uuid,

    pub remarks: Option<HeaplessString<500>>,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

impl Loan {
    /// Unpaid-fees/penalties totals are tracked on the separate
    /// `LateFee`/`Penalty` records, not denormalized onto `Loan`; this
    /// helper sums a caller-supplied slice the same way the collection
    /// service does before allocating.
    pub fn outstanding_total(&self, unpaid_fees: Decimal, unpaid_penalties: Decimal) -> Decimal {
        self.outstanding_principal + self.outstanding_interest + unpaid_fees + unpaid_penalties
    }
}

/// (loan, type, amount) created only at loan creation or top-up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanCharge {
    pub id: Uuid,
    pub loan_id: Uuid,
    pub charge_type: ChargeType,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstallmentStatus {
    Scheduled,
    PartiallyPaid,
    Paid,
}

impl fmt::Display for InstallmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallmentStatus::Scheduled => write!(f, "Scheduled"),
            InstallmentStatus::PartiallyPaid => write!(f, "PartiallyPaid"),
            InstallmentStatus::Paid => write!(f, "Paid"),
        }
    }
}

impl FromStr for InstallmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Scheduled" => Ok(InstallmentStatus::Scheduled),
            "PartiallyPaid" => Ok(InstallmentStatus::PartiallyPaid),
            "Paid" => Ok(InstallmentStatus::Paid),
            other => Err(format!("'{other}' is not a valid InstallmentStatus")),
        }
    }
}

/// One row per installment of a loan. Generation is
/// idempotent by `(loan_id, installment_number)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub id: Uuid,
    pub loan_id: Uuid,
    pub installment_number: u32,
    pub due_date: NaiveDate,
    pub principal_due: Decimal,
    pub interest_due: Decimal,
    pub total_due: Decimal,
    pub principal_paid: Decimal,
    pub interest_paid: Decimal,
    pub total_paid: Decimal,
    pub status: InstallmentStatus,
    pub paid_at: Option<DateTime<Utc>>,
}

impl ScheduleRow {
    pub fn is_paid(&self) -> bool {
        self.total_paid >= self.total_due
    }

    pub fn remaining_due(&self) -> Decimal {
        (self.total_due - self.total_paid).max(Decimal::ZERO)
    }
}

/// Loan list/detail read-shape carrying the ledger totals and next-due-date
/// projection the dashboard and customer views need, without pulling in a
/// full analytics aggregation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanSummaryView {
    pub loan: Loan,
    pub next_due_date: Option<NaiveDate>,
    pub days_past_due: i64,
}

/// `POST /loans` request body. String-shaped constraints are
/// checked by `#[derive(Validate)]`; numeric business rules (principal > 0,
/// 0 <= rate <= 100, tenure >= 1) are the calculator's job and are checked
/// by `validate_terms` in `loancore-logic`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateLoanRequest {
    pub customer_id: Uuid,
    pub principal: Decimal,
    pub interest_rate: Decimal,
    pub frequency: Frequency,
    pub tenure_installments: u32,
    pub repayment_type: RepaymentType,
    pub grace_period_days: Option<u32>,
    pub late_fee_daily_percent: Option<Decimal>,
    pub penalty_percent: Option<Decimal>,
    pub charges: Option<Vec<ChargeInput>>,
    pub start_date: Option<NaiveDate>,
    #[validate(length(max = 500))]
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChargeInput {
    pub charge_type: ChargeType,
    pub amount: Decimal,
}

/// `PATCH /loans/{id}` request body.
#[derive(Debug, Clone, Deserialize)]
pub struct LoanActionRequest {
    pub action: LoanAction,
    pub remarks: Option<String>,
    pub disbursed_amount: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum LoanAction {
    Approve,
    Disburse,
    Close,
    Preclose,
    Default,
}

/// `POST /loans/topup` request body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TopUpRequest {
    pub loan_id: Uuid,
    pub top_up_amount: Decimal,
    pub new_tenure: Option<u32>,
    pub new_interest_rate: Option<Decimal>,
    pub charges: Option<Vec<ChargeInput>>,
    #[validate(length(max = 500))]
    pub remarks: Option<String>,
}
