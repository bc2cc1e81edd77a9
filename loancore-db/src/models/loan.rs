use chrono::{DateTime, NaiveDate, Utc};
use heapless::String as HeaplessString;
use loancore_api::{ChargeType, Frequency, InstallmentStatus, LoanStatus, RepaymentType};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Storage shape of `Loan`. Terms are flattened onto the row rather than
/// nested, matching how the table is actually laid out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct LoanModel {
    pub id: Uuid,
    pub loan_number: i64,

    pub principal: Decimal,
    pub annual_interest_percent: Decimal,
    pub tenure_installments: i32,
    pub frequency: Frequency,
    pub repayment_type: RepaymentType,
    pub grace_period_days: i32,
    pub late_fee_daily_percent: Decimal,
    pub penalty_percent: Decimal,

    pub installment_amount: Decimal,
    pub total_interest: Decimal,
    pub total_amount: Decimal,

    pub disbursed_amount: Decimal,
    pub disbursed_at: Option<DateTime<Utc>>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,

    pub outstanding_principal: Decimal,
    pub outstanding_interest: Decimal,
    pub total_collected: Decimal,
    pub total_late_fees_paid: Decimal,
    pub total_penalties_paid: Decimal,

    pub status: LoanStatus,
    pub closed_at: Option<DateTime<Utc>>,

    pub is_top_up: bool,
    pub original_loan_id: Option<Uuid>,
    pub top_up_amount: Option<Decimal>,

    pub customer_id: Uuid,
    pub created_by: Uuid,

    pub remarks: Option<HeaplessString<500>>,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

/// Storage shape of `LoanCharge`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct LoanChargeModel {
    pub id: Uuid,
    pub loan_id: Uuid,
    pub charge_type: ChargeType,
    pub amount: Decimal,
}

/// Storage shape of `ScheduleRow`. Unique on `(loan_id, installment_number)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ScheduleRowModel {
    pub id: Uuid,
    pub loan_id: Uuid,
    pub installment_number: i32,
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
