use chrono::{DateTime, NaiveDate, Utc};
use heapless::String as HeaplessString;
use loancore_api::PaymentMethod;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Storage shape of `Collection`. Immutable once written;
/// `receipt_number` carries a unique constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CollectionModel {
    pub id: Uuid,
    pub loan_id: Uuid,
    pub agent_id: Uuid,
    pub amount: Decimal,
    pub principal_allocation: Decimal,
    pub interest_allocation: Decimal,
    pub fee_allocation: Decimal,
    pub penalty_allocation: Decimal,
    pub collection_date: NaiveDate,
    pub payment_method: PaymentMethod,
    pub receipt_number: HeaplessString<40>,
    pub remarks: Option<HeaplessString<500>>,
    pub created_at: DateTime<Utc>,
}

/// Storage shape of `LateFee`. `paid_amount` tracks partial settlement
/// across collections; `paid` flips once `paid_amount >= amount`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct LateFeeModel {
    pub id: Uuid,
    pub loan_id: Uuid,
    pub schedule_row_id: Uuid,
    pub amount: Decimal,
    pub paid_amount: Decimal,
    pub overdue_days: i64,
    pub applied_at: DateTime<Utc>,
    pub paid: bool,
}

/// Storage shape of `Penalty`. `paid_amount` tracks partial settlement
/// across collections; `paid` flips once `paid_amount >= amount`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PenaltyModel {
    pub id: Uuid,
    pub loan_id: Uuid,
    pub amount: Decimal,
    pub paid_amount: Decimal,
    pub reason: HeaplessString<200>,
    pub applied_at: DateTime<Utc>,
    pub paid: bool,
}
