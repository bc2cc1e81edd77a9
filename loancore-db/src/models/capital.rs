use chrono::{DateTime, NaiveDate, Utc};
use heapless::String as HeaplessString;
use loancore_api::CapitalLedgerStatus;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Storage shape of `Investment`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InvestmentModel {
    pub id: Uuid,
    pub amount: Decimal,
    pub source: HeaplessString<255>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub status: CapitalLedgerStatus,
    pub created_at: DateTime<Utc>,
}

/// Storage shape of `Borrowing`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct BorrowingModel {
    pub id: Uuid,
    pub amount: Decimal,
    pub lender: HeaplessString<255>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub status: CapitalLedgerStatus,
    pub created_at: DateTime<Utc>,
}
