use chrono::{DateTime, NaiveDate, Utc};
use heapless::String as HeaplessString;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapitalLedgerStatus {
    Active,
    Closed,
}

impl fmt::Display for CapitalLedgerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapitalLedgerStatus::Active => write!(f, "Active"),
            CapitalLedgerStatus::Closed => write!(f, "Closed"),
        }
    }
}

impl FromStr for CapitalLedgerStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(CapitalLedgerStatus::Active),
            "Closed" => Ok(CapitalLedgerStatus::Closed),
            other => Err(format!("'{other}' is not a valid CapitalLedgerStatus")),
        }
    }
}

/// Capital ledger entries. Read by analytics, written by dedicated
/// endpoints; they affect no loan invariant and are outside the money
/// engine's write path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Investment {
    pub id: Uuid,
    pub amount: Decimal,
    pub source: HeaplessString<255>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub status: CapitalLedgerStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Borrowing {
    pub id: Uuid,
    pub amount: Decimal,
    pub lender: HeaplessString<255>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub status: CapitalLedgerStatus,
    pub created_at: DateTime<Utc>,
}

/// `POST /investments` request body.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateInvestmentRequest {
    pub amount: Decimal,
    pub source: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

/// `POST /borrowings` request body.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBorrowingRequest {
    pub amount: Decimal,
    pub lender: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

/// Net capital position read by `GET /analytics`; not itself a loan
/// invariant, just a sum of the two ledgers above.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CapitalPosition {
    pub total_active_investment: Decimal,
    pub total_active_borrowing: Decimal,
}
