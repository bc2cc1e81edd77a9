use chrono::{DateTime, NaiveDate, Utc};
use heapless::String as HeaplessString;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    Cash,
    BankTransfer,
    Upi,
    Cheque,
    MobileWallet,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::Cash => write!(f, "Cash"),
            PaymentMethod::BankTransfer => write!(f, "BankTransfer"),
            PaymentMethod::Upi => write!(f, "Upi"),
            PaymentMethod::Cheque => write!(f, "Cheque"),
            PaymentMethod::MobileWallet => write!(f, "MobileWallet"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Cash" => Ok(PaymentMethod::Cash),
            "BankTransfer" => Ok(PaymentMethod::BankTransfer),
            "Upi" => Ok(PaymentMethod::Upi),
            "Cheque" => Ok(PaymentMethod::Cheque),
            "MobileWallet" => Ok(PaymentMethod::MobileWallet),
            other => Err(format!("'{other}' is not a valid PaymentMethod")),
        }
    }
}

/// Immutable once written; `receipt_number` is globally unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
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

/// Created by the engine; paid when a collection's allocation consumes it.
/// `paid_amount` accumulates across collections smaller than `amount` so a
/// fee settled over two or more partial payments converges instead of
/// re-presenting its full amount every time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LateFee {
    pub id: Uuid,
    pub loan_id: Uuid,
    pub schedule_row_id: Uuid,
    pub amount: Decimal,
    pub paid_amount: Decimal,
    pub overdue_days: i64,
    pub applied_at: DateTime<Utc>,
    pub paid: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Penalty {
    pub id: Uuid,
    pub loan_id: Uuid,
    pub amount: Decimal,
    pub paid_amount: Decimal,
    pub reason: HeaplessString<200>,
    pub applied_at: DateTime<Utc>,
    pub paid: bool,
}

/// Priority-ordered breakdown of how a collection amount was consumed.
/// The four fields always sum to the collected amount exactly — a
/// remainder fails the request as an overpayment before this value is
/// ever constructed.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AllocationBreakdown {
    pub fee_paid: Decimal,
    pub penalty_paid: Decimal,
    pub interest_paid: Decimal,
    pub principal_paid: Decimal,
}

impl AllocationBreakdown {
    pub fn total(&self) -> Decimal {
        self.fee_paid + self.penalty_paid + self.interest_paid + self.principal_paid
    }
}

/// `POST /collections` request body.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordCollectionRequest {
    pub loan_id: Uuid,
    pub amount: Decimal,
    pub collection_date: Option<NaiveDate>,
    pub payment_method: Option<PaymentMethod>,
    pub remarks: Option<String>,
}
