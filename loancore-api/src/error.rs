use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub type LoanCoreResult<T> = Result<T, LoanCoreError>;

/// The error taxonomy the HTTP surface maps to status codes (see
/// `loancore-http`'s error mapping). Calculator preconditions surface as
/// `InvalidTerms`/`ValidationError`; repository and service failures carry
/// enough context (loan id, actor, amounts) to reproduce without a second
/// round trip to the database.
#[derive(Debug, Error, Serialize, Deserialize)]
pub enum LoanCoreError {
    #[error("Loan not found: {0}")]
    LoanNotFound(Uuid),

    #[error("Customer not found: {0}")]
    CustomerNotFound(Uuid),

    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    #[error("Invalid loan terms: {0}")]
    InvalidTerms(String),

    #[error("Charges {charges} exceed principal {principal}")]
    ChargesExceedPrincipal { principal: Decimal, charges: Decimal },

    #[error("Loan {loan_id} is not in a collectable state: {status}")]
    StatusNotCollectable { loan_id: Uuid, status: String },

    #[error("Loan {loan_id} cannot make this transition from its current state: {status}")]
    InvalidLoanState { loan_id: Uuid, status: String },

    #[error("Collection amount {amount} exceeds outstanding total {outstanding}")]
    Overpayment { amount: Decimal, outstanding: Decimal },

    #[error("Loan {loan_id} has unpaid late fees or penalties")]
    HasOutstandingDues { loan_id: Uuid },

    #[error("Collection amount must be positive: {0}")]
    InvalidCollectionAmount(Decimal),

    #[error("Negative index k={0} is invalid for outstanding-after-k")]
    NegativeInstallmentIndex(i64),

    #[error("Validation error in {field}: {message}")]
    ValidationError { field: String, message: String },

    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Storage conflict on {entity}, retried once and still failed")]
    TransientFailure { entity: String },

    #[error("Receipt number collision: {0}")]
    ReceiptCollision(String),

    #[error("Date calculation error: {0}")]
    DateCalculationError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl LoanCoreError {
    /// Flags the state-conflict family so the HTTP surface can pick its own
    /// status code per variant (overpayment may render as 400 instead of
    /// 409); callers decide the exact code, this just flags the family.
    pub fn is_state_conflict(&self) -> bool {
        matches!(
            self,
            LoanCoreError::StatusNotCollectable { .. }
                | LoanCoreError::Overpayment { .. }
                | LoanCoreError::HasOutstandingDues { .. }
                | LoanCoreError::InvalidLoanState { .. }
        )
    }
}

impl From<anyhow::Error> for LoanCoreError {
    fn from(err: anyhow::Error) -> Self {
        LoanCoreError::Internal(err.to_string())
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for LoanCoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => LoanCoreError::Internal("row not found".to_string()),
            sqlx::Error::Database(ref db_err) => {
                // 40001 = serialization_failure, 40P01 = deadlock_detected: both are
                // expected under REPEATABLE READ contention on the same loan row and
                // are retried once by the caller (see collection_service_impl).
                let is_conflict = matches!(db_err.code().as_deref(), Some("40001") | Some("40P01"));
                if is_conflict {
                    LoanCoreError::TransientFailure {
                        entity: "loan".to_string(),
                    }
                } else if let Some(constraint) = db_err.constraint() {
                    LoanCoreError::TransientFailure {
                        entity: constraint.to_string(),
                    }
                } else {
                    LoanCoreError::Internal(format!("database error: {}", db_err.message()))
                }
            }
            _ => LoanCoreError::Internal(format!("database error: {err}")),
        }
    }
}

/// Carried alongside state-conflict variants in the HTTP error body so the
/// UI can render the overdue figure verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverdueContext {
    pub loan_id: Uuid,
    pub due_date: NaiveDate,
    pub overdue_days: i64,
}
