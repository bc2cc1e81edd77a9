use chrono::{DateTime, Utc};
use heapless::String as HeaplessString;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditAction {
    LoanCreated,
    LoanApproved,
    LoanDisbursed,
    LoanClosed,
    LoanPreclosed,
    LoanDefaulted,
    LoanToppedUp,
    CollectionRecorded,
    UserCreated,
    UserDeactivated,
    CustomerCreated,
    CustomerDeleted,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditAction::LoanCreated => write!(f, "LoanCreated"),
            AuditAction::LoanApproved => write!(f, "LoanApproved"),
            AuditAction::LoanDisbursed => write!(f, "LoanDisbursed"),
            AuditAction::LoanClosed => write!(f, "LoanClosed"),
            AuditAction::LoanPreclosed => write!(f, "LoanPreclosed"),
            AuditAction::LoanDefaulted => write!(f, "LoanDefaulted"),
            AuditAction::LoanToppedUp => write!(f, "LoanToppedUp"),
            AuditAction::CollectionRecorded => write!(f, "CollectionRecorded"),
            AuditAction::UserCreated => write!(f, "UserCreated"),
            AuditAction::UserDeactivated => write!(f, "UserDeactivated"),
            AuditAction::CustomerCreated => write!(f, "CustomerCreated"),
            AuditAction::CustomerDeleted => write!(f, "CustomerDeleted"),
        }
    }
}

impl FromStr for AuditAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LoanCreated" => Ok(AuditAction::LoanCreated),
            "LoanApproved" => Ok(AuditAction::LoanApproved),
            "LoanDisbursed" => Ok(AuditAction::LoanDisbursed),
            "LoanClosed" => Ok(AuditAction::LoanClosed),
            "LoanPreclosed" => Ok(AuditAction::LoanPreclosed),
            "LoanDefaulted" => Ok(AuditAction::LoanDefaulted),
            "LoanToppedUp" => Ok(AuditAction::LoanToppedUp),
            "CollectionRecorded" => Ok(AuditAction::CollectionRecorded),
            "UserCreated" => Ok(AuditAction::UserCreated),
            "UserDeactivated" => Ok(AuditAction::UserDeactivated),
            "CustomerCreated" => Ok(AuditAction::CustomerCreated),
            "CustomerDeleted" => Ok(AuditAction::CustomerDeleted),
            other => Err(format!("'{other}' is not a valid AuditAction")),
        }
    }
}

/// Append-only entry with before/after state. Failure to
/// write an entry is logged at `warn` and never aborts the operation it
/// describes. A minimal write with just `actor == updated_by` and
/// `after == None` is the degenerate case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub actor_user_id: Uuid,
    pub action: AuditAction,
    pub entity_type: HeaplessString<40>,
    pub entity_id: Uuid,
    pub before: Option<serde_json::Value>,
    pub after: Option<serde_json::Value>,
    pub ip: Option<HeaplessString<45>>,
    pub user_agent: Option<HeaplessString<255>>,
    pub remarks: Option<HeaplessString<500>>,
    pub created_at: DateTime<Utc>,
}
