use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::{AuditAction, AuditEntry};
use crate::error::LoanCoreResult;

/// Append-only audit trail. `record` is called in the same
/// transaction as the mutation it describes for loan/collection actions;
/// callers treat a write failure here as non-fatal and log it rather than
/// aborting the enclosing transaction.
#[async_trait]
pub trait AuditService: Send + Sync {
    #[allow(clippy::too_many_arguments)]
    async fn record(
        &self,
        actor_user_id: Uuid,
        action: AuditAction,
        entity_type: &str,
        entity_id: Uuid,
        before: Option<Value>,
        after: Option<Value>,
        remarks: Option<String>,
    ) -> LoanCoreResult<AuditEntry>;

    async fn find_by_entity(&self, entity_type: &str, entity_id: Uuid) -> LoanCoreResult<Vec<AuditEntry>>;
}
