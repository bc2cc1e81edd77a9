use async_trait::async_trait;
use chrono::Utc;
use heapless::String as HeaplessString;
use loancore_api::{AuditAction, AuditEntry, AuditService, LoanCoreResult};
use loancore_db::{AuditEntryModel, AuditRepository, UnitOfWork, UnitOfWorkSession};
use serde_json::Value;
use sqlx::Postgres;
use std::sync::Arc;
use uuid::Uuid;

use crate::mappers::audit_mapper;

/// Append-only audit trail. Used two ways by the other services: called
/// with its own freshly-begun session for reads, and invoked with an
/// already-open `UnitOfWorkSession` (via [`AuditServiceImpl::record_in`])
/// when the write must land inside the caller's transaction, per the
/// in-transaction audit policy for loan/collection mutations.
pub struct AuditServiceImpl<U: UnitOfWork<Postgres>> {
    uow: Arc<U>,
}

impl<U: UnitOfWork<Postgres>> AuditServiceImpl<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    /// Writes the entry using an already-open session, so it commits or
    /// rolls back atomically with the mutation it describes. Callers log a
    /// `warn` and continue on `Err` rather than aborting the transaction.
    pub async fn record_in<S: UnitOfWorkSession<Postgres>>(
        session: &S,
        actor_user_id: Uuid,
        action: AuditAction,
        entity_type: &str,
        entity_id: Uuid,
        before: Option<Value>,
        after: Option<Value>,
        remarks: Option<String>,
    ) -> LoanCoreResult<AuditEntry> {
        let model = AuditEntryModel {
            id: Uuid::new_v4(),
            actor_user_id,
            action,
            entity_type: HeaplessString::try_from(entity_type).map_err(|_| {
                loancore_api::LoanCoreError::ValidationError {
                    field: "entity_type".to_string(),
                    message: format!("'{entity_type}' is too long for an audit entry"),
                }
            })?,
            entity_id,
            before,
            after,
            ip: None,
            user_agent: None,
            remarks: remarks
                .map(|r| HeaplessString::try_from(r.as_str()))
                .transpose()
                .map_err(|_| loancore_api::LoanCoreError::ValidationError {
                    field: "remarks".to_string(),
                    message: "remarks too long".to_string(),
                })?,
            created_at: Utc::now(),
        };
        let created = session.audit().create(&model).await?;
        Ok(audit_mapper::to_domain(&created))
    }
}

#[async_trait]
impl<U: UnitOfWork<Postgres> + Send + Sync> AuditService for AuditServiceImpl<U> {
    async fn record(
        &self,
        actor_user_id: Uuid,
        action: AuditAction,
        entity_type: &str,
        entity_id: Uuid,
        before: Option<Value>,
        after: Option<Value>,
        remarks: Option<String>,
    ) -> LoanCoreResult<AuditEntry> {
        let session = self.uow.begin().await?;
        let entry = Self::record_in(
            &session,
            actor_user_id,
            action,
            entity_type,
            entity_id,
            before,
            after,
            remarks,
        )
        .await?;
        session.commit().await?;
        Ok(entry)
    }

    async fn find_by_entity(&self, entity_type: &str, entity_id: Uuid) -> LoanCoreResult<Vec<AuditEntry>> {
        let session = self.uow.begin().await?;
        let entries = session.audit().find_by_entity(entity_type, entity_id).await?;
        session.rollback().await?;
        Ok(entries.iter().map(audit_mapper::to_domain).collect())
    }
}
