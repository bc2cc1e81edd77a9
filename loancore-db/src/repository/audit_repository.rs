use async_trait::async_trait;
use sqlx::Database;
use uuid::Uuid;

use crate::models::audit::AuditEntryModel;

#[async_trait]
pub trait AuditRepository<DB: Database>: Send + Sync {
    async fn create(&self, entry: &AuditEntryModel) -> Result<AuditEntryModel, sqlx::Error>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<AuditEntryModel>, sqlx::Error>;
    async fn find_by_entity(
        &self,
        entity_type: &str,
        entity_id: Uuid,
    ) -> Result<Vec<AuditEntryModel>, sqlx::Error>;
}
