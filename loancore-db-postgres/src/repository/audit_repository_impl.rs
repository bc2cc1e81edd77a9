use async_trait::async_trait;
use loancore_api::AuditAction;
use loancore_db::{AuditEntryModel, AuditRepository};
use sqlx::postgres::PgRow;
use sqlx::{Postgres, Row};
use std::str::FromStr;
use uuid::Uuid;

use crate::repository::executor::PgExecutor;
use crate::utils::{get_heapless_string, get_optional_heapless_string};

fn row_to_entry(row: &PgRow) -> Result<AuditEntryModel, sqlx::Error> {
    let action: String = row.try_get("action")?;
    Ok(AuditEntryModel {
        id: row.try_get("id")?,
        actor_user_id: row.try_get("actor_user_id")?,
        action: AuditAction::from_str(&action).map_err(|e| sqlx::Error::Decode(e.into()))?,
        entity_type: get_heapless_string(row, "entity_type").map_err(sqlx::Error::Decode)?,
        entity_id: row.try_get("entity_id")?,
        before: row.try_get("before")?,
        after: row.try_get("after")?,
        ip: get_optional_heapless_string(row, "ip").map_err(sqlx::Error::Decode)?,
        user_agent: get_optional_heapless_string(row, "user_agent").map_err(sqlx::Error::Decode)?,
        remarks: get_optional_heapless_string(row, "remarks").map_err(sqlx::Error::Decode)?,
        created_at: row.try_get("created_at")?,
    })
}

/// Entries are written inside the same transaction as the business change
/// they describe, and never updated or deleted afterward.
pub struct PostgresAuditRepository {
    executor: PgExecutor,
}

impl PostgresAuditRepository {
    pub(crate) fn new(executor: PgExecutor) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl AuditRepository<Postgres> for PostgresAuditRepository {
    async fn create(&self, entry: &AuditEntryModel) -> Result<AuditEntryModel, sqlx::Error> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        let ip: Option<&str> = entry.ip.as_deref();
        let user_agent: Option<&str> = entry.user_agent.as_deref();
        let remarks: Option<&str> = entry.remarks.as_deref();
        let row = sqlx::query(
            r#"
            INSERT INTO audit_entries (
                id, actor_user_id, action, entity_type, entity_id,
                before, after, ip, user_agent, remarks, created_at
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11)
            RETURNING *
            "#,
        )
        .bind(entry.id)
        .bind(entry.actor_user_id)
        .bind(entry.action.to_string())
        .bind(entry.entity_type.as_str())
        .bind(entry.entity_id)
        .bind(&entry.before)
        .bind(&entry.after)
        .bind(ip)
        .bind(user_agent)
        .bind(remarks)
        .bind(entry.created_at)
        .fetch_one(&mut **conn)
        .await?;
        row_to_entry(&row)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<AuditEntryModel>, sqlx::Error> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        let row = sqlx::query("SELECT * FROM audit_entries WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut **conn)
            .await?;
        row.as_ref().map(row_to_entry).transpose()
    }

    async fn find_by_entity(
        &self,
        entity_type: &str,
        entity_id: Uuid,
    ) -> Result<Vec<AuditEntryModel>, sqlx::Error> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        let rows = sqlx::query(
            "SELECT * FROM audit_entries WHERE entity_type = $1 AND entity_id = $2 ORDER BY created_at DESC",
        )
        .bind(entity_type)
        .bind(entity_id)
        .fetch_all(&mut **conn)
        .await?;
        rows.iter().map(row_to_entry).collect()
    }
}
