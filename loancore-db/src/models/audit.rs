use chrono::{DateTime, Utc};
use heapless::String as HeaplessString;
use loancore_api::AuditAction;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Storage shape of `AuditEntry`. Append-only; `before`/`after` are stored
/// as `jsonb`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct AuditEntryModel {
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
