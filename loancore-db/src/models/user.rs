use chrono::{DateTime, Utc};
use heapless::String as HeaplessString;
use loancore_api::Role;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Storage shape of `User`. `ManagerPermissions` is flattened onto the row
/// as three nullable-by-role booleans rather than a nested column; a row
/// with `role != Manager` carries them as `false`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct UserModel {
    pub id: Uuid,
    pub email: HeaplessString<255>,
    pub full_name: HeaplessString<255>,
    pub role: Role,
    pub is_active: bool,
    pub password_hash: HeaplessString<255>,
    pub may_delete_collections: bool,
    pub may_delete_customers: bool,
    pub may_delete_users: bool,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

/// Storage shape of `AgentAssignment`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct AgentAssignmentModel {
    pub id: Uuid,
    pub agent_user_id: Uuid,
    pub customer_id: Uuid,
    pub is_active: bool,
    pub assigned_at: DateTime<Utc>,
    pub unassigned_at: Option<DateTime<Utc>>,
}
