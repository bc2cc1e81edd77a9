use chrono::{DateTime, Utc};
use loancore_api::{ManagerPermissions, Role, User};
use serde::Serialize;
use uuid::Uuid;

/// `User` minus `password_hash` — the shape every endpoint that echoes a
/// user back to its caller actually returns.
#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub is_active: bool,
    pub manager_permissions: Option<ManagerPermissions>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        UserView {
            id: user.id,
            email: user.email.to_string(),
            full_name: user.full_name.to_string(),
            role: user.role,
            is_active: user.is_active,
            manager_permissions: user.manager_permissions,
            created_at: user.created_at,
        }
    }
}
