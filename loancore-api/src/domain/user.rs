use chrono::{DateTime, NaiveDate, Utc};
use heapless::String as HeaplessString;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Identity + role for every actor class the core serves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: HeaplessString<255>,
    pub full_name: HeaplessString<255>,
    pub role: Role,
    pub is_active: bool,
    pub password_hash: HeaplessString<255>,
    /// Only meaningful when `role == Manager`.
    pub manager_permissions: Option<ManagerPermissions>,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Manager,
    Agent,
    Customer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "Admin"),
            Role::Manager => write!(f, "Manager"),
            Role::Agent => write!(f, "Agent"),
            Role::Customer => write!(f, "Customer"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Admin" => Ok(Role::Admin),
            "Manager" => Ok(Role::Manager),
            "Agent" => Ok(Role::Agent),
            "Customer" => Ok(Role::Customer),
            other => Err(format!("'{other}' is not a valid Role")),
        }
    }
}

/// Per-manager destructive-action gates.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ManagerPermissions {
    pub may_delete_collections: bool,
    pub may_delete_customers: bool,
    pub may_delete_users: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KycStatus {
    Pending,
    Verified,
    Rejected,
}

impl fmt::Display for KycStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KycStatus::Pending => write!(f, "Pending"),
            KycStatus::Verified => write!(f, "Verified"),
            KycStatus::Rejected => write!(f, "Rejected"),
        }
    }
}

impl FromStr for KycStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(KycStatus::Pending),
            "Verified" => Ok(KycStatus::Verified),
            "Rejected" => Ok(KycStatus::Rejected),
            other => Err(format!("'{other}' is not a valid KycStatus")),
        }
    }
}

/// A user with `role == Customer` plus KYC fields; 1-to-1 with `User`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub user_id: Uuid,
    pub kyc_status: KycStatus,
    pub date_of_birth: NaiveDate,
    pub id_proof: HeaplessString<100>,
    pub created_at: DateTime<Utc>,
}

/// Many-to-many agent/customer assignment history. At any instant a
/// customer has zero or one *active* assignment; an agent's
/// loan access is derived from this table by `AuthorizationService`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentAssignment {
    pub id: Uuid,
    pub agent_user_id: Uuid,
    pub customer_id: Uuid,
    pub is_active: bool,
    pub assigned_at: DateTime<Utc>,
    pub unassigned_at: Option<DateTime<Utc>>,
}

/// `POST /auth/login` request body. Credentials only; the caller never
/// sends a role, it is read back off the stored `User` row.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Administrator-only user creation. `password` arrives as plaintext over
/// TLS and is hashed before it ever reaches a repository.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 255))]
    pub full_name: String,
    pub role: Role,
    #[validate(length(min = 8))]
    pub password: String,
    pub manager_permissions: Option<ManagerPermissions>,
}

/// `POST /customers` request body: creates the backing `User` (role is
/// forced to `Customer`) plus the KYC row in one call.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCustomerRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 255))]
    pub full_name: String,
    #[validate(length(min = 8))]
    pub password: String,
    pub date_of_birth: NaiveDate,
    #[validate(length(min = 1, max = 100))]
    pub id_proof: String,
}

/// Assigns an agent to a customer, deactivating whatever assignment the
/// customer previously held (a customer has at most one active agent).
#[derive(Debug, Clone, Deserialize)]
pub struct AssignAgentRequest {
    pub agent_user_id: Uuid,
    pub customer_id: Uuid,
}
