use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    AgentAssignment, AssignAgentRequest, Customer, CreateCustomerRequest, CreateUserRequest, User,
};
use crate::error::LoanCoreResult;

/// Identity and access administration: user/customer CRUD and
/// agent-assignment bookkeeping. Kept separate from `AuthorizationService`
/// (which only answers yes/no questions over already-fetched rows) because
/// this trait owns the writes.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Admin-only. Hashes `request.password` before it ever reaches a
    /// repository.
    async fn create_user(&self, actor_id: Uuid, request: CreateUserRequest) -> LoanCoreResult<User>;

    /// Verifies `email`/`password` against the stored hash and the
    /// `is_active` flag. Returns the matched `User` on success; every
    /// failure path (no such email, wrong password, inactive account)
    /// collapses to the same `LoanCoreError::NotAuthorized` so a caller
    /// cannot distinguish "wrong password" from "no such user".
    async fn authenticate(&self, email: &str, password: &str) -> LoanCoreResult<User>;

    async fn get_user(&self, user_id: Uuid) -> LoanCoreResult<User>;

    async fn deactivate_user(&self, actor_id: Uuid, user_id: Uuid) -> LoanCoreResult<()>;

    /// Creates the backing `User` (role forced to `Customer`) and the KYC
    /// row in one transaction.
    async fn create_customer(&self, actor_id: Uuid, request: CreateCustomerRequest) -> LoanCoreResult<Customer>;

    async fn get_customer(&self, actor_id: Uuid, customer_id: Uuid) -> LoanCoreResult<Customer>;

    async fn list_customers(&self, actor_id: Uuid) -> LoanCoreResult<Vec<Customer>>;

    /// Gated by `AuthorizationService::may_delete_customer`.
    async fn delete_customer(&self, actor_id: Uuid, customer_id: Uuid) -> LoanCoreResult<()>;

    /// Deactivates the customer's current active assignment (if any) and
    /// inserts a new active one.
    async fn assign_agent(&self, actor_id: Uuid, request: AssignAgentRequest) -> LoanCoreResult<AgentAssignment>;
}
