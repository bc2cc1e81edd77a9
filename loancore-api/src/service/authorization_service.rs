use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{AgentAssignment, Role};
use crate::error::LoanCoreResult;

/// Pure access-control checks. Implementations take
/// already-fetched rows and make no repository calls of their own beyond
/// what the caller hands them — an `AgentAssignment` lookup is the only
/// I/O any implementation needs, and that lookup is the caller's job.
#[async_trait]
pub trait AuthorizationService: Send + Sync {
    /// Admins and managers see every customer. Agents see only customers
    /// with an active assignment to them. Customers see only themselves.
    fn may_access_customer(
        &self,
        actor_id: Uuid,
        actor_role: Role,
        customer_id: Uuid,
        assignment: Option<&AgentAssignment>,
    ) -> bool;

    /// Delegates to `may_access_customer` against the loan's owning
    /// customer.
    fn may_access_loan(
        &self,
        actor_id: Uuid,
        actor_role: Role,
        loan_customer_id: Uuid,
        assignment: Option<&AgentAssignment>,
    ) -> bool;

    /// Only managers with the matching `ManagerPermissions` flag (or
    /// admins) may perform the named destructive action.
    fn may_delete_collection(&self, actor_role: Role, may_delete_collections: bool) -> bool;

    fn may_delete_customer(&self, actor_role: Role, may_delete_customers: bool) -> bool;

    fn may_delete_user(&self, actor_role: Role, may_delete_users: bool) -> bool;

    /// Looks up the active assignment for `customer_id`, if any. The only
    /// async/I-O method on this trait; everything else is pure.
    async fn active_assignment_for(&self, customer_id: Uuid) -> LoanCoreResult<Option<AgentAssignment>>;
}
