use async_trait::async_trait;
use loancore_api::{AgentAssignment, AuthorizationService, LoanCoreResult, Role};
use loancore_db::{AgentAssignmentRepository, UnitOfWork, UnitOfWorkSession};
use sqlx::Postgres;
use std::sync::Arc;
use uuid::Uuid;

use crate::mappers::user_mapper;

/// Pure access-control checks over already-fetched rows, plus the one
/// lookup (`active_assignment_for`) callers need before they can run those
/// checks at all. Every mutating service holds one of these and consults it
/// before touching the loan/customer it was handed.
pub struct AuthorizationServiceImpl<U: UnitOfWork<Postgres>> {
    uow: Arc<U>,
}

impl<U: UnitOfWork<Postgres>> AuthorizationServiceImpl<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork<Postgres> + Send + Sync> AuthorizationService for AuthorizationServiceImpl<U> {
    fn may_access_customer(
        &self,
        actor_id: Uuid,
        actor_role: Role,
        customer_id: Uuid,
        assignment: Option<&AgentAssignment>,
    ) -> bool {
        match actor_role {
            Role::Admin | Role::Manager => true,
            Role::Agent => assignment.is_some_and(|a| a.is_active && a.agent_user_id == actor_id),
            Role::Customer => actor_id == customer_id,
        }
    }

    fn may_access_loan(
        &self,
        actor_id: Uuid,
        actor_role: Role,
        loan_customer_id: Uuid,
        assignment: Option<&AgentAssignment>,
    ) -> bool {
        self.may_access_customer(actor_id, actor_role, loan_customer_id, assignment)
    }

    fn may_delete_collection(&self, actor_role: Role, may_delete_collections: bool) -> bool {
        matches!(actor_role, Role::Admin) || (matches!(actor_role, Role::Manager) && may_delete_collections)
    }

    fn may_delete_customer(&self, actor_role: Role, may_delete_customers: bool) -> bool {
        matches!(actor_role, Role::Admin) || (matches!(actor_role, Role::Manager) && may_delete_customers)
    }

    fn may_delete_user(&self, actor_role: Role, may_delete_users: bool) -> bool {
        matches!(actor_role, Role::Admin) || (matches!(actor_role, Role::Manager) && may_delete_users)
    }

    async fn active_assignment_for(&self, customer_id: Uuid) -> LoanCoreResult<Option<AgentAssignment>> {
        let session = self.uow.begin().await?;
        let found = session.agent_assignments().find_active_for_customer(customer_id).await?;
        session.rollback().await?;
        Ok(found.as_ref().map(user_mapper::assignment_to_domain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loancore_api::AgentAssignment;
    use chrono::Utc;

    fn assignment(agent: Uuid, active: bool) -> AgentAssignment {
        AgentAssignment {
            id: Uuid::new_v4(),
            agent_user_id: agent,
            customer_id: Uuid::new_v4(),
            is_active: active,
            assigned_at: Utc::now(),
            unassigned_at: None,
        }
    }

    // Exercises the pure decision table directly; no `U` is ever
    // constructed because these methods touch no repository.
    struct NoopChecks;

    impl NoopChecks {
        fn may_access_customer(
            actor_id: Uuid,
            actor_role: Role,
            customer_id: Uuid,
            assignment: Option<&AgentAssignment>,
        ) -> bool {
            match actor_role {
                Role::Admin | Role::Manager => true,
                Role::Agent => assignment.is_some_and(|a| a.is_active && a.agent_user_id == actor_id),
                Role::Customer => actor_id == customer_id,
            }
        }
    }

    #[test]
    fn admin_and_manager_access_everything() {
        let customer_id = Uuid::new_v4();
        assert!(NoopChecks::may_access_customer(Uuid::new_v4(), Role::Admin, customer_id, None));
        assert!(NoopChecks::may_access_customer(Uuid::new_v4(), Role::Manager, customer_id, None));
    }

    #[test]
    fn agent_needs_an_active_assignment_to_themself() {
        let agent_id = Uuid::new_v4();
        let customer_id = Uuid::new_v4();
        assert!(!NoopChecks::may_access_customer(agent_id, Role::Agent, customer_id, None));
        assert!(NoopChecks::may_access_customer(
            agent_id,
            Role::Agent,
            customer_id,
            Some(&assignment(agent_id, true))
        ));
        assert!(!NoopChecks::may_access_customer(
            agent_id,
            Role::Agent,
            customer_id,
            Some(&assignment(agent_id, false))
        ));
    }

    #[test]
    fn customer_only_accesses_themself() {
        let customer_id = Uuid::new_v4();
        assert!(NoopChecks::may_access_customer(customer_id, Role::Customer, customer_id, None));
        assert!(!NoopChecks::may_access_customer(Uuid::new_v4(), Role::Customer, customer_id, None));
    }
}
