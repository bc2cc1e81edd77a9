use async_trait::async_trait;
use chrono::Utc;
use heapless::String as HeaplessString;
use loancore_api::{
    AgentAssignment, AssignAgentRequest, AuditAction, Customer, CreateCustomerRequest, CreateUserRequest,
    KycStatus, LoanCoreError, LoanCoreResult, Role, User, UserService,
};
use loancore_db::{
    AgentAssignmentModel, AgentAssignmentRepository, CustomerModel, CustomerRepository, UnitOfWork,
    UnitOfWorkSession, UserRepository,
};
use sqlx::Postgres;
use std::sync::Arc;
use uuid::Uuid;

use crate::mappers::user_mapper;
use crate::services::audit_service_impl::AuditServiceImpl;
use crate::services::password;

/// Identity/access administration. No cache invalidation here: user and
/// customer rows are not cached view data the way loan summaries are.
pub struct UserServiceImpl<U: UnitOfWork<Postgres>> {
    uow: Arc<U>,
}

impl<U: UnitOfWork<Postgres>> UserServiceImpl<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    fn heapless<const N: usize>(field: &str, value: &str) -> LoanCoreResult<HeaplessString<N>> {
        HeaplessString::try_from(value).map_err(|_| LoanCoreError::ValidationError {
            field: field.to_string(),
            message: format!("'{field}' is too long"),
        })
    }

    async fn actor_role<S: UnitOfWorkSession<Postgres>>(session: &S, actor_id: Uuid) -> LoanCoreResult<Role> {
        let user = session
            .users()
            .find_by_id(actor_id)
            .await?
            .ok_or(LoanCoreError::UserNotFound(actor_id))?;
        Ok(user.role)
    }
}

#[async_trait]
impl<U: UnitOfWork<Postgres> + Send + Sync> UserService for UserServiceImpl<U> {
    async fn create_user(&self, actor_id: Uuid, request: CreateUserRequest) -> LoanCoreResult<User> {
        let session = self.uow.begin().await?;
        let role = Self::actor_role(&session, actor_id).await?;
        if role != Role::Admin {
            session.rollback().await?;
            return Err(LoanCoreError::NotAuthorized(
                "only an administrator may create users".to_string(),
            ));
        }

        let password_hash = match password::hash_password(&request.password) {
            Ok(h) => h,
            Err(e) => {
                session.rollback().await?;
                return Err(e);
            }
        };

        let now = Utc::now();
        let permissions = request.manager_permissions.unwrap_or_default();
        let model = loancore_db::UserModel {
            id: Uuid::new_v4(),
            email: Self::heapless("email", &request.email)?,
            full_name: Self::heapless("full_name", &request.full_name)?,
            role: request.role,
            is_active: true,
            password_hash: Self::heapless("password_hash", &password_hash)?,
            may_delete_collections: permissions.may_delete_collections,
            may_delete_customers: permissions.may_delete_customers,
            may_delete_users: permissions.may_delete_users,
            created_at: now,
            last_updated_at: now,
        };
        let created = session.users().create(&model).await?;
        let user = user_mapper::user_to_domain(&created);

        if let Err(e) = AuditServiceImpl::<U>::record_in(
            &session,
            actor_id,
            AuditAction::UserCreated,
            "user",
            created.id,
            None,
            serde_json::to_value(&user).ok(),
            None,
        )
        .await
        {
            tracing::warn!(user_id = %created.id, error = %e, "audit write failed for user creation");
        }

        session.commit().await?;
        Ok(user)
    }

    async fn authenticate(&self, email: &str, password: &str) -> LoanCoreResult<User> {
        let session = self.uow.begin().await?;
        let found = session.users().find_by_email(email).await?;
        session.rollback().await?;

        let unauthorized = || LoanCoreError::NotAuthorized("invalid email or password".to_string());
        let model = found.ok_or_else(unauthorized)?;
        if !model.is_active {
            return Err(unauthorized());
        }
        if !password::verify_password(password, model.password_hash.as_str()) {
            return Err(unauthorized());
        }
        Ok(user_mapper::user_to_domain(&model))
    }

    async fn get_user(&self, user_id: Uuid) -> LoanCoreResult<User> {
        let session = self.uow.begin().await?;
        let found = session.users().find_by_id(user_id).await?;
        session.rollback().await?;
        found
            .map(|m| user_mapper::user_to_domain(&m))
            .ok_or(LoanCoreError::UserNotFound(user_id))
    }

    async fn deactivate_user(&self, actor_id: Uuid, user_id: Uuid) -> LoanCoreResult<()> {
        let session = self.uow.begin().await?;
        let role = Self::actor_role(&session, actor_id).await?;

        let target = match session.users().find_by_id(user_id).await? {
            Some(u) => u,
            None => {
                session.rollback().await?;
                return Err(LoanCoreError::UserNotFound(user_id));
            }
        };
        let permitted = match role {
            Role::Admin => true,
            Role::Manager => target.may_delete_users,
            _ => false,
        };
        if !permitted {
            session.rollback().await?;
            return Err(LoanCoreError::NotAuthorized(
                "not permitted to deactivate users".to_string(),
            ));
        }

        session.users().deactivate(user_id).await?;

        if let Err(e) = AuditServiceImpl::<U>::record_in(
            &session,
            actor_id,
            AuditAction::UserDeactivated,
            "user",
            user_id,
            None,
            None,
            None,
        )
        .await
        {
            tracing::warn!(user_id = %user_id, error = %e, "audit write failed for user deactivation");
        }

        session.commit().await?;
        Ok(())
    }

    async fn create_customer(&self, actor_id: Uuid, request: CreateCustomerRequest) -> LoanCoreResult<Customer> {
        let session = self.uow.begin().await?;
        let role = Self::actor_role(&session, actor_id).await?;
        if !matches!(role, Role::Admin | Role::Manager) {
            session.rollback().await?;
            return Err(LoanCoreError::NotAuthorized(
                "admin or manager role required to create customers".to_string(),
            ));
        }

        let password_hash = match password::hash_password(&request.password) {
            Ok(h) => h,
            Err(e) => {
                session.rollback().await?;
                return Err(e);
            }
        };

        let now = Utc::now();
        let user_id = Uuid::new_v4();
        let user_model = loancore_db::UserModel {
            id: user_id,
            email: Self::heapless("email", &request.email)?,
            full_name: Self::heapless("full_name", &request.full_name)?,
            role: Role::Customer,
            is_active: true,
            password_hash: Self::heapless("password_hash", &password_hash)?,
            may_delete_collections: false,
            may_delete_customers: false,
            may_delete_users: false,
            created_at: now,
            last_updated_at: now,
        };
        session.users().create(&user_model).await?;

        let customer_model = CustomerModel {
            user_id,
            kyc_status: KycStatus::Pending,
            date_of_birth: request.date_of_birth,
            id_proof: Self::heapless("id_proof", &request.id_proof)?,
            created_at: now,
        };
        let created = session.customers().create(&customer_model).await?;
        let customer = user_mapper::customer_to_domain(&created);

        if let Err(e) = AuditServiceImpl::<U>::record_in(
            &session,
            actor_id,
            AuditAction::CustomerCreated,
            "customer",
            user_id,
            None,
            serde_json::to_value(&customer).ok(),
            None,
        )
        .await
        {
            tracing::warn!(customer_id = %user_id, error = %e, "audit write failed for customer creation");
        }

        session.commit().await?;
        Ok(customer)
    }

    async fn get_customer(&self, actor_id: Uuid, customer_id: Uuid) -> LoanCoreResult<Customer> {
        let session = self.uow.begin().await?;
        let role = Self::actor_role(&session, actor_id).await?;
        if !matches!(role, Role::Admin | Role::Manager) {
            let permitted = match role {
                Role::Agent => session
                    .agent_assignments()
                    .find_active_for_customer(customer_id)
                    .await?
                    .is_some_and(|a| a.is_active && a.agent_user_id == actor_id),
                Role::Customer => actor_id == customer_id,
                Role::Admin | Role::Manager => true,
            };
            if !permitted {
                session.rollback().await?;
                return Err(LoanCoreError::NotAuthorized("no access to this customer".to_string()));
            }
        }
        let found = session.customers().find_by_user_id(customer_id).await?;
        session.rollback().await?;
        found
            .map(|m| user_mapper::customer_to_domain(&m))
            .ok_or(LoanCoreError::CustomerNotFound(customer_id))
    }

    async fn list_customers(&self, actor_id: Uuid) -> LoanCoreResult<Vec<Customer>> {
        let session = self.uow.begin().await?;
        let role = Self::actor_role(&session, actor_id).await?;
        if !matches!(role, Role::Admin | Role::Manager) {
            session.rollback().await?;
            return Err(LoanCoreError::NotAuthorized(
                "admin or manager role required to list all customers".to_string(),
            ));
        }
        let customers = session.customers().list_all(500, 0).await?;
        session.rollback().await?;
        Ok(customers.iter().map(user_mapper::customer_to_domain).collect())
    }

    async fn delete_customer(&self, actor_id: Uuid, customer_id: Uuid) -> LoanCoreResult<()> {
        let session = self.uow.begin().await?;
        let role = Self::actor_role(&session, actor_id).await?;
        let actor = session
            .users()
            .find_by_id(actor_id)
            .await?
            .ok_or(LoanCoreError::UserNotFound(actor_id))?;
        let permitted = matches!(role, Role::Admin) || (matches!(role, Role::Manager) && actor.may_delete_customers);
        if !permitted {
            session.rollback().await?;
            return Err(LoanCoreError::NotAuthorized(
                "not permitted to delete customers".to_string(),
            ));
        }

        session.customers().delete(customer_id).await?;

        if let Err(e) = AuditServiceImpl::<U>::record_in(
            &session,
            actor_id,
            AuditAction::CustomerDeleted,
            "customer",
            customer_id,
            None,
            None,
            None,
        )
        .await
        {
            tracing::warn!(customer_id = %customer_id, error = %e, "audit write failed for customer deletion");
        }

        session.commit().await?;
        Ok(())
    }

    async fn assign_agent(&self, actor_id: Uuid, request: AssignAgentRequest) -> LoanCoreResult<AgentAssignment> {
        let session = self.uow.begin().await?;
        let role = Self::actor_role(&session, actor_id).await?;
        if !matches!(role, Role::Admin | Role::Manager) {
            session.rollback().await?;
            return Err(LoanCoreError::NotAuthorized(
                "admin or manager role required to assign agents".to_string(),
            ));
        }

        session.agent_assignments().deactivate_for_customer(request.customer_id).await?;

        let now = Utc::now();
        let model = AgentAssignmentModel {
            id: Uuid::new_v4(),
            agent_user_id: request.agent_user_id,
            customer_id: request.customer_id,
            is_active: true,
            assigned_at: now,
            unassigned_at: None,
        };
        let created = session.agent_assignments().create(&model).await?;
        session.commit().await?;
        Ok(user_mapper::assignment_to_domain(&created))
    }
}
