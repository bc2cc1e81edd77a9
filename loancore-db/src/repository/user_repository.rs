use async_trait::async_trait;
use sqlx::Database;
use uuid::Uuid;

use crate::models::customer::CustomerModel;
use crate::models::user::{AgentAssignmentModel, UserModel};

#[async_trait]
pub trait UserRepository<DB: Database>: Send + Sync {
    async fn create(&self, user: &UserModel) -> Result<UserModel, sqlx::Error>;
    async fn update(&self, user: &UserModel) -> Result<UserModel, sqlx::Error>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserModel>, sqlx::Error>;
    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, sqlx::Error>;
    async fn deactivate(&self, id: Uuid) -> Result<(), sqlx::Error>;
}

#[async_trait]
pub trait CustomerRepository<DB: Database>: Send + Sync {
    async fn create(&self, customer: &CustomerModel) -> Result<CustomerModel, sqlx::Error>;
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<CustomerModel>, sqlx::Error>;
    async fn update_kyc_status(&self, user_id: Uuid, status: &str) -> Result<(), sqlx::Error>;
    async fn delete(&self, user_id: Uuid) -> Result<(), sqlx::Error>;
    async fn list_all(&self, limit: i64, offset: i64) -> Result<Vec<CustomerModel>, sqlx::Error>;
}

#[async_trait]
pub trait AgentAssignmentRepository<DB: Database>: Send + Sync {
    async fn create(
        &self,
        assignment: &AgentAssignmentModel,
    ) -> Result<AgentAssignmentModel, sqlx::Error>;

    async fn find_active_for_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Option<AgentAssignmentModel>, sqlx::Error>;

    async fn list_active_for_agent(
        &self,
        agent_user_id: Uuid,
    ) -> Result<Vec<AgentAssignmentModel>, sqlx::Error>;

    /// Sets `is_active = false, unassigned_at = now()` on the customer's
    /// current active assignment, if any.
    async fn deactivate_for_customer(&self, customer_id: Uuid) -> Result<(), sqlx::Error>;
}
