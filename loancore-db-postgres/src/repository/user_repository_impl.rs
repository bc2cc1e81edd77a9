use async_trait::async_trait;
use loancore_api::{KycStatus, Role};
use loancore_db::{AgentAssignmentModel, AgentAssignmentRepository, CustomerModel, CustomerRepository};
use loancore_db::{UserModel, UserRepository};
use sqlx::postgres::PgRow;
use sqlx::{Postgres, Row};
use std::str::FromStr;
use uuid::Uuid;

use crate::repository::executor::PgExecutor;
use crate::utils::get_heapless_string;

fn row_to_user(row: &PgRow) -> Result<UserModel, sqlx::Error> {
    let role: String = row.try_get("role")?;
    Ok(UserModel {
        id: row.try_get("id")?,
        email: get_heapless_string(row, "email").map_err(sqlx::Error::Decode)?,
        full_name: get_heapless_string(row, "full_name").map_err(sqlx::Error::Decode)?,
        role: Role::from_str(&role).map_err(|e| sqlx::Error::Decode(e.into()))?,
        is_active: row.try_get("is_active")?,
        password_hash: get_heapless_string(row, "password_hash").map_err(sqlx::Error::Decode)?,
        may_delete_collections: row.try_get("may_delete_collections")?,
        may_delete_customers: row.try_get("may_delete_customers")?,
        may_delete_users: row.try_get("may_delete_users")?,
        created_at: row.try_get("created_at")?,
        last_updated_at: row.try_get("last_updated_at")?,
    })
}

fn row_to_customer(row: &PgRow) -> Result<CustomerModel, sqlx::Error> {
    let kyc_status: String = row.try_get("kyc_status")?;
    Ok(CustomerModel {
        user_id: row.try_get("user_id")?,
        kyc_status: KycStatus::from_str(&kyc_status).map_err(|e| sqlx::Error::Decode(e.into()))?,
        date_of_birth: row.try_get("date_of_birth")?,
        id_proof: get_heapless_string(row, "id_proof").map_err(sqlx::Error::Decode)?,
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_assignment(row: &PgRow) -> Result<AgentAssignmentModel, sqlx::Error> {
    Ok(AgentAssignmentModel {
        id: row.try_get("id")?,
        agent_user_id: row.try_get("agent_user_id")?,
        customer_id: row.try_get("customer_id")?,
        is_active: row.try_get("is_active")?,
        assigned_at: row.try_get("assigned_at")?,
        unassigned_at: row.try_get("unassigned_at")?,
    })
}

pub struct PostgresUserRepository {
    executor: PgExecutor,
}

impl PostgresUserRepository {
    pub(crate) fn new(executor: PgExecutor) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl UserRepository<Postgres> for PostgresUserRepository {
    async fn create(&self, user: &UserModel) -> Result<UserModel, sqlx::Error> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        let row = sqlx::query(
            r#"
            INSERT INTO users (
                id, email, full_name, role, is_active, password_hash,
                may_delete_collections, may_delete_customers, may_delete_users,
                created_at, last_updated_at
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11)
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(user.email.as_str())
        .bind(user.full_name.as_str())
        .bind(user.role.to_string())
        .bind(user.is_active)
        .bind(user.password_hash.as_str())
        .bind(user.may_delete_collections)
        .bind(user.may_delete_customers)
        .bind(user.may_delete_users)
        .bind(user.created_at)
        .bind(user.last_updated_at)
        .fetch_one(&mut **conn)
        .await?;
        row_to_user(&row)
    }

    async fn update(&self, user: &UserModel) -> Result<UserModel, sqlx::Error> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        let row = sqlx::query(
            r#"
            UPDATE users SET
                full_name = $2, is_active = $3, password_hash = $4,
                may_delete_collections = $5, may_delete_customers = $6, may_delete_users = $7,
                last_updated_at = $8
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(user.full_name.as_str())
        .bind(user.is_active)
        .bind(user.password_hash.as_str())
        .bind(user.may_delete_collections)
        .bind(user.may_delete_customers)
        .bind(user.may_delete_users)
        .bind(user.last_updated_at)
        .fetch_one(&mut **conn)
        .await?;
        row_to_user(&row)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserModel>, sqlx::Error> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        let row = sqlx::query("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut **conn)
            .await?;
        row.as_ref().map(row_to_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, sqlx::Error> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        let row = sqlx::query("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&mut **conn)
            .await?;
        row.as_ref().map(row_to_user).transpose()
    }

    async fn deactivate(&self, id: Uuid) -> Result<(), sqlx::Error> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        sqlx::query("UPDATE users SET is_active = false WHERE id = $1")
            .bind(id)
            .execute(&mut **conn)
            .await?;
        Ok(())
    }
}

pub struct PostgresCustomerRepository {
    executor: PgExecutor,
}

impl PostgresCustomerRepository {
    pub(crate) fn new(executor: PgExecutor) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl CustomerRepository<Postgres> for PostgresCustomerRepository {
    async fn create(&self, customer: &CustomerModel) -> Result<CustomerModel, sqlx::Error> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        let row = sqlx::query(
            r#"
            INSERT INTO customers (user_id, kyc_status, date_of_birth, id_proof, created_at)
            VALUES ($1,$2,$3,$4,$5)
            RETURNING *
            "#,
        )
        .bind(customer.user_id)
        .bind(customer.kyc_status.to_string())
        .bind(customer.date_of_birth)
        .bind(customer.id_proof.as_str())
        .bind(customer.created_at)
        .fetch_one(&mut **conn)
        .await?;
        row_to_customer(&row)
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<CustomerModel>, sqlx::Error> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        let row = sqlx::query("SELECT * FROM customers WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&mut **conn)
            .await?;
        row.as_ref().map(row_to_customer).transpose()
    }

    async fn update_kyc_status(&self, user_id: Uuid, status: &str) -> Result<(), sqlx::Error> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        sqlx::query("UPDATE customers SET kyc_status = $2 WHERE user_id = $1")
            .bind(user_id)
            .bind(status)
            .execute(&mut **conn)
            .await?;
        Ok(())
    }

    async fn delete(&self, user_id: Uuid) -> Result<(), sqlx::Error> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        sqlx::query("DELETE FROM customers WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut **conn)
            .await?;
        Ok(())
    }

    async fn list_all(&self, limit: i64, offset: i64) -> Result<Vec<CustomerModel>, sqlx::Error> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        let rows = sqlx::query("SELECT * FROM customers ORDER BY created_at DESC LIMIT $1 OFFSET $2")
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut **conn)
            .await?;
        rows.iter().map(row_to_customer).collect()
    }
}

pub struct PostgresAgentAssignmentRepository {
    executor: PgExecutor,
}

impl PostgresAgentAssignmentRepository {
    pub(crate) fn new(executor: PgExecutor) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl AgentAssignmentRepository<Postgres> for PostgresAgentAssignmentRepository {
    async fn create(
        &self,
        assignment: &AgentAssignmentModel,
    ) -> Result<AgentAssignmentModel, sqlx::Error> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        let row = sqlx::query(
            r#"
            INSERT INTO agent_assignments (id, agent_user_id, customer_id, is_active, assigned_at, unassigned_at)
            VALUES ($1,$2,$3,$4,$5,$6)
            RETURNING *
            "#,
        )
        .bind(assignment.id)
        .bind(assignment.agent_user_id)
        .bind(assignment.customer_id)
        .bind(assignment.is_active)
        .bind(assignment.assigned_at)
        .bind(assignment.unassigned_at)
        .fetch_one(&mut **conn)
        .await?;
        row_to_assignment(&row)
    }

    async fn find_active_for_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Option<AgentAssignmentModel>, sqlx::Error> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        let row = sqlx::query(
            "SELECT * FROM agent_assignments WHERE customer_id = $1 AND is_active = true",
        )
        .bind(customer_id)
        .fetch_optional(&mut **conn)
        .await?;
        row.as_ref().map(row_to_assignment).transpose()
    }

    async fn list_active_for_agent(
        &self,
        agent_user_id: Uuid,
    ) -> Result<Vec<AgentAssignmentModel>, sqlx::Error> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        let rows = sqlx::query(
            "SELECT * FROM agent_assignments WHERE agent_user_id = $1 AND is_active = true",
        )
        .bind(agent_user_id)
        .fetch_all(&mut **conn)
        .await?;
        rows.iter().map(row_to_assignment).collect()
    }

    async fn deactivate_for_customer(&self, customer_id: Uuid) -> Result<(), sqlx::Error> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        sqlx::query(
            "UPDATE agent_assignments SET is_active = false, unassigned_at = now() WHERE customer_id = $1 AND is_active = true",
        )
        .bind(customer_id)
        .execute(&mut **conn)
        .await?;
        Ok(())
    }
}
