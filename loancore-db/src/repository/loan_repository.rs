use async_trait::async_trait;
use sqlx::Database;
use uuid::Uuid;

use crate::models::loan::{LoanChargeModel, LoanModel};

#[async_trait]
pub trait LoanRepository<DB: Database>: Send + Sync {
    async fn create(&self, loan: &LoanModel) -> Result<LoanModel, sqlx::Error>;
    async fn update(&self, loan: &LoanModel) -> Result<LoanModel, sqlx::Error>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<LoanModel>, sqlx::Error>;

    /// Row-locking read used by the collection and lifecycle services to
    /// serialize concurrent writers on the same loan within a transaction.
    async fn find_by_id_for_update(&self, id: Uuid) -> Result<Option<LoanModel>, sqlx::Error>;

    async fn find_by_loan_number(&self, loan_number: i64) -> Result<Option<LoanModel>, sqlx::Error>;

    async fn list_for_customer(
        &self,
        customer_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<LoanModel>, sqlx::Error>;

    async fn count_for_customer(&self, customer_id: Uuid) -> Result<i64, sqlx::Error>;

    async fn next_loan_number(&self) -> Result<i64, sqlx::Error>;

    async fn create_charges(&self, charges: &[LoanChargeModel]) -> Result<(), sqlx::Error>;
    async fn find_charges_for_loan(&self, loan_id: Uuid) -> Result<Vec<LoanChargeModel>, sqlx::Error>;
}
