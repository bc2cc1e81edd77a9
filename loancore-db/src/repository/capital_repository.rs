use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::Database;

use crate::models::capital::{BorrowingModel, InvestmentModel};

#[async_trait]
pub trait CapitalLedgerRepository<DB: Database>: Send + Sync {
    async fn create_investment(&self, investment: &InvestmentModel) -> Result<InvestmentModel, sqlx::Error>;
    async fn list_investments(&self) -> Result<Vec<InvestmentModel>, sqlx::Error>;

    async fn create_borrowing(&self, borrowing: &BorrowingModel) -> Result<BorrowingModel, sqlx::Error>;
    async fn list_borrowings(&self) -> Result<Vec<BorrowingModel>, sqlx::Error>;

    async fn total_active_investment(&self) -> Result<Decimal, sqlx::Error>;
    async fn total_active_borrowing(&self) -> Result<Decimal, sqlx::Error>;
}
