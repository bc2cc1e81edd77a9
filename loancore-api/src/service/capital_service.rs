use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Borrowing, CapitalPosition, CreateBorrowingRequest, CreateInvestmentRequest, Investment};
use crate::error::LoanCoreResult;

/// Capital ledger: investments and borrowings. Read by analytics, written
/// by admin/manager-only endpoints; these entries affect no loan
/// invariant and sit outside the money engine's write path.
#[async_trait]
pub trait CapitalService: Send + Sync {
    async fn create_investment(&self, actor_id: Uuid, request: CreateInvestmentRequest) -> LoanCoreResult<Investment>;

    async fn list_investments(&self, actor_id: Uuid) -> LoanCoreResult<Vec<Investment>>;

    async fn create_borrowing(&self, actor_id: Uuid, request: CreateBorrowingRequest) -> LoanCoreResult<Borrowing>;

    async fn list_borrowings(&self, actor_id: Uuid) -> LoanCoreResult<Vec<Borrowing>>;

    async fn position(&self, actor_id: Uuid) -> LoanCoreResult<CapitalPosition>;
}
