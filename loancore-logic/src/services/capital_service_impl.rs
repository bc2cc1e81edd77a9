use async_trait::async_trait;
use chrono::Utc;
use heapless::String as HeaplessString;
use loancore_api::{
    Borrowing, CapitalLedgerStatus, CapitalPosition, CapitalService, CreateBorrowingRequest,
    CreateInvestmentRequest, Investment, LoanCoreError, LoanCoreResult, Role,
};
use loancore_db::{BorrowingModel, CapitalLedgerRepository, InvestmentModel, UnitOfWork, UnitOfWorkSession};
use sqlx::Postgres;
use std::sync::Arc;
use uuid::Uuid;

use crate::mappers::capital_mapper;

/// Investment/borrowing ledgers. These entries carry no loan invariant of
/// their own; `position` just sums what the repository already totals.
pub struct CapitalServiceImpl<U: UnitOfWork<Postgres>> {
    uow: Arc<U>,
}

impl<U: UnitOfWork<Postgres>> CapitalServiceImpl<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn require_manager_or_admin<S: UnitOfWorkSession<Postgres>>(
        session: &S,
        actor_id: Uuid,
    ) -> LoanCoreResult<()> {
        let actor = session
            .users()
            .find_by_id(actor_id)
            .await?
            .ok_or(LoanCoreError::UserNotFound(actor_id))?;
        if !matches!(actor.role, Role::Admin | Role::Manager) {
            return Err(LoanCoreError::NotAuthorized(
                "admin or manager role required for capital ledger access".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl<U: UnitOfWork<Postgres> + Send + Sync> CapitalService for CapitalServiceImpl<U> {
    async fn create_investment(&self, actor_id: Uuid, request: CreateInvestmentRequest) -> LoanCoreResult<Investment> {
        let session = self.uow.begin().await?;
        if let Err(e) = Self::require_manager_or_admin(&session, actor_id).await {
            session.rollback().await?;
            return Err(e);
        }

        let source = HeaplessString::try_from(request.source.as_str()).map_err(|_| LoanCoreError::ValidationError {
            field: "source".to_string(),
            message: "'source' is too long".to_string(),
        });
        let source = match source {
            Ok(s) => s,
            Err(e) => {
                session.rollback().await?;
                return Err(e);
            }
        };

        let model = InvestmentModel {
            id: Uuid::new_v4(),
            amount: request.amount,
            source,
            start_date: request.start_date,
            end_date: request.end_date,
            status: CapitalLedgerStatus::Active,
            created_at: Utc::now(),
        };
        let created = session.capital_ledger().create_investment(&model).await?;
        session.commit().await?;
        Ok(capital_mapper::investment_to_domain(&created))
    }

    async fn list_investments(&self, actor_id: Uuid) -> LoanCoreResult<Vec<Investment>> {
        let session = self.uow.begin().await?;
        if let Err(e) = Self::require_manager_or_admin(&session, actor_id).await {
            session.rollback().await?;
            return Err(e);
        }
        let investments = session.capital_ledger().list_investments().await?;
        session.rollback().await?;
        Ok(investments.iter().map(capital_mapper::investment_to_domain).collect())
    }

    async fn create_borrowing(&self, actor_id: Uuid, request: CreateBorrowingRequest) -> LoanCoreResult<Borrowing> {
        let session = self.uow.begin().await?;
        if let Err(e) = Self::require_manager_or_admin(&session, actor_id).await {
            session.rollback().await?;
            return Err(e);
        }

        let lender = HeaplessString::try_from(request.lender.as_str()).map_err(|_| LoanCoreError::ValidationError {
            field: "lender".to_string(),
            message: "'lender' is too long".to_string(),
        });
        let lender = match lender {
            Ok(l) => l,
            Err(e) => {
                session.rollback().await?;
                return Err(e);
            }
        };

        let model = BorrowingModel {
            id: Uuid::new_v4(),
            amount: request.amount,
            lender,
            start_date: request.start_date,
            end_date: request.end_date,
            status: CapitalLedgerStatus::Active,
            created_at: Utc::now(),
        };
        let created = session.capital_ledger().create_borrowing(&model).await?;
        session.commit().await?;
        Ok(capital_mapper::borrowing_to_domain(&created))
    }

    async fn list_borrowings(&self, actor_id: Uuid) -> LoanCoreResult<Vec<Borrowing>> {
        let session = self.uow.begin().await?;
        if let Err(e) = Self::require_manager_or_admin(&session, actor_id).await {
            session.rollback().await?;
            return Err(e);
        }
        let borrowings = session.capital_ledger().list_borrowings().await?;
        session.rollback().await?;
        Ok(borrowings.iter().map(capital_mapper::borrowing_to_domain).collect())
    }

    async fn position(&self, actor_id: Uuid) -> LoanCoreResult<CapitalPosition> {
        let session = self.uow.begin().await?;
        if let Err(e) = Self::require_manager_or_admin(&session, actor_id).await {
            session.rollback().await?;
            return Err(e);
        }
        let total_active_investment = session.capital_ledger().total_active_investment().await?;
        let total_active_borrowing = session.capital_ledger().total_active_borrowing().await?;
        session.rollback().await?;
        Ok(CapitalPosition {
            total_active_investment,
            total_active_borrowing,
        })
    }
}
