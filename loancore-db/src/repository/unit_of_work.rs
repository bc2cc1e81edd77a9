use async_trait::async_trait;
use loancore_api::LoanCoreResult;
use sqlx::Database;

use crate::repository::{
    AgentAssignmentRepository, AuditRepository, CapitalLedgerRepository, CollectionRepository,
    CustomerRepository, LoanRepository, ScheduleRepository, UserRepository,
};

/// Owns the pool and hands out a fresh `Session` per request/job tick. One
/// `begin()` call corresponds to one database transaction.
#[async_trait]
pub trait UnitOfWork<DB: Database>: Send + Sync {
    type Session: UnitOfWorkSession<DB>;
    async fn begin(&self) -> LoanCoreResult<Self::Session>;
}

/// Bundles one repository instance per entity, all sharing the session's
/// open transaction. `commit`/`rollback` consume the session so it cannot
/// be reused afterward.
#[async_trait]
pub trait UnitOfWorkSession<DB: Database>: Send + Sync {
    type LoanRepo: LoanRepository<DB> + Send + Sync;
    type ScheduleRepo: ScheduleRepository<DB> + Send + Sync;
    type CollectionRepo: CollectionRepository<DB> + Send + Sync;
    type UserRepo: UserRepository<DB> + Send + Sync;
    type CustomerRepo: CustomerRepository<DB> + Send + Sync;
    type AgentAssignmentRepo: AgentAssignmentRepository<DB> + Send + Sync;
    type AuditRepo: AuditRepository<DB> + Send + Sync;
    type CapitalLedgerRepo: CapitalLedgerRepository<DB> + Send + Sync;

    fn loans(&self) -> &Self::LoanRepo;
    fn schedules(&self) -> &Self::ScheduleRepo;
    fn collections(&self) -> &Self::CollectionRepo;
    fn users(&self) -> &Self::UserRepo;
    fn customers(&self) -> &Self::CustomerRepo;
    fn agent_assignments(&self) -> &Self::AgentAssignmentRepo;
    fn audit(&self) -> &Self::AuditRepo;
    fn capital_ledger(&self) -> &Self::CapitalLedgerRepo;

    async fn commit(self) -> LoanCoreResult<()>;
    async fn rollback(self) -> LoanCoreResult<()>;
}
