use async_trait::async_trait;
use loancore_api::LoanCoreResult;
use loancore_db::UnitOfWork;
use loancore_db::UnitOfWorkSession;
use sqlx::{PgPool, Postgres};

use crate::repository::audit_repository_impl::PostgresAuditRepository;
use crate::repository::capital_repository_impl::PostgresCapitalLedgerRepository;
use crate::repository::collection_repository_impl::PostgresCollectionRepository;
use crate::repository::executor::PgExecutor;
use crate::repository::loan_repository_impl::PostgresLoanRepository;
use crate::repository::schedule_repository_impl::PostgresScheduleRepository;
use crate::repository::user_repository_impl::{
    PostgresAgentAssignmentRepository, PostgresCustomerRepository, PostgresUserRepository,
};

/// Postgres-backed [`UnitOfWork`]. `begin()` checks out one connection from
/// the pool and opens a `REPEATABLE READ` transaction; the returned session
/// owns that connection for its whole lifetime.
#[derive(Clone)]
pub struct PostgresUnitOfWork {
    pool: PgPool,
}

impl PostgresUnitOfWork {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UnitOfWork<Postgres> for PostgresUnitOfWork {
    type Session = PostgresUnitOfWorkSession;

    async fn begin(&self) -> LoanCoreResult<Self::Session> {
        let executor = PgExecutor::pooled(&self.pool).await?;
        {
            let conn = executor.conn();
            let mut conn = conn.lock().await;
            sqlx::query("BEGIN ISOLATION LEVEL REPEATABLE READ")
                .execute(&mut **conn)
                .await?;
        }
        Ok(PostgresUnitOfWorkSession::new(executor))
    }
}

/// One open transaction, shared by every per-entity repository it hands
/// out. `commit`/`rollback` take `self` by value so a session can only be
/// finalized once.
pub struct PostgresUnitOfWorkSession {
    executor: PgExecutor,
    loans: PostgresLoanRepository,
    schedules: PostgresScheduleRepository,
    collections: PostgresCollectionRepository,
    users: PostgresUserRepository,
    customers: PostgresCustomerRepository,
    agent_assignments: PostgresAgentAssignmentRepository,
    audit: PostgresAuditRepository,
    capital_ledger: PostgresCapitalLedgerRepository,
}

impl PostgresUnitOfWorkSession {
    fn new(executor: PgExecutor) -> Self {
        Self {
            loans: PostgresLoanRepository::new(executor.clone()),
            schedules: PostgresScheduleRepository::new(executor.clone()),
            collections: PostgresCollectionRepository::new(executor.clone()),
            users: PostgresUserRepository::new(executor.clone()),
            customers: PostgresCustomerRepository::new(executor.clone()),
            agent_assignments: PostgresAgentAssignmentRepository::new(executor.clone()),
            audit: PostgresAuditRepository::new(executor.clone()),
            capital_ledger: PostgresCapitalLedgerRepository::new(executor.clone()),
            executor,
        }
    }
}

#[async_trait]
impl UnitOfWorkSession<Postgres> for PostgresUnitOfWorkSession {
    type LoanRepo = PostgresLoanRepository;
    type ScheduleRepo = PostgresScheduleRepository;
    type CollectionRepo = PostgresCollectionRepository;
    type UserRepo = PostgresUserRepository;
    type CustomerRepo = PostgresCustomerRepository;
    type AgentAssignmentRepo = PostgresAgentAssignmentRepository;
    type AuditRepo = PostgresAuditRepository;
    type CapitalLedgerRepo = PostgresCapitalLedgerRepository;

    fn loans(&self) -> &Self::LoanRepo {
        &self.loans
    }

    fn schedules(&self) -> &Self::ScheduleRepo {
        &self.schedules
    }

    fn collections(&self) -> &Self::CollectionRepo {
        &self.collections
    }

    fn users(&self) -> &Self::UserRepo {
        &self.users
    }

    fn customers(&self) -> &Self::CustomerRepo {
        &self.customers
    }

    fn agent_assignments(&self) -> &Self::AgentAssignmentRepo {
        &self.agent_assignments
    }

    fn audit(&self) -> &Self::AuditRepo {
        &self.audit
    }

    fn capital_ledger(&self) -> &Self::CapitalLedgerRepo {
        &self.capital_ledger
    }

    async fn commit(self) -> LoanCoreResult<()> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        sqlx::query("COMMIT").execute(&mut **conn).await?;
        Ok(())
    }

    async fn rollback(self) -> LoanCoreResult<()> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        sqlx::query("ROLLBACK").execute(&mut **conn).await?;
        Ok(())
    }
}
