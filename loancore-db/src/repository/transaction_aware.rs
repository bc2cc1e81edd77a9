use async_trait::async_trait;
use loancore_api::LoanCoreResult;

/// Registered with a `UnitOfWorkSession` by anything that needs to react to
/// the outcome of the enclosing transaction without seeing the transaction
/// itself. The cache adapter's invalidation step is the only current
/// implementer.
#[async_trait]
pub trait TransactionAware: Send + Sync {
    async fn on_commit(&self) -> LoanCoreResult<()>;
    async fn on_rollback(&self) -> LoanCoreResult<()>;
}
