use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Collection, RecordCollectionRequest};
use crate::error::LoanCoreResult;

/// Repayment recording. `record_collection` runs the full 11-step
/// procedure: row-lock the loan, recompute accrued late
/// fees/penalties as of the collection date, allocate by priority,
/// persist allocations and schedule-row updates, assign a receipt number,
/// write the audit entry, and invalidate cached loan summaries on commit.
/// A storage conflict during the row lock is retried exactly once before
/// surfacing `LoanCoreError::TransientFailure`.
#[async_trait]
pub trait CollectionService: Send + Sync {
    async fn record_collection(
        &self,
        actor_id: Uuid,
        request: RecordCollectionRequest,
    ) -> LoanCoreResult<Collection>;

    async fn get_collection(&self, actor_id: Uuid, collection_id: Uuid) -> LoanCoreResult<Collection>;

    /// `page` is 1-based; `limit` is clamped to a sane maximum by the
    /// implementation.
    async fn list_collections_for_loan(
        &self,
        actor_id: Uuid,
        loan_id: Uuid,
        page: u32,
        limit: u32,
    ) -> LoanCoreResult<Vec<Collection>>;
}
