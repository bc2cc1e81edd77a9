use async_trait::async_trait;
use uuid::Uuid;

use crate::error::LoanCoreResult;

/// Outcome of one batch of schedule generation, mirroring the
/// record-counting shape the EOD-style batch jobs in this codebase report.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleGenerationReport {
    pub loans_processed: u32,
    pub rows_inserted: u32,
    pub loans_failed: u32,
}

/// Deferred schedule generation, run as a polling worker rather than an
/// inline call on disbursement so a slow schedule walk never blocks the
/// HTTP request that triggered it. Idempotent by
/// `(loan_id, installment_number)`: re-running a batch that partially
/// completed never double-inserts a row. Failures are retried with
/// exponential backoff up to 3 attempts, then the job is parked for
/// manual review.
#[async_trait]
pub trait ScheduleGenerator: Send + Sync {
    /// Generates and persists every schedule row for one disbursed loan.
    async fn generate_for_loan(&self, loan_id: Uuid) -> LoanCoreResult<u32>;

    /// Polls for loans disbursed but not yet scheduled (or jobs due for
    /// retry) and processes one batch. Called on a fixed interval by the
    /// process `main` in the HTTP crate.
    async fn run_pending_batch(&self, batch_size: u32) -> LoanCoreResult<ScheduleGenerationReport>;
}
