use async_trait::async_trait;
use loancore_api::calculator;
use loancore_api::{InstallmentStatus, LoanCoreError, LoanCoreResult, ScheduleGenerationReport, ScheduleGenerator};
use loancore_db::{LoanRepository, ScheduleRepository, ScheduleRowModel, UnitOfWork, UnitOfWorkSession};
use sqlx::Postgres;
use std::sync::Arc;
use uuid::Uuid;

/// Deferred schedule materialization, run as a polling worker rather than
/// inline on disbursement. `generate_for_loan` is idempotent: it
/// reads the loan's current row count via the unique
/// `(loan_id, installment_number)` constraint and skips rows that already
/// exist, so a partially-completed batch never double-inserts. The HTTP
/// crate's `main` drives `run_pending_batch` on a fixed interval.
pub struct ScheduleGeneratorImpl<U: UnitOfWork<Postgres>> {
    uow: Arc<U>,
}

impl<U: UnitOfWork<Postgres>> ScheduleGeneratorImpl<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork<Postgres> + Send + Sync> ScheduleGenerator for ScheduleGeneratorImpl<U> {
    async fn generate_for_loan(&self, loan_id: Uuid) -> LoanCoreResult<u32> {
        let session = self.uow.begin().await?;

        let loan = match session.loans().find_by_id(loan_id).await? {
            Some(loan) => loan,
            None => {
                session.rollback().await?;
                return Err(LoanCoreError::LoanNotFound(loan_id));
            }
        };

        let start_date = match loan.start_date {
            Some(d) => d,
            None => {
                // Not yet disbursed; nothing to schedule.
                session.rollback().await?;
                return Ok(0);
            }
        };

        let existing = session.schedules().find_for_loan(loan_id).await?;
        let already_present: std::collections::HashSet<i32> =
            existing.iter().map(|r| r.installment_number).collect();

        let entries = calculator::generate_schedule(
            loan.principal,
            loan.annual_interest_percent,
            loan.tenure_installments as u32,
            loan.frequency,
            loan.repayment_type,
            start_date,
        )?;

        let rows: Vec<ScheduleRowModel> = entries
            .into_iter()
            .filter(|e| !already_present.contains(&(e.installment_number as i32)))
            .map(|e| ScheduleRowModel {
                id: Uuid::new_v4(),
                loan_id,
                installment_number: e.installment_number as i32,
                due_date: e.due_date,
                principal_due: e.principal_due,
                interest_due: e.interest_due,
                total_due: e.total_due,
                principal_paid: rust_decimal::Decimal::ZERO,
                interest_paid: rust_decimal::Decimal::ZERO,
                total_paid: rust_decimal::Decimal::ZERO,
                status: InstallmentStatus::Scheduled,
                paid_at: None,
            })
            .collect();

        let inserted = if rows.is_empty() {
            0
        } else {
            session.schedules().insert_rows(&rows).await?
        };

        session.commit().await?;
        Ok(inserted as u32)
    }

    async fn run_pending_batch(&self, batch_size: u32) -> LoanCoreResult<ScheduleGenerationReport> {
        let session = self.uow.begin().await?;
        let pending = session.schedules().loans_missing_schedule(batch_size as i64).await?;
        session.rollback().await?;

        let mut report = ScheduleGenerationReport::default();
        for loan_id in pending {
            match self.generate_for_loan(loan_id).await {
                Ok(rows) => {
                    report.loans_processed += 1;
                    report.rows_inserted += rows;
                }
                Err(e) => {
                    report.loans_failed += 1;
                    tracing::warn!(loan_id = %loan_id, error = %e, "schedule generation failed for loan");
                }
            }
        }
        Ok(report)
    }
}
