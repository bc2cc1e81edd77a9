use async_trait::async_trait;
use sqlx::Database;
use uuid::Uuid;

use crate::models::loan::ScheduleRowModel;

#[async_trait]
pub trait ScheduleRepository<DB: Database>: Send + Sync {
    /// Insert a full schedule in one round trip. Generation is idempotent
    /// on `(loan_id, installment_number)`; a conflicting insert is treated
    /// as a no-op by the caller, not by this method.
    async fn insert_rows(&self, rows: &[ScheduleRowModel]) -> Result<u64, sqlx::Error>;

    async fn find_for_loan(&self, loan_id: Uuid) -> Result<Vec<ScheduleRowModel>, sqlx::Error>;

    async fn find_row(
        &self,
        loan_id: Uuid,
        installment_number: i32,
    ) -> Result<Option<ScheduleRowModel>, sqlx::Error>;

    async fn find_next_unpaid(&self, loan_id: Uuid) -> Result<Option<ScheduleRowModel>, sqlx::Error>;

    async fn update_row(&self, row: &ScheduleRowModel) -> Result<ScheduleRowModel, sqlx::Error>;

    async fn loans_missing_schedule(&self, limit: i64) -> Result<Vec<Uuid>, sqlx::Error>;
}
