use async_trait::async_trait;
use loancore_api::InstallmentStatus;
use loancore_db::{ScheduleRepository, ScheduleRowModel};
use sqlx::postgres::PgRow;
use sqlx::{Postgres, Row};
use std::str::FromStr;
use uuid::Uuid;

use crate::repository::executor::PgExecutor;

fn row_to_schedule_row(row: &PgRow) -> Result<ScheduleRowModel, sqlx::Error> {
    let status: String = row.try_get("status")?;
    Ok(ScheduleRowModel {
        id: row.try_get("id")?,
        loan_id: row.try_get("loan_id")?,
        installment_number: row.try_get("installment_number")?,
        due_date: row.try_get("due_date")?,
        principal_due: row.try_get("principal_due")?,
        interest_due: row.try_get("interest_due")?,
        total_due: row.try_get("total_due")?,
        principal_paid: row.try_get("principal_paid")?,
        interest_paid: row.try_get("interest_paid")?,
        total_paid: row.try_get("total_paid")?,
        status: InstallmentStatus::from_str(&status).map_err(|e| sqlx::Error::Decode(e.into()))?,
        paid_at: row.try_get("paid_at")?,
    })
}

/// `insert_rows` relies on the `(loan_id, installment_number)` unique index
/// and `ON CONFLICT DO NOTHING` to make repeated generator runs idempotent
/// without a round-trip existence check per row.
pub struct PostgresScheduleRepository {
    executor: PgExecutor,
}

impl PostgresScheduleRepository {
    pub(crate) fn new(executor: PgExecutor) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl ScheduleRepository<Postgres> for PostgresScheduleRepository {
    async fn insert_rows(&self, rows: &[ScheduleRowModel]) -> Result<u64, sqlx::Error> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        let mut inserted = 0u64;
        for row in rows {
            let result = sqlx::query(
                r#"
                INSERT INTO schedule_rows (
                    id, loan_id, installment_number, due_date, principal_due, interest_due,
                    total_due, principal_paid, interest_paid, total_paid, status, paid_at
                ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12)
                ON CONFLICT (loan_id, installment_number) DO NOTHING
                "#,
            )
            .bind(row.id)
            .bind(row.loan_id)
            .bind(row.installment_number)
            .bind(row.due_date)
            .bind(row.principal_due)
            .bind(row.interest_due)
            .bind(row.total_due)
            .bind(row.principal_paid)
            .bind(row.interest_paid)
            .bind(row.total_paid)
            .bind(row.status.to_string())
            .bind(row.paid_at)
            .execute(&mut **conn)
            .await?;
            inserted += result.rows_affected();
        }
        Ok(inserted)
    }

    async fn find_for_loan(&self, loan_id: Uuid) -> Result<Vec<ScheduleRowModel>, sqlx::Error> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        let rows = sqlx::query(
            "SELECT * FROM schedule_rows WHERE loan_id = $1 ORDER BY installment_number ASC",
        )
        .bind(loan_id)
        .fetch_all(&mut **conn)
        .await?;
        rows.iter().map(row_to_schedule_row).collect()
    }

    async fn find_row(
        &self,
        loan_id: Uuid,
        installment_number: i32,
    ) -> Result<Option<ScheduleRowModel>, sqlx::Error> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        let row = sqlx::query(
            "SELECT * FROM schedule_rows WHERE loan_id = $1 AND installment_number = $2",
        )
        .bind(loan_id)
        .bind(installment_number)
        .fetch_optional(&mut **conn)
        .await?;
        row.as_ref().map(row_to_schedule_row).transpose()
    }

    async fn find_next_unpaid(&self, loan_id: Uuid) -> Result<Option<ScheduleRowModel>, sqlx::Error> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        let row = sqlx::query(
            r#"
            SELECT * FROM schedule_rows
            WHERE loan_id = $1 AND total_paid < total_due
            ORDER BY installment_number ASC
            LIMIT 1
            "#,
        )
        .bind(loan_id)
        .fetch_optional(&mut **conn)
        .await?;
        row.as_ref().map(row_to_schedule_row).transpose()
    }

    async fn update_row(&self, row: &ScheduleRowModel) -> Result<ScheduleRowModel, sqlx::Error> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        let pg_row = sqlx::query(
            r#"
            UPDATE schedule_rows SET
                principal_paid = $3, interest_paid = $4, total_paid = $5,
                status = $6, paid_at = $7
            WHERE loan_id = $1 AND installment_number = $2
            RETURNING *
            "#,
        )
        .bind(row.loan_id)
        .bind(row.installment_number)
        .bind(row.principal_paid)
        .bind(row.interest_paid)
        .bind(row.total_paid)
        .bind(row.status.to_string())
        .bind(row.paid_at)
        .fetch_one(&mut **conn)
        .await?;
        row_to_schedule_row(&pg_row)
    }

    async fn loans_missing_schedule(&self, limit: i64) -> Result<Vec<Uuid>, sqlx::Error> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        let rows = sqlx::query(
            r#"
            SELECT l.id FROM loans l
            WHERE l.status = 'Active'
              AND NOT EXISTS (SELECT 1 FROM schedule_rows s WHERE s.loan_id = l.id)
            ORDER BY l.disbursed_at ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&mut **conn)
        .await?;
        rows.iter().map(|r| r.try_get("id")).collect()
    }
}
