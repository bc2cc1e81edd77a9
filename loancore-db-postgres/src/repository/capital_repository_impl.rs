use async_trait::async_trait;
use loancore_api::CapitalLedgerStatus;
use loancore_db::{BorrowingModel, CapitalLedgerRepository, InvestmentModel};
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{Postgres, Row};
use std::str::FromStr;

use crate::repository::executor::PgExecutor;
use crate::utils::get_heapless_string;

fn row_to_investment(row: &PgRow) -> Result<InvestmentModel, sqlx::Error> {
    let status: String = row.try_get("status")?;
    Ok(InvestmentModel {
        id: row.try_get("id")?,
        amount: row.try_get("amount")?,
        source: get_heapless_string(row, "source").map_err(sqlx::Error::Decode)?,
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        status: CapitalLedgerStatus::from_str(&status).map_err(|e| sqlx::Error::Decode(e.into()))?,
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_borrowing(row: &PgRow) -> Result<BorrowingModel, sqlx::Error> {
    let status: String = row.try_get("status")?;
    Ok(BorrowingModel {
        id: row.try_get("id")?,
        amount: row.try_get("amount")?,
        lender: get_heapless_string(row, "lender").map_err(sqlx::Error::Decode)?,
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        status: CapitalLedgerStatus::from_str(&status).map_err(|e| sqlx::Error::Decode(e.into()))?,
        created_at: row.try_get("created_at")?,
    })
}

pub struct PostgresCapitalLedgerRepository {
    executor: PgExecutor,
}

impl PostgresCapitalLedgerRepository {
    pub(crate) fn new(executor: PgExecutor) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl CapitalLedgerRepository<Postgres> for PostgresCapitalLedgerRepository {
    async fn create_investment(
        &self,
        investment: &InvestmentModel,
    ) -> Result<InvestmentModel, sqlx::Error> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        let row = sqlx::query(
            r#"
            INSERT INTO investments (id, amount, source, start_date, end_date, status, created_at)
            VALUES ($1,$2,$3,$4,$5,$6,$7)
            RETURNING *
            "#,
        )
        .bind(investment.id)
        .bind(investment.amount)
        .bind(investment.source.as_str())
        .bind(investment.start_date)
        .bind(investment.end_date)
        .bind(investment.status.to_string())
        .bind(investment.created_at)
        .fetch_one(&mut **conn)
        .await?;
        row_to_investment(&row)
    }

    async fn list_investments(&self) -> Result<Vec<InvestmentModel>, sqlx::Error> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        let rows = sqlx::query("SELECT * FROM investments ORDER BY start_date DESC")
            .fetch_all(&mut **conn)
            .await?;
        rows.iter().map(row_to_investment).collect()
    }

    async fn create_borrowing(&self, borrowing: &BorrowingModel) -> Result<BorrowingModel, sqlx::Error> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        let row = sqlx::query(
            r#"
            INSERT INTO borrowings (id, amount, lender, start_date, end_date, status, created_at)
            VALUES ($1,$2,$3,$4,$5,$6,$7)
            RETURNING *
            "#,
        )
        .bind(borrowing.id)
        .bind(borrowing.amount)
        .bind(borrowing.lender.as_str())
        .bind(borrowing.start_date)
        .bind(borrowing.end_date)
        .bind(borrowing.status.to_string())
        .bind(borrowing.created_at)
        .fetch_one(&mut **conn)
        .await?;
        row_to_borrowing(&row)
    }

    async fn list_borrowings(&self) -> Result<Vec<BorrowingModel>, sqlx::Error> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        let rows = sqlx::query("SELECT * FROM borrowings ORDER BY start_date DESC")
            .fetch_all(&mut **conn)
            .await?;
        rows.iter().map(row_to_borrowing).collect()
    }

    async fn total_active_investment(&self) -> Result<Decimal, sqlx::Error> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        let row = sqlx::query(
            "SELECT COALESCE(SUM(amount), 0) AS total FROM investments WHERE status = 'Active'",
        )
        .fetch_one(&mut **conn)
        .await?;
        row.try_get("total")
    }

    async fn total_active_borrowing(&self) -> Result<Decimal, sqlx::Error> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        let row = sqlx::query(
            "SELECT COALESCE(SUM(amount), 0) AS total FROM borrowings WHERE status = 'Active'",
        )
        .fetch_one(&mut **conn)
        .await?;
        row.try_get("total")
    }
}
