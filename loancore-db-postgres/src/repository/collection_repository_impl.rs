use async_trait::async_trait;
use chrono::NaiveDate;
use loancore_api::PaymentMethod;
use loancore_db::{CollectionModel, CollectionRepository, LateFeeModel, PenaltyModel};
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{Postgres, Row};
use std::str::FromStr;
use uuid::Uuid;

use crate::repository::executor::PgExecutor;
use crate::utils::{get_heapless_string, get_optional_heapless_string};

fn row_to_collection(row: &PgRow) -> Result<CollectionModel, sqlx::Error> {
    let payment_method: String = row.try_get("payment_method")?;
    Ok(CollectionModel {
        id: row.try_get("id")?,
        loan_id: row.try_get("loan_id")?,
        agent_id: row.try_get("agent_id")?,
        amount: row.try_get("amount")?,
        principal_allocation: row.try_get("principal_allocation")?,
        interest_allocation: row.try_get("interest_allocation")?,
        fee_allocation: row.try_get("fee_allocation")?,
        penalty_allocation: row.try_get("penalty_allocation")?,
        collection_date: row.try_get("collection_date")?,
        payment_method: PaymentMethod::from_str(&payment_method)
            .map_err(|e| sqlx::Error::Decode(e.into()))?,
        receipt_number: get_heapless_string(row, "receipt_number").map_err(sqlx::Error::Decode)?,
        remarks: get_optional_heapless_string(row, "remarks").map_err(sqlx::Error::Decode)?,
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_late_fee(row: &PgRow) -> Result<LateFeeModel, sqlx::Error> {
    Ok(LateFeeModel {
        id: row.try_get("id")?,
        loan_id: row.try_get("loan_id")?,
        schedule_row_id: row.try_get("schedule_row_id")?,
        amount: row.try_get("amount")?,
        paid_amount: row.try_get("paid_amount")?,
        overdue_days: row.try_get("overdue_days")?,
        applied_at: row.try_get("applied_at")?,
        paid: row.try_get("paid")?,
    })
}

fn row_to_penalty(row: &PgRow) -> Result<PenaltyModel, sqlx::Error> {
    Ok(PenaltyModel {
        id: row.try_get("id")?,
        loan_id: row.try_get("loan_id")?,
        amount: row.try_get("amount")?,
        paid_amount: row.try_get("paid_amount")?,
        reason: get_heapless_string(row, "reason").map_err(sqlx::Error::Decode)?,
        applied_at: row.try_get("applied_at")?,
        paid: row.try_get("paid")?,
    })
}

/// `receipt_number` carries a unique index (`loancore_receipt_number_key`);
/// a collision on insert surfaces as `sqlx::Error::Database` with that
/// constraint name, which `LoanCoreError::from` maps to `TransientFailure`
/// so the caller's single retry can mint a fresh receipt number.
pub struct PostgresCollectionRepository {
    executor: PgExecutor,
}

impl PostgresCollectionRepository {
    pub(crate) fn new(executor: PgExecutor) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl CollectionRepository<Postgres> for PostgresCollectionRepository {
    async fn create(&self, collection: &CollectionModel) -> Result<CollectionModel, sqlx::Error> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        let remarks: Option<&str> = collection.remarks.as_deref();
        let row = sqlx::query(
            r#"
            INSERT INTO collections (
                id, loan_id, agent_id, amount, principal_allocation, interest_allocation,
                fee_allocation, penalty_allocation, collection_date, payment_method,
                receipt_number, remarks, created_at
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13)
            RETURNING *
            "#,
        )
        .bind(collection.id)
        .bind(collection.loan_id)
        .bind(collection.agent_id)
        .bind(collection.amount)
        .bind(collection.principal_allocation)
        .bind(collection.interest_allocation)
        .bind(collection.fee_allocation)
        .bind(collection.penalty_allocation)
        .bind(collection.collection_date)
        .bind(collection.payment_method.to_string())
        .bind(collection.receipt_number.as_str())
        .bind(remarks)
        .bind(collection.created_at)
        .fetch_one(&mut **conn)
        .await?;
        row_to_collection(&row)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<CollectionModel>, sqlx::Error> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        let row = sqlx::query("SELECT * FROM collections WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut **conn)
            .await?;
        row.as_ref().map(row_to_collection).transpose()
    }

    async fn find_by_receipt_number(
        &self,
        receipt_number: &str,
    ) -> Result<Option<CollectionModel>, sqlx::Error> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        let row = sqlx::query("SELECT * FROM collections WHERE receipt_number = $1")
            .bind(receipt_number)
            .fetch_optional(&mut **conn)
            .await?;
        row.as_ref().map(row_to_collection).transpose()
    }

    async fn list_for_loan(&self, loan_id: Uuid) -> Result<Vec<CollectionModel>, sqlx::Error> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        let rows = sqlx::query(
            "SELECT * FROM collections WHERE loan_id = $1 ORDER BY collection_date DESC, created_at DESC",
        )
        .bind(loan_id)
        .fetch_all(&mut **conn)
        .await?;
        rows.iter().map(row_to_collection).collect()
    }

    async fn create_late_fee(&self, fee: &LateFeeModel) -> Result<LateFeeModel, sqlx::Error> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        let row = sqlx::query(
            r#"
            INSERT INTO late_fees (id, loan_id, schedule_row_id, amount, paid_amount, overdue_days, applied_at, paid)
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
            RETURNING *
            "#,
        )
        .bind(fee.id)
        .bind(fee.loan_id)
        .bind(fee.schedule_row_id)
        .bind(fee.amount)
        .bind(fee.paid_amount)
        .bind(fee.overdue_days)
        .bind(fee.applied_at)
        .bind(fee.paid)
        .fetch_one(&mut **conn)
        .await?;
        row_to_late_fee(&row)
    }

    async fn find_unpaid_late_fees(&self, loan_id: Uuid) -> Result<Vec<LateFeeModel>, sqlx::Error> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        let rows = sqlx::query(
            "SELECT * FROM late_fees WHERE loan_id = $1 AND paid = false ORDER BY applied_at ASC",
        )
        .bind(loan_id)
        .fetch_all(&mut **conn)
        .await?;
        rows.iter().map(row_to_late_fee).collect()
    }

    async fn apply_late_fee_payment(&self, id: Uuid, amount: Decimal) -> Result<(), sqlx::Error> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        sqlx::query(
            r#"
            UPDATE late_fees
            SET paid_amount = paid_amount + $2,
                paid = (paid_amount + $2) >= amount
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(amount)
        .execute(&mut **conn)
        .await?;
        Ok(())
    }

    async fn create_penalty(&self, penalty: &PenaltyModel) -> Result<PenaltyModel, sqlx::Error> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        let row = sqlx::query(
            r#"
            INSERT INTO penalties (id, loan_id, amount, paid_amount, reason, applied_at, paid)
            VALUES ($1,$2,$3,$4,$5,$6,$7)
            RETURNING *
            "#,
        )
        .bind(penalty.id)
        .bind(penalty.loan_id)
        .bind(penalty.amount)
        .bind(penalty.paid_amount)
        .bind(penalty.reason.as_str())
        .bind(penalty.applied_at)
        .bind(penalty.paid)
        .fetch_one(&mut **conn)
        .await?;
        row_to_penalty(&row)
    }

    async fn find_unpaid_penalties(&self, loan_id: Uuid) -> Result<Vec<PenaltyModel>, sqlx::Error> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        let rows = sqlx::query(
            "SELECT * FROM penalties WHERE loan_id = $1 AND paid = false ORDER BY applied_at ASC",
        )
        .bind(loan_id)
        .fetch_all(&mut **conn)
        .await?;
        rows.iter().map(row_to_penalty).collect()
    }

    async fn apply_penalty_payment(&self, id: Uuid, amount: Decimal) -> Result<(), sqlx::Error> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        sqlx::query(
            r#"
            UPDATE penalties
            SET paid_amount = paid_amount + $2,
                paid = (paid_amount + $2) >= amount
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(amount)
        .execute(&mut **conn)
        .await?;
        Ok(())
    }

    async fn has_unpaid_dues(&self, loan_id: Uuid) -> Result<bool, sqlx::Error> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        let row = sqlx::query(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM late_fees WHERE loan_id = $1 AND paid = false
                UNION ALL
                SELECT 1 FROM penalties WHERE loan_id = $1 AND paid = false
            ) AS has_dues
            "#,
        )
        .bind(loan_id)
        .fetch_one(&mut **conn)
        .await?;
        row.try_get("has_dues")
    }

    async fn find_overdue_loan_ids(&self, as_of: NaiveDate) -> Result<Vec<Uuid>, sqlx::Error> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        let rows = sqlx::query(
            r#"
            SELECT DISTINCT s.loan_id FROM schedule_rows s
            JOIN loans l ON l.id = s.loan_id
            WHERE l.status = 'Active' AND s.total_paid < s.total_due AND s.due_date < $1
            "#,
        )
        .bind(as_of)
        .fetch_all(&mut **conn)
        .await?;
        rows.iter().map(|r| r.try_get("loan_id")).collect()
    }
}
