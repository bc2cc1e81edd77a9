use async_trait::async_trait;
use loancore_api::{ChargeType, Frequency, LoanStatus, RepaymentType};
use loancore_db::{LoanChargeModel, LoanModel, LoanRepository};
use sqlx::postgres::PgRow;
use sqlx::{Postgres, Row};
use std::str::FromStr;
use uuid::Uuid;

use crate::repository::executor::PgExecutor;
use crate::utils::{get_heapless_string, get_optional_heapless_string};

fn row_to_loan(row: &PgRow) -> Result<LoanModel, sqlx::Error> {
    let frequency: String = row.try_get("frequency")?;
    let repayment_type: String = row.try_get("repayment_type")?;
    let status: String = row.try_get("status")?;
    Ok(LoanModel {
        id: row.try_get("id")?,
        loan_number: row.try_get("loan_number")?,
        principal: row.try_get("principal")?,
        annual_interest_percent: row.try_get("annual_interest_percent")?,
        tenure_installments: row.try_get("tenure_installments")?,
        frequency: Frequency::from_str(&frequency)
            .map_err(|e| sqlx::Error::Decode(e.into()))?,
        repayment_type: RepaymentType::from_str(&repayment_type)
            .map_err(|e| sqlx::Error::Decode(e.into()))?,
        grace_period_days: row.try_get("grace_period_days")?,
        late_fee_daily_percent: row.try_get("late_fee_daily_percent")?,
        penalty_percent: row.try_get("penalty_percent")?,
        installment_amount: row.try_get("installment_amount")?,
        total_interest: row.try_get("total_interest")?,
        total_amount: row.try_get("total_amount")?,
        disbursed_amount: row.try_get("disbursed_amount")?,
        disbursed_at: row.try_get("disbursed_at")?,
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        outstanding_principal: row.try_get("outstanding_principal")?,
        outstanding_interest: row.try_get("outstanding_interest")?,
        total_collected: row.try_get("total_collected")?,
        total_late_fees_paid: row.try_get("total_late_fees_paid")?,
        total_penalties_paid: row.try_get("total_penalties_paid")?,
        status: LoanStatus::from_str(&status).map_err(|e| sqlx::Error::Decode(e.into()))?,
        closed_at: row.try_get("closed_at")?,
        is_top_up: row.try_get("is_top_up")?,
        original_loan_id: row.try_get("original_loan_id")?,
        top_up_amount: row.try_get("top_up_amount")?,
        customer_id: row.try_get("customer_id")?,
        created_by: row.try_get("created_by")?,
        remarks: get_optional_heapless_string(row, "remarks").map_err(|e| sqlx::Error::Decode(e))?,
        created_at: row.try_get("created_at")?,
        last_updated_at: row.try_get("last_updated_at")?,
    })
}

fn row_to_charge(row: &PgRow) -> Result<LoanChargeModel, sqlx::Error> {
    let charge_type: String = row.try_get("charge_type")?;
    Ok(LoanChargeModel {
        id: row.try_get("id")?,
        loan_id: row.try_get("loan_id")?,
        charge_type: ChargeType::from_str(&charge_type).map_err(|e| sqlx::Error::Decode(e.into()))?,
        amount: row.try_get("amount")?,
    })
}

/// sqlx/Postgres implementation of [`LoanRepository`]. Every call borrows
/// the session's shared connection rather than the pool directly, so reads
/// issued mid-transaction observe the transaction's own writes.
pub struct PostgresLoanRepository {
    executor: PgExecutor,
}

impl PostgresLoanRepository {
    pub(crate) fn new(executor: PgExecutor) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl LoanRepository<Postgres> for PostgresLoanRepository {
    async fn create(&self, loan: &LoanModel) -> Result<LoanModel, sqlx::Error> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        let remarks: Option<&str> = loan.remarks.as_deref();
        let row = sqlx::query(
            r#"
            INSERT INTO loans (
                id, loan_number, principal, annual_interest_percent, tenure_installments,
                frequency, repayment_type, grace_period_days, late_fee_daily_percent, penalty_percent,
                installment_amount, total_interest, total_amount,
                disbursed_amount, disbursed_at, start_date, end_date,
                outstanding_principal, outstanding_interest, total_collected,
                total_late_fees_paid, total_penalties_paid,
                status, closed_at, is_top_up, original_loan_id, top_up_amount,
                customer_id, created_by, remarks, created_at, last_updated_at
            ) VALUES (
                $1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16,$17,$18,$19,$20,
                $21,$22,$23,$24,$25,$26,$27,$28,$29,$30,$31,$32
            ) RETURNING *
            "#,
        )
        .bind(loan.id)
        .bind(loan.loan_number)
        .bind(loan.principal)
        .bind(loan.annual_interest_percent)
        .bind(loan.tenure_installments)
        .bind(loan.frequency.to_string())
        .bind(loan.repayment_type.to_string())
        .bind(loan.grace_period_days)
        .bind(loan.late_fee_daily_percent)
        .bind(loan.penalty_percent)
        .bind(loan.installment_amount)
        .bind(loan.total_interest)
        .bind(loan.total_amount)
        .bind(loan.disbursed_amount)
        .bind(loan.disbursed_at)
        .bind(loan.start_date)
        .bind(loan.end_date)
        .bind(loan.outstanding_principal)
        .bind(loan.outstanding_interest)
        .bind(loan.total_collected)
        .bind(loan.total_late_fees_paid)
        .bind(loan.total_penalties_paid)
        .bind(loan.status.to_string())
        .bind(loan.closed_at)
        .bind(loan.is_top_up)
        .bind(loan.original_loan_id)
        .bind(loan.top_up_amount)
        .bind(loan.customer_id)
        .bind(loan.created_by)
        .bind(remarks)
        .bind(loan.created_at)
        .bind(loan.last_updated_at)
        .fetch_one(&mut **conn)
        .await?;
        row_to_loan(&row)
    }

    async fn update(&self, loan: &LoanModel) -> Result<LoanModel, sqlx::Error> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        let remarks: Option<&str> = loan.remarks.as_deref();
        let row = sqlx::query(
            r#"
            UPDATE loans SET
                installment_amount = $2, total_interest = $3, total_amount = $4,
                disbursed_amount = $5, disbursed_at = $6, start_date = $7, end_date = $8,
                outstanding_principal = $9, outstanding_interest = $10, total_collected = $11,
                total_late_fees_paid = $12, total_penalties_paid = $13,
                status = $14, closed_at = $15, is_top_up = $16, original_loan_id = $17,
                top_up_amount = $18, remarks = $19, last_updated_at = $20
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(loan.id)
        .bind(loan.installment_amount)
        .bind(loan.total_interest)
        .bind(loan.total_amount)
        .bind(loan.disbursed_amount)
        .bind(loan.disbursed_at)
        .bind(loan.start_date)
        .bind(loan.end_date)
        .bind(loan.outstanding_principal)
        .bind(loan.outstanding_interest)
        .bind(loan.total_collected)
        .bind(loan.total_late_fees_paid)
        .bind(loan.total_penalties_paid)
        .bind(loan.status.to_string())
        .bind(loan.closed_at)
        .bind(loan.is_top_up)
        .bind(loan.original_loan_id)
        .bind(loan.top_up_amount)
        .bind(remarks)
        .bind(loan.last_updated_at)
        .fetch_one(&mut **conn)
        .await?;
        row_to_loan(&row)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<LoanModel>, sqlx::Error> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        let row = sqlx::query("SELECT * FROM loans WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut **conn)
            .await?;
        row.as_ref().map(row_to_loan).transpose()
    }

    async fn find_by_id_for_update(&self, id: Uuid) -> Result<Option<LoanModel>, sqlx::Error> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        let row = sqlx::query("SELECT * FROM loans WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut **conn)
            .await?;
        row.as_ref().map(row_to_loan).transpose()
    }

    async fn find_by_loan_number(&self, loan_number: i64) -> Result<Option<LoanModel>, sqlx::Error> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        let row = sqlx::query("SELECT * FROM loans WHERE loan_number = $1")
            .bind(loan_number)
            .fetch_optional(&mut **conn)
            .await?;
        row.as_ref().map(row_to_loan).transpose()
    }

    async fn list_for_customer(
        &self,
        customer_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<LoanModel>, sqlx::Error> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        let rows = sqlx::query(
            "SELECT * FROM loans WHERE customer_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(customer_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut **conn)
        .await?;
        rows.iter().map(row_to_loan).collect()
    }

    async fn count_for_customer(&self, customer_id: Uuid) -> Result<i64, sqlx::Error> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        let row = sqlx::query("SELECT COUNT(*) AS count FROM loans WHERE customer_id = $1")
            .bind(customer_id)
            .fetch_one(&mut **conn)
            .await?;
        row.try_get("count")
    }

    async fn next_loan_number(&self) -> Result<i64, sqlx::Error> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        let row = sqlx::query("SELECT nextval('loan_number_seq') AS next")
            .fetch_one(&mut **conn)
            .await?;
        row.try_get("next")
    }

    async fn create_charges(&self, charges: &[LoanChargeModel]) -> Result<(), sqlx::Error> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        for charge in charges {
            sqlx::query(
                "INSERT INTO loan_charges (id, loan_id, charge_type, amount) VALUES ($1,$2,$3,$4)",
            )
            .bind(charge.id)
            .bind(charge.loan_id)
            .bind(charge.charge_type.to_string())
            .bind(charge.amount)
            .execute(&mut **conn)
            .await?;
        }
        Ok(())
    }

    async fn find_charges_for_loan(&self, loan_id: Uuid) -> Result<Vec<LoanChargeModel>, sqlx::Error> {
        let conn = self.executor.conn();
        let mut conn = conn.lock().await;
        let rows = sqlx::query("SELECT * FROM loan_charges WHERE loan_id = $1")
            .bind(loan_id)
            .fetch_all(&mut **conn)
            .await?;
        rows.iter().map(row_to_charge).collect()
    }
}
