use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{CreateLoanRequest, Loan, LoanSummaryView, TopUpRequest};
use crate::error::LoanCoreResult;

/// Loan lifecycle management: creation through closure.
/// Every mutating method writes its audit entry in the same transaction as
/// the ledger change it describes.
#[async_trait]
pub trait LoanService: Send + Sync {
    /// Validates terms, computes the installment/total-interest pair, and
    /// persists the loan in `Pending` status. Does not disburse funds or
    /// generate a schedule.
    async fn create_loan(&self, actor_id: Uuid, request: CreateLoanRequest) -> LoanCoreResult<Loan>;

    /// `Pending -> Active`-eligible transition step; does not itself move
    /// the loan into `Active` (that happens on disbursement).
    async fn approve(&self, actor_id: Uuid, loan_id: Uuid) -> LoanCoreResult<Loan>;

    /// Records the disbursed amount and start date, moves the loan to
    /// `Active`, and enqueues schedule generation. `disbursed_amount`
    /// defaults to the loan's computed `principal - sum(charges)` when
    /// omitted; an explicit override is rejected if it would violate that
    /// invariant.
    async fn disburse(
        &self,
        actor_id: Uuid,
        loan_id: Uuid,
        disbursed_amount: Option<Decimal>,
        start_date: NaiveDate,
    ) -> LoanCoreResult<Loan>;

    /// Regular closure once the final installment is paid in full.
    async fn close(&self, actor_id: Uuid, loan_id: Uuid) -> LoanCoreResult<Loan>;

    /// Early closure via the preclosure amount; rejects if unpaid fees or
    /// penalties remain outstanding.
    async fn preclose(&self, actor_id: Uuid, loan_id: Uuid, as_of: NaiveDate) -> LoanCoreResult<Loan>;

    /// Marks a loan defaulted; a terminal status with no further
    /// collections accepted.
    async fn mark_defaulted(&self, actor_id: Uuid, loan_id: Uuid, reason: Option<String>) -> LoanCoreResult<Loan>;

    /// Preclose the existing loan and open a new one over
    /// `outstanding + top_up_amount` in a single transaction.
    async fn top_up(&self, actor_id: Uuid, request: TopUpRequest) -> LoanCoreResult<Loan>;

    async fn get_loan(&self, actor_id: Uuid, loan_id: Uuid) -> LoanCoreResult<LoanSummaryView>;

    /// `page` is 1-based; `limit` is clamped to a sane maximum by the
    /// implementation.
    async fn list_loans_for_customer(
        &self,
        actor_id: Uuid,
        customer_id: Uuid,
        page: u32,
        limit: u32,
    ) -> LoanCoreResult<Vec<LoanSummaryView>>;
}
