use async_trait::async_trait;
use chrono::Utc;
use loancore_api::calculator;
use loancore_api::{
    AuditAction, Collection, CollectionService, LoanCoreError, LoanCoreResult, PaymentMethod,
    RecordCollectionRequest, Role,
};
use loancore_db::{
    AgentAssignmentRepository, CollectionModel, CollectionRepository, LateFeeModel, LoanRepository,
    PenaltyModel, ScheduleRepository, UnitOfWork, UnitOfWorkSession, UserRepository,
};
use loancore_db_postgres::CacheAdapter;
use rust_decimal::Decimal;
use sqlx::Postgres;
use std::sync::Arc;
use uuid::Uuid;

use crate::mappers::collection_mapper;
use crate::services::audit_service_impl::AuditServiceImpl;
use crate::validation::collection_validation;

/// Repayment recording. Each call opens its own transaction: row-locks the
/// loan, accrues any late fee/penalty the collection date has newly made
/// due, allocates the payment fee-first/penalty-then/interest-then-principal,
/// walks the schedule rows oldest-first applying what the allocation freed
/// up, and closes the loan once the ledger's outstanding principal and
/// interest both reach zero. A storage conflict on the row lock or the
/// receipt number's unique index is retried once with a fresh attempt
/// before surfacing as a permanent failure.
pub struct CollectionServiceImpl<U: UnitOfWork<Postgres>> {
    uow: Arc<U>,
    cache: Arc<CacheAdapter>,
}

impl<U: UnitOfWork<Postgres> + Send + Sync> CollectionServiceImpl<U> {
    pub fn new(uow: Arc<U>, cache: Arc<CacheAdapter>) -> Self {
        Self { uow, cache }
    }

    async fn authorize<S: UnitOfWorkSession<Postgres>>(
        session: &S,
        actor_id: Uuid,
        customer_id: Uuid,
    ) -> LoanCoreResult<()> {
        let actor = session
            .users()
            .find_by_id(actor_id)
            .await?
            .ok_or(LoanCoreError::UserNotFound(actor_id))?;
        let permitted = match actor.role {
            Role::Admin | Role::Manager => true,
            Role::Agent => {
                let assignment = session.agent_assignments().find_active_for_customer(customer_id).await?;
                assignment.is_some_and(|a| a.is_active && a.agent_user_id == actor_id)
            }
            Role::Customer => false,
        };
        if permitted {
            Ok(())
        } else {
            Err(LoanCoreError::NotAuthorized(
                "no access to record a collection on this loan".to_string(),
            ))
        }
    }

    /// Accrues a late fee for the current overdue installment if the
    /// collection date has pushed it past due (net of the loan's grace
    /// period) and nothing has been charged for that row yet.
    async fn accrue_late_fee<S: UnitOfWorkSession<Postgres>>(
        session: &S,
        loan_id: Uuid,
        installment_amount: Decimal,
        late_fee_daily_percent: Decimal,
        grace_period_days: i32,
        collection_date: chrono::NaiveDate,
    ) -> LoanCoreResult<()> {
        let Some(row) = session.schedules().find_next_unpaid(loan_id).await? else {
            return Ok(());
        };
        let overdue_days =
            calculator::overdue_days_with_grace(collection_date, row.due_date, grace_period_days.max(0) as u32);
        if overdue_days <= 0 || late_fee_daily_percent <= Decimal::ZERO {
            return Ok(());
        }
        let already_charged = session
            .collections()
            .find_unpaid_late_fees(loan_id)
            .await?
            .iter()
            .any(|f| f.schedule_row_id == row.id);
        if already_charged {
            return Ok(());
        }
        let amount = calculator::late_fee(installment_amount, late_fee_daily_percent, overdue_days, None);
        if amount <= Decimal::ZERO {
            return Ok(());
        }
        let fee = LateFeeModel {
            id: Uuid::new_v4(),
            loan_id,
            schedule_row_id: row.id,
            amount,
            paid_amount: Decimal::ZERO,
            overdue_days,
            applied_at: Utc::now(),
            paid: false,
        };
        session.collections().create_late_fee(&fee).await?;
        Ok(())
    }

    /// Settles fees/penalties in the same front-to-back order
    /// `allocate_collection` consumed them in. Each item's *remaining* due
    /// (`amount - paid_amount`) is what can be consumed this round; an
    /// amount smaller than that remaining due is applied as a partial
    /// payment (accumulated in `paid_amount`) rather than dropped, so a fee
    /// settled across two or more undersized collections still converges to
    /// fully paid instead of re-presenting its full amount every time.
    async fn settle_dues<S: UnitOfWorkSession<Postgres>>(
        session: &S,
        fees: &[LateFeeModel],
        penalties: &[PenaltyModel],
        fee_paid: Decimal,
        penalty_paid: Decimal,
    ) -> LoanCoreResult<()> {
        let mut remaining = fee_paid;
        for fee in fees {
            if remaining <= Decimal::ZERO {
                break;
            }
            let due = (fee.amount - fee.paid_amount).max(Decimal::ZERO);
            let pay = due.min(remaining);
            if pay > Decimal::ZERO {
                session.collections().apply_late_fee_payment(fee.id, pay).await?;
                remaining -= pay;
            }
        }
        let mut remaining = penalty_paid;
        for penalty in penalties {
            if remaining <= Decimal::ZERO {
                break;
            }
            let due = (penalty.amount - penalty.paid_amount).max(Decimal::ZERO);
            let pay = due.min(remaining);
            if pay > Decimal::ZERO {
                session.collections().apply_penalty_payment(penalty.id, pay).await?;
                remaining -= pay;
            }
        }
        Ok(())
    }

    /// Applies freed-up principal/interest to schedule rows oldest-first
    /// until the amounts are exhausted.
    async fn apply_to_schedule<S: UnitOfWorkSession<Postgres>>(
        session: &S,
        loan_id: Uuid,
        mut principal_remaining: Decimal,
        mut interest_remaining: Decimal,
    ) -> LoanCoreResult<()> {
        while principal_remaining > Decimal::ZERO || interest_remaining > Decimal::ZERO {
            let Some(mut row) = session.schedules().find_next_unpaid(loan_id).await? else {
                break;
            };
            let interest_due = (row.interest_due - row.interest_paid).max(Decimal::ZERO);
            let interest_pay = interest_due.min(interest_remaining);
            row.interest_paid += interest_pay;
            interest_remaining -= interest_pay;

            let principal_due = (row.principal_due - row.principal_paid).max(Decimal::ZERO);
            let principal_pay = principal_due.min(principal_remaining);
            row.principal_paid += principal_pay;
            principal_remaining -= principal_pay;

            row.total_paid = row.principal_paid + row.interest_paid;
            if row.total_paid >= row.total_due {
                row.status = loancore_api::InstallmentStatus::Paid;
                row.paid_at = Some(Utc::now());
            } else if row.total_paid > Decimal::ZERO {
                row.status = loancore_api::InstallmentStatus::PartiallyPaid;
            }

            let fully_settled = row.status == loancore_api::InstallmentStatus::Paid;
            session.schedules().update_row(&row).await?;

            if !fully_settled {
                break;
            }
        }
        Ok(())
    }

    async fn try_record_collection(
        &self,
        actor_id: Uuid,
        request: &RecordCollectionRequest,
    ) -> LoanCoreResult<Collection> {
        let session = self.uow.begin().await?;

        let mut loan = match session.loans().find_by_id_for_update(request.loan_id).await? {
            Some(loan) => loan,
            None => {
                session.rollback().await?;
                return Err(LoanCoreError::LoanNotFound(request.loan_id));
            }
        };

        if let Err(e) = Self::authorize(&session, actor_id, loan.customer_id).await {
            session.rollback().await?;
            return Err(e);
        }

        if !loan.status.accepts_collections() {
            session.rollback().await?;
            return Err(LoanCoreError::StatusNotCollectable {
                loan_id: loan.id,
                status: loan.status.to_string(),
            });
        }

        let collection_date = request.collection_date.unwrap_or_else(|| Utc::now().date_naive());

        Self::accrue_late_fee(
            &session,
            loan.id,
            loan.installment_amount,
            loan.late_fee_daily_percent,
            loan.grace_period_days,
            collection_date,
        )
        .await?;

        let unpaid_fees = session.collections().find_unpaid_late_fees(loan.id).await?;
        let unpaid_penalties = session.collections().find_unpaid_penalties(loan.id).await?;
        // Remaining due, not the original amount: an item already partially
        // paid by an earlier undersized collection only re-presents what's
        // left of it.
        let fee_amounts: Vec<Decimal> =
            unpaid_fees.iter().map(|f| (f.amount - f.paid_amount).max(Decimal::ZERO)).collect();
        let penalty_amounts: Vec<Decimal> = unpaid_penalties
            .iter()
            .map(|p| (p.amount - p.paid_amount).max(Decimal::ZERO))
            .collect();

        let allocation = match calculator::allocate_collection(
            request.amount,
            &fee_amounts,
            &penalty_amounts,
            loan.outstanding_interest,
            loan.outstanding_principal,
        ) {
            Ok(a) => a,
            Err(e) => {
                session.rollback().await?;
                return Err(e);
            }
        };

        Self::settle_dues(
            &session,
            &unpaid_fees,
            &unpaid_penalties,
            allocation.fee_paid,
            allocation.penalty_paid,
        )
        .await?;

        Self::apply_to_schedule(&session, loan.id, allocation.principal_paid, allocation.interest_paid).await?;

        let before = crate::mappers::loan_mapper::to_domain(&loan);
        loan.outstanding_principal -= allocation.principal_paid;
        loan.outstanding_interest -= allocation.interest_paid;
        loan.total_collected += request.amount;
        loan.total_late_fees_paid += allocation.fee_paid;
        loan.total_penalties_paid += allocation.penalty_paid;
        loan.last_updated_at = Utc::now();

        // The ledger is the source of truth for closure, not the schedule-row
        // projection below: rounding drift between `total_interest` and the
        // sum of per-row `interest_due` can leave a row showing a residual
        // due after the ledger has already reached zero.
        let should_close = loan.outstanding_principal <= Decimal::ZERO && loan.outstanding_interest <= Decimal::ZERO;
        if should_close {
            loan.status = loancore_api::LoanStatus::Closed;
            loan.closed_at = Some(Utc::now());
        }
        let updated_loan = session.loans().update(&loan).await?;
        let after = crate::mappers::loan_mapper::to_domain(&updated_loan);

        let remarks = request
            .remarks
            .as_deref()
            .map(heapless::String::try_from)
            .transpose()
            .map_err(|_| LoanCoreError::ValidationError {
                field: "remarks".to_string(),
                message: "remarks too long".to_string(),
            })?;

        let now = Utc::now();
        let model = CollectionModel {
            id: Uuid::new_v4(),
            loan_id: loan.id,
            agent_id: actor_id,
            amount: request.amount,
            principal_allocation: allocation.principal_paid,
            interest_allocation: allocation.interest_paid,
            fee_allocation: allocation.fee_paid,
            penalty_allocation: allocation.penalty_paid,
            collection_date,
            payment_method: request.payment_method.unwrap_or(PaymentMethod::Cash),
            receipt_number: loancore_db_postgres::generate_receipt_number(now)
                .parse()
                .map_err(|_| LoanCoreError::Internal("generated receipt number too long".to_string()))?,
            remarks,
            created_at: now,
        };
        let created = match session.collections().create(&model).await {
            Ok(c) => c,
            Err(e) => {
                session.rollback().await?;
                return Err(e.into());
            }
        };
        let collection = collection_mapper::to_domain(&created);

        if let Err(e) = AuditServiceImpl::<U>::record_in(
            &session,
            actor_id,
            AuditAction::CollectionRecorded,
            "loan",
            loan.id,
            serde_json::to_value(&before).ok(),
            serde_json::to_value(&after).ok(),
            request.remarks.clone(),
        )
        .await
        {
            tracing::warn!(loan_id = %loan.id, error = %e, "audit write failed for collection");
        }

        session.commit().await?;

        self.cache.invalidate_prefix(&format!("loan:{}", loan.id)).await;
        self.cache
            .invalidate_prefix(&format!("loans:customer:{}", after.customer_id))
            .await;
        self.cache.invalidate_prefix("dashboard:").await;

        Ok(collection)
    }
}

#[async_trait]
impl<U: UnitOfWork<Postgres> + Send + Sync> CollectionService for CollectionServiceImpl<U> {
    async fn record_collection(&self, actor_id: Uuid, request: RecordCollectionRequest) -> LoanCoreResult<Collection> {
        collection_validation::validate_amount(request.amount)?;

        match self.try_record_collection(actor_id, &request).await {
            Ok(collection) => Ok(collection),
            Err(LoanCoreError::TransientFailure { entity }) => {
                tracing::warn!(entity = %entity, "retrying collection once after storage conflict");
                self.try_record_collection(actor_id, &request).await
            }
            Err(e) => Err(e),
        }
    }

    async fn get_collection(&self, actor_id: Uuid, collection_id: Uuid) -> LoanCoreResult<Collection> {
        let session = self.uow.begin().await?;
        let found = session.collections().find_by_id(collection_id).await?;
        let model = match found {
            Some(c) => c,
            None => {
                session.rollback().await?;
                return Err(LoanCoreError::Internal(format!("collection {collection_id} not found")));
            }
        };
        let loan = session.loans().find_by_id(model.loan_id).await?;
        if let Some(loan) = loan {
            Self::authorize(&session, actor_id, loan.customer_id).await.or_else(|e| {
                if matches!(e, LoanCoreError::NotAuthorized(_)) {
                    Err(e)
                } else {
                    Ok(())
                }
            })?;
        }
        session.rollback().await?;
        Ok(collection_mapper::to_domain(&model))
    }

    async fn list_collections_for_loan(
        &self,
        actor_id: Uuid,
        loan_id: Uuid,
        page: u32,
        limit: u32,
    ) -> LoanCoreResult<Vec<Collection>> {
        let session = self.uow.begin().await?;
        let loan = match session.loans().find_by_id(loan_id).await? {
            Some(loan) => loan,
            None => {
                session.rollback().await?;
                return Err(LoanCoreError::LoanNotFound(loan_id));
            }
        };
        if let Err(e) = Self::authorize(&session, actor_id, loan.customer_id).await {
            session.rollback().await?;
            return Err(e);
        }
        let collections = session.collections().list_for_loan(loan_id).await?;
        session.rollback().await?;
        let limit = limit.clamp(1, 200) as usize;
        let offset = (page.max(1) as usize - 1) * limit;
        Ok(collections
            .iter()
            .skip(offset)
            .take(limit)
            .map(collection_mapper::to_domain)
            .collect())
    }
}
