use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use heapless::String as HeaplessString;
use loancore_api::calculator;
use loancore_api::{
    AuditAction, ChargeInput, CreateLoanRequest, Loan, LoanCoreError, LoanCoreResult, LoanService,
    LoanStatus, LoanSummaryView, Role, TopUpRequest,
};
use loancore_db::{
    AgentAssignmentRepository, CollectionRepository, CustomerRepository, LoanChargeModel, LoanModel,
    LoanRepository, ScheduleRepository, UnitOfWork, UnitOfWorkSession, UserRepository,
};
use loancore_db_postgres::CacheAdapter;
use rust_decimal::Decimal;
use sqlx::Postgres;
use std::sync::Arc;
use uuid::Uuid;

use crate::mappers::loan_mapper;
use crate::services::audit_service_impl::AuditServiceImpl;
use crate::validation::loan_validation;

/// Loan lifecycle: creation through closure. Modeled on the
/// constructor-injected-dependency shape used throughout this workspace's
/// service layer; the only collaborators a loan mutation needs are the unit
/// of work (for the transactional repository access) and the cache adapter
/// (for the post-commit, best-effort invalidation every mutation performs).
pub struct LoanServiceImpl<U: UnitOfWork<Postgres>> {
    uow: Arc<U>,
    cache: Arc<CacheAdapter>,
}

impl<U: UnitOfWork<Postgres>> LoanServiceImpl<U> {
    pub fn new(uow: Arc<U>, cache: Arc<CacheAdapter>) -> Self {
        Self { uow, cache }
    }

    fn require_manager_or_admin(role: Role) -> LoanCoreResult<()> {
        match role {
            Role::Admin | Role::Manager => Ok(()),
            _ => Err(LoanCoreError::NotAuthorized(
                "admin or manager role required for loan mutations".to_string(),
            )),
        }
    }

    async fn actor_role<S: UnitOfWorkSession<Postgres>>(session: &S, actor_id: Uuid) -> LoanCoreResult<Role> {
        let user = session
            .users()
            .find_by_id(actor_id)
            .await?
            .ok_or(LoanCoreError::UserNotFound(actor_id))?;
        Ok(user.role)
    }

    fn remarks_field(remarks: &Option<String>) -> LoanCoreResult<Option<HeaplessString<500>>> {
        remarks
            .as_deref()
            .map(HeaplessString::try_from)
            .transpose()
            .map_err(|_| LoanCoreError::ValidationError {
                field: "remarks".to_string(),
                message: "remarks too long".to_string(),
            })
    }

    fn charge_models(loan_id: Uuid, charges: &[ChargeInput]) -> Vec<LoanChargeModel> {
        charges
            .iter()
            .map(|c| LoanChargeModel {
                id: Uuid::new_v4(),
                loan_id,
                charge_type: c.charge_type,
                amount: c.amount,
            })
            .collect()
    }

    async fn next_due_date<S: UnitOfWorkSession<Postgres>>(
        session: &S,
        loan_id: Uuid,
    ) -> LoanCoreResult<(Option<NaiveDate>, i64)> {
        let next_unpaid = session.schedules().find_next_unpaid(loan_id).await?;
        match next_unpaid {
            Some(row) => {
                let today = Utc::now().date_naive();
                let days_past_due = (today - row.due_date).num_days().max(0);
                Ok((Some(row.due_date), days_past_due))
            }
            None => Ok((None, 0)),
        }
    }
}

#[async_trait]
impl<U: UnitOfWork<Postgres> + Send + Sync> LoanService for LoanServiceImpl<U> {
    async fn create_loan(&self, actor_id: Uuid, request: CreateLoanRequest) -> LoanCoreResult<Loan> {
        let session = self.uow.begin().await?;

        let role = match Self::actor_role(&session, actor_id).await {
            Ok(role) => role,
            Err(e) => {
                session.rollback().await?;
                return Err(e);
            }
        };
        if let Err(e) = Self::require_manager_or_admin(role) {
            session.rollback().await?;
            return Err(e);
        }

        if session.customers().find_by_user_id(request.customer_id).await?.is_none() {
            session.rollback().await?;
            return Err(LoanCoreError::CustomerNotFound(request.customer_id));
        }

        let charges = request.charges.clone().unwrap_or_default();
        let charges_total = match loan_validation::validate_charges(request.principal, &charges) {
            Ok(total) => total,
            Err(e) => {
                session.rollback().await?;
                return Err(e);
            }
        };

        let installment = match calculator::installment_amount(
            request.principal,
            request.interest_rate,
            request.tenure_installments,
            request.frequency,
        ) {
            Ok(v) => v,
            Err(e) => {
                session.rollback().await?;
                return Err(e);
            }
        };
        let total_interest =
            calculator::total_interest(installment, request.tenure_installments, request.principal);
        let total_amount = request.principal + total_interest;
        let disbursed_amount = request.principal - charges_total;

        let remarks = match Self::remarks_field(&request.remarks) {
            Ok(r) => r,
            Err(e) => {
                session.rollback().await?;
                return Err(e);
            }
        };

        let now = Utc::now();
        let loan_number = session.loans().next_loan_number().await?;
        let loan_id = Uuid::new_v4();

        let model = LoanModel {
            id: loan_id,
            loan_number,
            principal: request.principal,
            annual_interest_percent: request.interest_rate,
            tenure_installments: request.tenure_installments as i32,
            frequency: request.frequency,
            repayment_type: request.repayment_type,
            grace_period_days: request.grace_period_days.unwrap_or(0) as i32,
            late_fee_daily_percent: request.late_fee_daily_percent.unwrap_or(Decimal::ZERO),
            penalty_percent: request.penalty_percent.unwrap_or(Decimal::ZERO),
            installment_amount: installment,
            total_interest,
            total_amount,
            disbursed_amount,
            disbursed_at: None,
            start_date: request.start_date,
            end_date: None,
            outstanding_principal: request.principal,
            outstanding_interest: total_interest,
            total_collected: Decimal::ZERO,
            total_late_fees_paid: Decimal::ZERO,
            total_penalties_paid: Decimal::ZERO,
            status: LoanStatus::Pending,
            closed_at: None,
            is_top_up: false,
            original_loan_id: None,
            top_up_amount: None,
            customer_id: request.customer_id,
            created_by: actor_id,
            remarks,
            created_at: now,
            last_updated_at: now,
        };

        let created = session.loans().create(&model).await?;

        let charge_models = Self::charge_models(created.id, &charges);
        if !charge_models.is_empty() {
            session.loans().create_charges(&charge_models).await?;
        }

        let loan = loan_mapper::to_domain(&created);
        if let Err(e) = AuditServiceImpl::<U>::record_in(
            &session,
            actor_id,
            AuditAction::LoanCreated,
            "loan",
            created.id,
            None,
            serde_json::to_value(&loan).ok(),
            request.remarks.clone(),
        )
        .await
        {
            tracing::warn!(loan_id = %created.id, error = %e, "audit write failed for loan creation");
        }

        session.commit().await?;

        self.cache
            .invalidate_prefix(&format!("loans:customer:{}", loan.customer_id)).await;
        self.cache.invalidate_prefix("dashboard:").await;

        Ok(loan)
    }

    async fn approve(&self, actor_id: Uuid, loan_id: Uuid) -> LoanCoreResult<Loan> {
        let session = self.uow.begin().await?;

        let role = Self::actor_role(&session, actor_id).await?;
        if let Err(e) = Self::require_manager_or_admin(role) {
            session.rollback().await?;
            return Err(e);
        }

        let existing = session.loans().find_by_id(loan_id).await?;
        let existing = match existing {
            Some(loan) => loan,
            None => {
                session.rollback().await?;
                return Err(LoanCoreError::LoanNotFound(loan_id));
            }
        };
        if existing.status != LoanStatus::Pending {
            session.rollback().await?;
            return Err(LoanCoreError::InvalidLoanState {
                loan_id,
                status: existing.status.to_string(),
            });
        }

        // Approval does not itself change the persisted loan state — the
        // pending -> active transition happens on disbursement. This call
        // exists to put a human sign-off on the audit trail before that
        // happens.
        let loan = loan_mapper::to_domain(&existing);
        if let Err(e) = AuditServiceImpl::<U>::record_in(
            &session,
            actor_id,
            AuditAction::LoanApproved,
            "loan",
            loan_id,
            None,
            None,
            None,
        )
        .await
        {
            tracing::warn!(loan_id = %loan_id, error = %e, "audit write failed for loan approval");
        }

        session.commit().await?;
        Ok(loan)
    }

    async fn disburse(
        &self,
        actor_id: Uuid,
        loan_id: Uuid,
        disbursed_amount: Option<Decimal>,
        start_date: NaiveDate,
    ) -> LoanCoreResult<Loan> {
        let session = self.uow.begin().await?;

        let role = Self::actor_role(&session, actor_id).await?;
        if let Err(e) = Self::require_manager_or_admin(role) {
            session.rollback().await?;
            return Err(e);
        }

        let mut existing = match session.loans().find_by_id_for_update(loan_id).await? {
            Some(loan) => loan,
            None => {
                session.rollback().await?;
                return Err(LoanCoreError::LoanNotFound(loan_id));
            }
        };
        if existing.status != LoanStatus::Pending {
            session.rollback().await?;
            return Err(LoanCoreError::InvalidLoanState {
                loan_id,
                status: existing.status.to_string(),
            });
        }

        // `existing.disbursed_amount` already holds `principal - sum(charges)`
        // as computed at creation. An explicit override is only accepted if
        // it matches that figure exactly — anything else would break the
        // `principal = disbursed_amount + sum(charges)` loan invariant, since
        // charges cannot be re-struck at disbursement time.
        let amount = disbursed_amount.unwrap_or(existing.disbursed_amount);
        if amount != existing.disbursed_amount {
            session.rollback().await?;
            return Err(LoanCoreError::InvalidTerms(format!(
                "disbursedAmount must equal principal minus charges ({})",
                existing.disbursed_amount
            )));
        }

        let before = loan_mapper::to_domain(&existing);
        let now = Utc::now();
        existing.disbursed_amount = amount;
        existing.disbursed_at = Some(now);
        existing.start_date = Some(start_date);
        existing.end_date = Some(calculator::advance_due_date(
            start_date,
            existing.tenure_installments as u32,
            existing.frequency,
        ));
        existing.status = LoanStatus::Active;
        existing.last_updated_at = now;

        let updated = session.loans().update(&existing).await?;
        let after = loan_mapper::to_domain(&updated);

        if let Err(e) = AuditServiceImpl::<U>::record_in(
            &session,
            actor_id,
            AuditAction::LoanDisbursed,
            "loan",
            loan_id,
            serde_json::to_value(&before).ok(),
            serde_json::to_value(&after).ok(),
            None,
        )
        .await
        {
            tracing::warn!(loan_id = %loan_id, error = %e, "audit write failed for loan disbursement");
        }

        session.commit().await?;

        self.cache.invalidate_prefix(&format!("loan:{loan_id}")).await;
        self.cache
            .invalidate_prefix(&format!("loans:customer:{}", after.customer_id)).await;
        self.cache.invalidate_prefix("dashboard:").await;

        // The schedule generator's polling query picks up newly-active,
        // not-yet-scheduled loans on its own; there is no separate queue
        // submission call to make here.
        Ok(after)
    }

    async fn close(&self, actor_id: Uuid, loan_id: Uuid) -> LoanCoreResult<Loan> {
        let session = self.uow.begin().await?;
        let role = Self::actor_role(&session, actor_id).await?;
        if let Err(e) = Self::require_manager_or_admin(role) {
            session.rollback().await?;
            return Err(e);
        }

        let mut existing = match session.loans().find_by_id_for_update(loan_id).await? {
            Some(loan) => loan,
            None => {
                session.rollback().await?;
                return Err(LoanCoreError::LoanNotFound(loan_id));
            }
        };
        if existing.status != LoanStatus::Active {
            session.rollback().await?;
            return Err(LoanCoreError::InvalidLoanState {
                loan_id,
                status: existing.status.to_string(),
            });
        }
        if existing.outstanding_principal != Decimal::ZERO || existing.outstanding_interest != Decimal::ZERO {
            session.rollback().await?;
            return Err(LoanCoreError::InvalidLoanState {
                loan_id,
                status: "outstanding balance is not zero".to_string(),
            });
        }

        let before = loan_mapper::to_domain(&existing);
        existing.status = LoanStatus::Closed;
        existing.closed_at = Some(Utc::now());
        existing.last_updated_at = Utc::now();
        let updated = session.loans().update(&existing).await?;
        let after = loan_mapper::to_domain(&updated);

        if let Err(e) = AuditServiceImpl::<U>::record_in(
            &session,
            actor_id,
            AuditAction::LoanClosed,
            "loan",
            loan_id,
            serde_json::to_value(&before).ok(),
            serde_json::to_value(&after).ok(),
            None,
        )
        .await
        {
            tracing::warn!(loan_id = %loan_id, error = %e, "audit write failed for loan closure");
        }

        session.commit().await?;
        self.cache.invalidate_prefix(&format!("loan:{loan_id}")).await;
        self.cache.invalidate_prefix("dashboard:").await;
        Ok(after)
    }

    async fn preclose(&self, actor_id: Uuid, loan_id: Uuid, as_of: NaiveDate) -> LoanCoreResult<Loan> {
        let session = self.uow.begin().await?;
        let role = Self::actor_role(&session, actor_id).await?;
        if let Err(e) = Self::require_manager_or_admin(role) {
            session.rollback().await?;
            return Err(e);
        }

        let mut existing = match session.loans().find_by_id_for_update(loan_id).await? {
            Some(loan) => loan,
            None => {
                session.rollback().await?;
                return Err(LoanCoreError::LoanNotFound(loan_id));
            }
        };
        if existing.status != LoanStatus::Active {
            session.rollback().await?;
            return Err(LoanCoreError::InvalidLoanState {
                loan_id,
                status: existing.status.to_string(),
            });
        }
        if session.collections().has_unpaid_dues(loan_id).await? {
            session.rollback().await?;
            return Err(LoanCoreError::HasOutstandingDues { loan_id });
        }

        let next_unpaid = session.schedules().find_next_unpaid(loan_id).await?;
        let accrued_interest_current_period = next_unpaid.map(|r| r.interest_due).unwrap_or(Decimal::ZERO);
        let preclosure_amount = calculator::preclosure_amount(
            existing.outstanding_principal,
            accrued_interest_current_period,
            existing.penalty_percent,
        );

        let before = loan_mapper::to_domain(&existing);
        existing.status = LoanStatus::Preclosed;
        existing.closed_at = Some(Utc::now());
        existing.total_collected += preclosure_amount;
        existing.outstanding_principal = Decimal::ZERO;
        existing.outstanding_interest = Decimal::ZERO;
        existing.last_updated_at = Utc::now();
        let updated = session.loans().update(&existing).await?;
        let after = loan_mapper::to_domain(&updated);

        if let Err(e) = AuditServiceImpl::<U>::record_in(
            &session,
            actor_id,
            AuditAction::LoanPreclosed,
            "loan",
            loan_id,
            serde_json::to_value(&before).ok(),
            serde_json::to_value(&after).ok(),
            Some(format!("preclosure amount {preclosure_amount} settled as of {as_of}")),
        )
        .await
        {
            tracing::warn!(loan_id = %loan_id, error = %e, "audit write failed for loan preclosure");
        }

        session.commit().await?;
        self.cache.invalidate_prefix(&format!("loan:{loan_id}")).await;
        self.cache.invalidate_prefix("dashboard:").await;
        Ok(after)
    }

    async fn mark_defaulted(&self, actor_id: Uuid, loan_id: Uuid, reason: Option<String>) -> LoanCoreResult<Loan> {
        let session = self.uow.begin().await?;
        let role = Self::actor_role(&session, actor_id).await?;
        if let Err(e) = Self::require_manager_or_admin(role) {
            session.rollback().await?;
            return Err(e);
        }

        let mut existing = match session.loans().find_by_id_for_update(loan_id).await? {
            Some(loan) => loan,
            None => {
                session.rollback().await?;
                return Err(LoanCoreError::LoanNotFound(loan_id));
            }
        };
        if existing.status != LoanStatus::Active {
            session.rollback().await?;
            return Err(LoanCoreError::InvalidLoanState {
                loan_id,
                status: existing.status.to_string(),
            });
        }

        let before = loan_mapper::to_domain(&existing);
        // Defaulting does not zero the ledger: the outstanding amounts stay
        // on the books as the basis for whatever recovery process follows.
        existing.status = LoanStatus::Defaulted;
        existing.closed_at = Some(Utc::now());
        existing.last_updated_at = Utc::now();
        let updated = session.loans().update(&existing).await?;
        let after = loan_mapper::to_domain(&updated);

        if let Err(e) = AuditServiceImpl::<U>::record_in(
            &session,
            actor_id,
            AuditAction::LoanDefaulted,
            "loan",
            loan_id,
            serde_json::to_value(&before).ok(),
            serde_json::to_value(&after).ok(),
            reason,
        )
        .await
        {
            tracing::warn!(loan_id = %loan_id, error = %e, "audit write failed for loan default");
        }

        session.commit().await?;
        self.cache.invalidate_prefix(&format!("loan:{loan_id}")).await;
        self.cache.invalidate_prefix("dashboard:").await;
        Ok(after)
    }

    async fn top_up(&self, actor_id: Uuid, request: TopUpRequest) -> LoanCoreResult<Loan> {
        let session = self.uow.begin().await?;
        let role = Self::actor_role(&session, actor_id).await?;
        if let Err(e) = Self::require_manager_or_admin(role) {
            session.rollback().await?;
            return Err(e);
        }

        let mut original = match session.loans().find_by_id_for_update(request.loan_id).await? {
            Some(loan) => loan,
            None => {
                session.rollback().await?;
                return Err(LoanCoreError::LoanNotFound(request.loan_id));
            }
        };
        if original.status != LoanStatus::Active {
            session.rollback().await?;
            return Err(LoanCoreError::InvalidLoanState {
                loan_id: request.loan_id,
                status: original.status.to_string(),
            });
        }
        if session.collections().has_unpaid_dues(request.loan_id).await? {
            session.rollback().await?;
            return Err(LoanCoreError::HasOutstandingDues {
                loan_id: request.loan_id,
            });
        }

        let charges = request.charges.clone().unwrap_or_default();
        let new_charges_total: Decimal = charges.iter().map(|c| c.amount).sum();
        let new_tenure = request.new_tenure.unwrap_or(original.tenure_installments as u32);
        let new_rate = request.new_interest_rate.unwrap_or(original.annual_interest_percent);

        let calc = match calculator::recompute_top_up(
            original.outstanding_principal,
            request.top_up_amount,
            new_tenure,
            new_rate,
            original.frequency,
            original.installment_amount,
            new_charges_total,
        ) {
            Ok(c) => c,
            Err(e) => {
                session.rollback().await?;
                return Err(e);
            }
        };

        let total_interest =
            calculator::total_interest(calc.new_installment, new_tenure, calc.new_principal);
        let now = Utc::now();

        let original_before = loan_mapper::to_domain(&original);
        original.status = LoanStatus::Preclosed;
        original.closed_at = Some(now);
        original.outstanding_principal = Decimal::ZERO;
        original.outstanding_interest = Decimal::ZERO;
        original.last_updated_at = now;

        let new_loan_id = Uuid::new_v4();
        original.remarks = HeaplessString::try_from(format!("Preclosed by top-up into loan {new_loan_id}").as_str()).ok();
        let original_updated = session.loans().update(&original).await?;
        let original_after = loan_mapper::to_domain(&original_updated);

        let new_loan_number = session.loans().next_loan_number().await?;
        let remarks = match Self::remarks_field(&request.remarks) {
            Ok(r) => r,
            Err(e) => {
                session.rollback().await?;
                return Err(e);
            }
        };
        let new_model = LoanModel {
            id: new_loan_id,
            loan_number: new_loan_number,
            principal: calc.new_principal,
            annual_interest_percent: new_rate,
            tenure_installments: new_tenure as i32,
            frequency: original.frequency,
            repayment_type: original.repayment_type,
            grace_period_days: original.grace_period_days,
            late_fee_daily_percent: original.late_fee_daily_percent,
            penalty_percent: original.penalty_percent,
            installment_amount: calc.new_installment,
            total_interest,
            total_amount: calc.new_principal + total_interest,
            disbursed_amount: calc.disbursed_to_customer,
            disbursed_at: Some(now),
            start_date: Some(now.date_naive()),
            end_date: Some(calculator::advance_due_date(now.date_naive(), new_tenure, original.frequency)),
            outstanding_principal: calc.new_principal,
            outstanding_interest: total_interest,
            total_collected: Decimal::ZERO,
            total_late_fees_paid: Decimal::ZERO,
            total_penalties_paid: Decimal::ZERO,
            status: LoanStatus::Active,
            closed_at: None,
            is_top_up: true,
            original_loan_id: Some(request.loan_id),
            top_up_amount: Some(request.top_up_amount),
            customer_id: original.customer_id,
            created_by: actor_id,
            remarks,
            created_at: now,
            last_updated_at: now,
        };
        let new_created = session.loans().create(&new_model).await?;
        let new_charge_models = Self::charge_models(new_created.id, &charges);
        if !new_charge_models.is_empty() {
            session.loans().create_charges(&new_charge_models).await?;
        }
        let new_loan = loan_mapper::to_domain(&new_created);

        if let Err(e) = AuditServiceImpl::<U>::record_in(
            &session,
            actor_id,
            AuditAction::LoanToppedUp,
            "loan",
            request.loan_id,
            serde_json::to_value(&original_before).ok(),
            serde_json::to_value(&original_after).ok(),
            request.remarks.clone(),
        )
        .await
        {
            tracing::warn!(loan_id = %request.loan_id, error = %e, "audit write failed for top-up");
        }

        session.commit().await?;

        self.cache
            .invalidate_prefix(&format!("loans:customer:{}", new_loan.customer_id)).await;
        self.cache.invalidate_prefix(&format!("loan:{}", request.loan_id)).await;
        self.cache.invalidate_prefix("dashboard:").await;

        Ok(new_loan)
    }

    async fn get_loan(&self, actor_id: Uuid, loan_id: Uuid) -> LoanCoreResult<LoanSummaryView> {
        let session = self.uow.begin().await?;
        let role = Self::actor_role(&session, actor_id).await?;

        let loan_model = match session.loans().find_by_id(loan_id).await? {
            Some(loan) => loan,
            None => {
                session.rollback().await?;
                return Err(LoanCoreError::LoanNotFound(loan_id));
            }
        };

        if !matches!(role, Role::Admin | Role::Manager) {
            let assignment = session
                .agent_assignments()
                .find_active_for_customer(loan_model.customer_id)
                .await?;
            let permitted = match role {
                Role::Agent => assignment.is_some_and(|a| a.is_active && a.agent_user_id == actor_id),
                Role::Customer => actor_id == loan_model.customer_id,
                Role::Admin | Role::Manager => true,
            };
            if !permitted {
                session.rollback().await?;
                return Err(LoanCoreError::NotAuthorized(
                    "no access to this loan".to_string(),
                ));
            }
        }

        let (next_due_date, days_past_due) = Self::next_due_date(&session, loan_id).await?;
        session.rollback().await?;

        Ok(LoanSummaryView {
            loan: loan_mapper::to_domain(&loan_model),
            next_due_date,
            days_past_due,
        })
    }

    async fn list_loans_for_customer(
        &self,
        actor_id: Uuid,
        customer_id: Uuid,
        page: u32,
        limit: u32,
    ) -> LoanCoreResult<Vec<LoanSummaryView>> {
        let limit = limit.clamp(1, 200) as i64;
        let page = page.max(1) as i64;
        let offset = (page - 1) * limit;
        let session = self.uow.begin().await?;
        let role = Self::actor_role(&session, actor_id).await?;

        if !matches!(role, Role::Admin | Role::Manager) {
            let assignment = session
                .agent_assignments()
                .find_active_for_customer(customer_id)
                .await?;
            let permitted = match role {
                Role::Agent => assignment.is_some_and(|a| a.is_active && a.agent_user_id == actor_id),
                Role::Customer => actor_id == customer_id,
                Role::Admin | Role::Manager => true,
            };
            if !permitted {
                session.rollback().await?;
                return Err(LoanCoreError::NotAuthorized(
                    "no access to this customer's loans".to_string(),
                ));
            }
        }

        let loans = session.loans().list_for_customer(customer_id, limit, offset).await?;
        let mut views = Vec::with_capacity(loans.len());
        for loan_model in &loans {
            let (next_due_date, days_past_due) = Self::next_due_date(&session, loan_model.id).await?;
            views.push(LoanSummaryView {
                loan: loan_mapper::to_domain(loan_model),
                next_due_date,
                days_past_due,
            });
        }
        session.rollback().await?;
        Ok(views)
    }
}
