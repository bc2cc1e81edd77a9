//! Service-level integration tests against in-memory mock repositories,
//! exercising the full loan lifecycle without requiring a live Postgres
//! connection.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use loancore_api::{
    CollectionService, CreateLoanRequest, Frequency, LoanService, LoanStatus, PaymentMethod,
    RecordCollectionRequest, RepaymentType, Role, TopUpRequest,
};
use loancore_db::{
    AgentAssignmentModel, AgentAssignmentRepository, AuditEntryModel, AuditRepository,
    BorrowingModel, CapitalLedgerRepository, CollectionModel, CollectionRepository, CustomerModel,
    CustomerRepository, InvestmentModel, LateFeeModel, LoanChargeModel, LoanModel, LoanRepository,
    PenaltyModel, ScheduleRepository, ScheduleRowModel, UnitOfWork, UnitOfWorkSession, UserModel,
    UserRepository,
};
use loancore_db_postgres::CacheAdapter;
use loancore_logic::{CollectionServiceImpl, LoanServiceImpl};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sqlx::Postgres;
use uuid::Uuid;

/// All in-memory tables a mock unit-of-work round trips through. Shared via
/// `Arc` between the `MockUnitOfWork` and every `MockSession` it hands out,
/// so writes in one transaction are visible to the next.
#[derive(Default)]
struct MockStore {
    loans: Mutex<HashMap<Uuid, LoanModel>>,
    loan_charges: Mutex<HashMap<Uuid, Vec<LoanChargeModel>>>,
    schedule_rows: Mutex<HashMap<Uuid, Vec<ScheduleRowModel>>>,
    collections: Mutex<HashMap<Uuid, CollectionModel>>,
    late_fees: Mutex<HashMap<Uuid, LateFeeModel>>,
    penalties: Mutex<HashMap<Uuid, PenaltyModel>>,
    users: Mutex<HashMap<Uuid, UserModel>>,
    customers: Mutex<HashMap<Uuid, CustomerModel>>,
    agent_assignments: Mutex<HashMap<Uuid, AgentAssignmentModel>>,
    audit_entries: Mutex<Vec<AuditEntryModel>>,
    investments: Mutex<Vec<InvestmentModel>>,
    borrowings: Mutex<Vec<BorrowingModel>>,
    loan_number_seq: Mutex<i64>,
}

#[derive(Clone, Default)]
struct MockRepo(Arc<MockStore>);

#[async_trait]
impl LoanRepository<Postgres> for MockRepo {
    async fn create(&self, loan: &LoanModel) -> Result<LoanModel, sqlx::Error> {
        self.0.loans.lock().unwrap().insert(loan.id, loan.clone());
        Ok(loan.clone())
    }

    async fn update(&self, loan: &LoanModel) -> Result<LoanModel, sqlx::Error> {
        self.0.loans.lock().unwrap().insert(loan.id, loan.clone());
        Ok(loan.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<LoanModel>, sqlx::Error> {
        Ok(self.0.loans.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_id_for_update(&self, id: Uuid) -> Result<Option<LoanModel>, sqlx::Error> {
        self.find_by_id(id).await
    }

    async fn find_by_loan_number(&self, loan_number: i64) -> Result<Option<LoanModel>, sqlx::Error> {
        Ok(self
            .0
            .loans
            .lock()
            .unwrap()
            .values()
            .find(|l| l.loan_number == loan_number)
            .cloned())
    }

    async fn list_for_customer(
        &self,
        customer_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<LoanModel>, sqlx::Error> {
        let mut loans: Vec<LoanModel> = self
            .0
            .loans
            .lock()
            .unwrap()
            .values()
            .filter(|l| l.customer_id == customer_id)
            .cloned()
            .collect();
        loans.sort_by_key(|l| l.created_at);
        Ok(loans.into_iter().skip(offset as usize).take(limit as usize).collect())
    }

    async fn count_for_customer(&self, customer_id: Uuid) -> Result<i64, sqlx::Error> {
        Ok(self
            .0
            .loans
            .lock()
            .unwrap()
            .values()
            .filter(|l| l.customer_id == customer_id)
            .count() as i64)
    }

    async fn next_loan_number(&self) -> Result<i64, sqlx::Error> {
        let mut seq = self.0.loan_number_seq.lock().unwrap();
        *seq += 1;
        Ok(*seq)
    }

    async fn create_charges(&self, charges: &[LoanChargeModel]) -> Result<(), sqlx::Error> {
        if let Some(first) = charges.first() {
            self.0
                .loan_charges
                .lock()
                .unwrap()
                .entry(first.loan_id)
                .or_default()
                .extend_from_slice(charges);
        }
        Ok(())
    }

    async fn find_charges_for_loan(&self, loan_id: Uuid) -> Result<Vec<LoanChargeModel>, sqlx::Error> {
        Ok(self.0.loan_charges.lock().unwrap().get(&loan_id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl ScheduleRepository<Postgres> for MockRepo {
    async fn insert_rows(&self, rows: &[ScheduleRowModel]) -> Result<u64, sqlx::Error> {
        if rows.is_empty() {
            return Ok(0);
        }
        let loan_id = rows[0].loan_id;
        let mut table = self.0.schedule_rows.lock().unwrap();
        let existing = table.entry(loan_id).or_default();
        let mut inserted = 0;
        for row in rows {
            if existing.iter().any(|r| r.installment_number == row.installment_number) {
                continue;
            }
            existing.push(row.clone());
            inserted += 1;
        }
        Ok(inserted)
    }

    async fn find_for_loan(&self, loan_id: Uuid) -> Result<Vec<ScheduleRowModel>, sqlx::Error> {
        Ok(self.0.schedule_rows.lock().unwrap().get(&loan_id).cloned().unwrap_or_default())
    }

    async fn find_row(
        &self,
        loan_id: Uuid,
        installment_number: i32,
    ) -> Result<Option<ScheduleRowModel>, sqlx::Error> {
        Ok(self
            .0
            .schedule_rows
            .lock()
            .unwrap()
            .get(&loan_id)
            .and_then(|rows| rows.iter().find(|r| r.installment_number == installment_number).cloned()))
    }

    async fn find_next_unpaid(&self, loan_id: Uuid) -> Result<Option<ScheduleRowModel>, sqlx::Error> {
        let table = self.0.schedule_rows.lock().unwrap();
        let mut rows: Vec<ScheduleRowModel> = table.get(&loan_id).cloned().unwrap_or_default();
        rows.sort_by_key(|r| r.installment_number);
        Ok(rows.into_iter().find(|r| r.status != loancore_api::InstallmentStatus::Paid))
    }

    async fn update_row(&self, row: &ScheduleRowModel) -> Result<ScheduleRowModel, sqlx::Error> {
        let mut table = self.0.schedule_rows.lock().unwrap();
        let rows = table.entry(row.loan_id).or_default();
        if let Some(existing) = rows.iter_mut().find(|r| r.id == row.id) {
            *existing = row.clone();
        }
        Ok(row.clone())
    }

    async fn loans_missing_schedule(&self, limit: i64) -> Result<Vec<Uuid>, sqlx::Error> {
        let loans = self.0.loans.lock().unwrap();
        let schedules = self.0.schedule_rows.lock().unwrap();
        let mut ids: Vec<Uuid> = loans
            .values()
            .filter(|l| l.status == LoanStatus::Active)
            .filter(|l| schedules.get(&l.id).map(|r| r.is_empty()).unwrap_or(true))
            .map(|l| l.id)
            .collect();
        ids.truncate(limit as usize);
        Ok(ids)
    }
}

#[async_trait]
impl CollectionRepository<Postgres> for MockRepo {
    async fn create(&self, collection: &CollectionModel) -> Result<CollectionModel, sqlx::Error> {
        self.0.collections.lock().unwrap().insert(collection.id, collection.clone());
        Ok(collection.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<CollectionModel>, sqlx::Error> {
        Ok(self.0.collections.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_receipt_number(
        &self,
        receipt_number: &str,
    ) -> Result<Option<CollectionModel>, sqlx::Error> {
        Ok(self
            .0
            .collections
            .lock()
            .unwrap()
            .values()
            .find(|c| c.receipt_number.as_str() == receipt_number)
            .cloned())
    }

    async fn list_for_loan(&self, loan_id: Uuid) -> Result<Vec<CollectionModel>, sqlx::Error> {
        let mut collections: Vec<CollectionModel> = self
            .0
            .collections
            .lock()
            .unwrap()
            .values()
            .filter(|c| c.loan_id == loan_id)
            .cloned()
            .collect();
        collections.sort_by_key(|c| c.created_at);
        Ok(collections)
    }

    async fn create_late_fee(&self, fee: &LateFeeModel) -> Result<LateFeeModel, sqlx::Error> {
        self.0.late_fees.lock().unwrap().insert(fee.id, fee.clone());
        Ok(fee.clone())
    }

    async fn find_unpaid_late_fees(&self, loan_id: Uuid) -> Result<Vec<LateFeeModel>, sqlx::Error> {
        Ok(self
            .0
            .late_fees
            .lock()
            .unwrap()
            .values()
            .filter(|f| f.loan_id == loan_id && !f.paid)
            .cloned()
            .collect())
    }

    async fn apply_late_fee_payment(&self, id: Uuid, amount: rust_decimal::Decimal) -> Result<(), sqlx::Error> {
        if let Some(fee) = self.0.late_fees.lock().unwrap().get_mut(&id) {
            fee.paid_amount += amount;
            fee.paid = fee.paid_amount >= fee.amount;
        }
        Ok(())
    }

    async fn create_penalty(&self, penalty: &PenaltyModel) -> Result<PenaltyModel, sqlx::Error> {
        self.0.penalties.lock().unwrap().insert(penalty.id, penalty.clone());
        Ok(penalty.clone())
    }

    async fn find_unpaid_penalties(&self, loan_id: Uuid) -> Result<Vec<PenaltyModel>, sqlx::Error> {
        Ok(self
            .0
            .penalties
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.loan_id == loan_id && !p.paid)
            .cloned()
            .collect())
    }

    async fn apply_penalty_payment(&self, id: Uuid, amount: rust_decimal::Decimal) -> Result<(), sqlx::Error> {
        if let Some(penalty) = self.0.penalties.lock().unwrap().get_mut(&id) {
            penalty.paid_amount += amount;
            penalty.paid = penalty.paid_amount >= penalty.amount;
        }
        Ok(())
    }

    async fn has_unpaid_dues(&self, loan_id: Uuid) -> Result<bool, sqlx::Error> {
        let fees = self.0.late_fees.lock().unwrap().values().any(|f| f.loan_id == loan_id && !f.paid);
        let penalties = self.0.penalties.lock().unwrap().values().any(|p| p.loan_id == loan_id && !p.paid);
        Ok(fees || penalties)
    }

    async fn find_overdue_loan_ids(&self, as_of: NaiveDate) -> Result<Vec<Uuid>, sqlx::Error> {
        let schedules = self.0.schedule_rows.lock().unwrap();
        Ok(schedules
            .iter()
            .filter(|(_, rows)| {
                rows.iter()
                    .any(|r| r.status != loancore_api::InstallmentStatus::Paid && r.due_date < as_of)
            })
            .map(|(loan_id, _)| *loan_id)
            .collect())
    }
}

#[async_trait]
impl UserRepository<Postgres> for MockRepo {
    async fn create(&self, user: &UserModel) -> Result<UserModel, sqlx::Error> {
        self.0.users.lock().unwrap().insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn update(&self, user: &UserModel) -> Result<UserModel, sqlx::Error> {
        self.0.users.lock().unwrap().insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserModel>, sqlx::Error> {
        Ok(self.0.users.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, sqlx::Error> {
        Ok(self.0.users.lock().unwrap().values().find(|u| u.email.as_str() == email).cloned())
    }

    async fn deactivate(&self, id: Uuid) -> Result<(), sqlx::Error> {
        if let Some(user) = self.0.users.lock().unwrap().get_mut(&id) {
            user.is_active = false;
        }
        Ok(())
    }
}

#[async_trait]
impl CustomerRepository<Postgres> for MockRepo {
    async fn create(&self, customer: &CustomerModel) -> Result<CustomerModel, sqlx::Error> {
        self.0.customers.lock().unwrap().insert(customer.user_id, customer.clone());
        Ok(customer.clone())
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<CustomerModel>, sqlx::Error> {
        Ok(self.0.customers.lock().unwrap().get(&user_id).cloned())
    }

    async fn update_kyc_status(&self, user_id: Uuid, status: &str) -> Result<(), sqlx::Error> {
        if let Some(customer) = self.0.customers.lock().unwrap().get_mut(&user_id) {
            customer.kyc_status = status.parse().unwrap_or(customer.kyc_status);
        }
        Ok(())
    }

    async fn delete(&self, user_id: Uuid) -> Result<(), sqlx::Error> {
        self.0.customers.lock().unwrap().remove(&user_id);
        Ok(())
    }

    async fn list_all(&self, limit: i64, offset: i64) -> Result<Vec<CustomerModel>, sqlx::Error> {
        let mut customers: Vec<CustomerModel> = self.0.customers.lock().unwrap().values().cloned().collect();
        customers.sort_by_key(|c| c.created_at);
        Ok(customers.into_iter().skip(offset as usize).take(limit as usize).collect())
    }
}

#[async_trait]
impl AgentAssignmentRepository<Postgres> for MockRepo {
    async fn create(&self, assignment: &AgentAssignmentModel) -> Result<AgentAssignmentModel, sqlx::Error> {
        self.0.agent_assignments.lock().unwrap().insert(assignment.id, assignment.clone());
        Ok(assignment.clone())
    }

    async fn find_active_for_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Option<AgentAssignmentModel>, sqlx::Error> {
        Ok(self
            .0
            .agent_assignments
            .lock()
            .unwrap()
            .values()
            .find(|a| a.customer_id == customer_id && a.is_active)
            .cloned())
    }

    async fn list_active_for_agent(&self, agent_user_id: Uuid) -> Result<Vec<AgentAssignmentModel>, sqlx::Error> {
        Ok(self
            .0
            .agent_assignments
            .lock()
            .unwrap()
            .values()
            .filter(|a| a.agent_user_id == agent_user_id && a.is_active)
            .cloned()
            .collect())
    }

    async fn deactivate_for_customer(&self, customer_id: Uuid) -> Result<(), sqlx::Error> {
        for assignment in self.0.agent_assignments.lock().unwrap().values_mut() {
            if assignment.customer_id == customer_id && assignment.is_active {
                assignment.is_active = false;
                assignment.unassigned_at = Some(Utc::now());
            }
        }
        Ok(())
    }
}

#[async_trait]
impl AuditRepository<Postgres> for MockRepo {
    async fn create(&self, entry: &AuditEntryModel) -> Result<AuditEntryModel, sqlx::Error> {
        self.0.audit_entries.lock().unwrap().push(entry.clone());
        Ok(entry.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<AuditEntryModel>, sqlx::Error> {
        Ok(self.0.audit_entries.lock().unwrap().iter().find(|e| e.id == id).cloned())
    }

    async fn find_by_entity(&self, entity_type: &str, entity_id: Uuid) -> Result<Vec<AuditEntryModel>, sqlx::Error> {
        Ok(self
            .0
            .audit_entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.entity_type.as_str() == entity_type && e.entity_id == entity_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CapitalLedgerRepository<Postgres> for MockRepo {
    async fn create_investment(&self, investment: &InvestmentModel) -> Result<InvestmentModel, sqlx::Error> {
        self.0.investments.lock().unwrap().push(investment.clone());
        Ok(investment.clone())
    }

    async fn list_investments(&self) -> Result<Vec<InvestmentModel>, sqlx::Error> {
        Ok(self.0.investments.lock().unwrap().clone())
    }

    async fn create_borrowing(&self, borrowing: &BorrowingModel) -> Result<BorrowingModel, sqlx::Error> {
        self.0.borrowings.lock().unwrap().push(borrowing.clone());
        Ok(borrowing.clone())
    }

    async fn list_borrowings(&self) -> Result<Vec<BorrowingModel>, sqlx::Error> {
        Ok(self.0.borrowings.lock().unwrap().clone())
    }

    async fn total_active_investment(&self) -> Result<rust_decimal::Decimal, sqlx::Error> {
        Ok(self
            .0
            .investments
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.status == loancore_api::CapitalLedgerStatus::Active)
            .map(|i| i.amount)
            .sum())
    }

    async fn total_active_borrowing(&self) -> Result<rust_decimal::Decimal, sqlx::Error> {
        Ok(self
            .0
            .borrowings
            .lock()
            .unwrap()
            .iter()
            .filter(|b| b.status == loancore_api::CapitalLedgerStatus::Active)
            .map(|b| b.amount)
            .sum())
    }
}

struct MockSession {
    repo: MockRepo,
}

#[async_trait]
impl UnitOfWorkSession<Postgres> for MockSession {
    type LoanRepo = MockRepo;
    type ScheduleRepo = MockRepo;
    type CollectionRepo = MockRepo;
    type UserRepo = MockRepo;
    type CustomerRepo = MockRepo;
    type AgentAssignmentRepo = MockRepo;
    type AuditRepo = MockRepo;
    type CapitalLedgerRepo = MockRepo;

    fn loans(&self) -> &MockRepo {
        &self.repo
    }

    fn schedules(&self) -> &MockRepo {
        &self.repo
    }

    fn collections(&self) -> &MockRepo {
        &self.repo
    }

    fn users(&self) -> &MockRepo {
        &self.repo
    }

    fn customers(&self) -> &MockRepo {
        &self.repo
    }

    fn agent_assignments(&self) -> &MockRepo {
        &self.repo
    }

    fn audit(&self) -> &MockRepo {
        &self.repo
    }

    fn capital_ledger(&self) -> &MockRepo {
        &self.repo
    }

    async fn commit(self) -> loancore_api::LoanCoreResult<()> {
        Ok(())
    }

    async fn rollback(self) -> loancore_api::LoanCoreResult<()> {
        Ok(())
    }
}

#[derive(Default)]
struct MockUnitOfWork {
    store: Arc<MockStore>,
}

#[async_trait]
impl UnitOfWork<Postgres> for MockUnitOfWork {
    type Session = MockSession;

    async fn begin(&self) -> loancore_api::LoanCoreResult<MockSession> {
        Ok(MockSession {
            repo: MockRepo(self.store.clone()),
        })
    }
}

fn new_user(role: Role) -> UserModel {
    let now = Utc::now();
    UserModel {
        id: Uuid::new_v4(),
        email: format!("{}@example.com", Uuid::new_v4()).parse().unwrap(),
        full_name: "Test User".parse().unwrap(),
        role,
        is_active: true,
        password_hash: "hash".parse().unwrap(),
        may_delete_collections: false,
        may_delete_customers: false,
        may_delete_users: false,
        created_at: now,
        last_updated_at: now,
    }
}

async fn seed_manager_and_customer(uow: &MockUnitOfWork) -> (Uuid, Uuid) {
    let manager = new_user(Role::Manager);
    let customer_user = new_user(Role::Customer);
    let session = uow.begin().await.unwrap();
    session.users().create(&manager).await.unwrap();
    session.users().create(&customer_user).await.unwrap();
    session
        .customers()
        .create(&CustomerModel {
            user_id: customer_user.id,
            kyc_status: loancore_api::KycStatus::Verified,
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            id_proof: "AB1234567".parse().unwrap(),
            created_at: Utc::now(),
        })
        .await
        .unwrap();
    session.commit().await.unwrap();
    (manager.id, customer_user.id)
}

fn standard_loan_request(customer_id: Uuid) -> CreateLoanRequest {
    CreateLoanRequest {
        customer_id,
        principal: dec!(100000),
        interest_rate: dec!(12),
        frequency: Frequency::Monthly,
        tenure_installments: 12,
        repayment_type: RepaymentType::Emi,
        grace_period_days: Some(3),
        late_fee_daily_percent: Some(dec!(0.1)),
        penalty_percent: Some(dec!(2)),
        charges: None,
        start_date: None,
        remarks: Some("initial disbursement".to_string()),
    }
}

/// A 100000 principal, 12% annual, 12-month EMI loan resolves to an
/// 8884.88 installment on creation.
#[tokio::test]
async fn create_loan_computes_standard_emi_installment() {
    let uow = Arc::new(MockUnitOfWork::default());
    let cache = Arc::new(CacheAdapter::new(100, std::time::Duration::from_secs(60)));
    let (manager_id, customer_id) = seed_manager_and_customer(&uow).await;
    let service = LoanServiceImpl::new(uow.clone(), cache);

    let loan = service
        .create_loan(manager_id, standard_loan_request(customer_id))
        .await
        .expect("loan creation should succeed");

    assert_eq!(loan.installment_amount, dec!(8884.88));
    assert_eq!(loan.status, LoanStatus::Pending);
    assert_eq!(loan.outstanding_principal, dec!(100000));
}

/// A non-manager/admin actor cannot create a loan.
#[tokio::test]
async fn create_loan_rejects_customer_actor() {
    let uow = Arc::new(MockUnitOfWork::default());
    let cache = Arc::new(CacheAdapter::new(100, std::time::Duration::from_secs(60)));
    let (_manager_id, customer_id) = seed_manager_and_customer(&uow).await;
    let service = LoanServiceImpl::new(uow.clone(), cache);

    let err = service
        .create_loan(customer_id, standard_loan_request(customer_id))
        .await
        .expect_err("customer actor must be rejected");

    assert!(matches!(err, loancore_api::LoanCoreError::NotAuthorized(_)));
}

/// Exercises the full lifecycle end to end: create, disburse, generate the
/// schedule, record a full-amount collection against the first installment,
/// and confirm the ledger tracks the payment.
#[tokio::test]
async fn disburse_generate_schedule_and_collect_first_installment() {
    let uow = Arc::new(MockUnitOfWork::default());
    let cache = Arc::new(CacheAdapter::new(100, std::time::Duration::from_secs(60)));
    let (manager_id, customer_id) = seed_manager_and_customer(&uow).await;

    let loan_service = LoanServiceImpl::new(uow.clone(), cache.clone());
    let collection_service = CollectionServiceImpl::new(uow.clone(), cache.clone());

    let created = loan_service
        .create_loan(manager_id, standard_loan_request(customer_id))
        .await
        .unwrap();

    let disbursed = loan_service
        .disburse(
            manager_id,
            created.id,
            Some(dec!(100000)),
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(disbursed.status, LoanStatus::Active);

    let schedule_generator =
        loancore_logic::ScheduleGeneratorImpl::new(uow.clone());
    let rows_inserted = {
        use loancore_api::ScheduleGenerator;
        schedule_generator.generate_for_loan(created.id).await.unwrap()
    };
    assert_eq!(rows_inserted, 12);

    let collection = collection_service
        .record_collection(
            manager_id,
            RecordCollectionRequest {
                loan_id: created.id,
                amount: dec!(8884.88),
                collection_date: Some(NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()),
                payment_method: Some(PaymentMethod::BankTransfer),
                remarks: None,
            },
        )
        .await
        .expect("first installment collection should succeed");

    assert_eq!(collection.amount, dec!(8884.88));
    assert!(collection.principal_allocation > Decimal::ZERO);

    let loan_after = loan_service.get_loan(manager_id, created.id).await.unwrap();
    assert_eq!(loan_after.loan.total_collected, dec!(8884.88));
    assert!(loan_after.loan.outstanding_principal < dec!(100000));
}

/// Top-up preserves the original loan's preclosure and opens a fresh one
/// referencing it.
#[tokio::test]
async fn top_up_precloses_original_and_opens_new_loan() {
    let uow = Arc::new(MockUnitOfWork::default());
    let cache = Arc::new(CacheAdapter::new(100, std::time::Duration::from_secs(60)));
    let (manager_id, customer_id) = seed_manager_and_customer(&uow).await;
    let loan_service = LoanServiceImpl::new(uow.clone(), cache);

    let created = loan_service
        .create_loan(manager_id, standard_loan_request(customer_id))
        .await
        .unwrap();
    loan_service
        .disburse(
            manager_id,
            created.id,
            Some(dec!(100000)),
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        )
        .await
        .unwrap();

    let new_loan = loan_service
        .top_up(
            manager_id,
            TopUpRequest {
                loan_id: created.id,
                top_up_amount: dec!(20000),
                new_tenure: None,
                new_interest_rate: None,
                charges: None,
                remarks: Some("customer requested top-up".to_string()),
            },
        )
        .await
        .expect("top-up should succeed on a clean active loan");

    assert!(new_loan.is_top_up);
    assert_eq!(new_loan.original_loan_id, Some(created.id));
    assert_eq!(new_loan.outstanding_principal, dec!(120000));

    let original = loan_service.get_loan(manager_id, created.id).await.unwrap();
    assert_eq!(original.loan.status, LoanStatus::Preclosed);
    assert_eq!(original.loan.outstanding_principal, Decimal::ZERO);
}
