#![cfg(feature = "postgres_tests")]

use chrono::{NaiveDate, Utc};
use heapless::String as HeaplessString;
use loancore_api::{ChargeType, Frequency, InstallmentStatus, KycStatus, LoanStatus, PaymentMethod, RepaymentType, Role};
use loancore_db::{
    AgentAssignmentModel, CollectionModel, CustomerModel, LoanChargeModel, LoanModel,
    ScheduleRowModel, UserModel,
};
use loancore_db::{
    AgentAssignmentRepository, CollectionRepository, CustomerRepository, LoanRepository,
    ScheduleRepository, UnitOfWorkSession, UserRepository,
};
use loancore_db_postgres::test_helper::test_session;
use rust_decimal_macros::dec;
use uuid::Uuid;

fn heapless<const N: usize>(s: &str) -> HeaplessString<N> {
    HeaplessString::try_from(s).unwrap()
}

#[tokio::test]
async fn persists_a_loan_with_schedule_and_a_collection() {
    let session = test_session().await;

    let agent_id = Uuid::new_v4();
    let agent = UserModel {
        id: agent_id,
        email: heapless("agent@example.com"),
        full_name: heapless("Field Agent"),
        role: Role::Agent,
        is_active: true,
        password_hash: heapless("hash"),
        may_delete_collections: false,
        may_delete_customers: false,
        may_delete_users: false,
        created_at: Utc::now(),
        last_updated_at: Utc::now(),
    };
    session.users().create(&agent).await.unwrap();

    let customer_user = UserModel {
        id: Uuid::new_v4(),
        role: Role::Customer,
        email: heapless("customer@example.com"),
        full_name: heapless("Jane Customer"),
        ..agent.clone()
    };
    session.users().create(&customer_user).await.unwrap();

    let customer = CustomerModel {
        user_id: customer_user.id,
        kyc_status: KycStatus::Verified,
        date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
        id_proof: heapless("NID-0001"),
        created_at: Utc::now(),
    };
    session.customers().create(&customer).await.unwrap();

    session
        .agent_assignments()
        .create(&AgentAssignmentModel {
            id: Uuid::new_v4(),
            agent_user_id: agent_id,
            customer_id: customer.user_id,
            is_active: true,
            assigned_at: Utc::now(),
            unassigned_at: None,
        })
        .await
        .unwrap();

    let loan_number = session.loans().next_loan_number().await.unwrap();
    let loan = LoanModel {
        id: Uuid::new_v4(),
        loan_number,
        principal: dec!(10000.00),
        annual_interest_percent: dec!(24.000),
        tenure_installments: 12,
        frequency: Frequency::Monthly,
        repayment_type: RepaymentType::ReducingBalance,
        grace_period_days: 3,
        late_fee_daily_percent: dec!(0.500),
        penalty_percent: dec!(2.000),
        installment_amount: dec!(945.60),
        total_interest: dec!(1347.20),
        total_amount: dec!(11347.20),
        disbursed_amount: dec!(9800.00),
        disbursed_at: Some(Utc::now()),
        start_date: Some(Utc::now().date_naive()),
        end_date: None,
        outstanding_principal: dec!(10000.00),
        outstanding_interest: dec!(1347.20),
        total_collected: dec!(0),
        total_late_fees_paid: dec!(0),
        total_penalties_paid: dec!(0),
        status: LoanStatus::Active,
        closed_at: None,
        is_top_up: false,
        original_loan_id: None,
        top_up_amount: None,
        customer_id: customer.user_id,
        created_by: agent_id,
        remarks: None,
        created_at: Utc::now(),
        last_updated_at: Utc::now(),
    };
    let created = session.loans().create(&loan).await.unwrap();
    assert_eq!(created.loan_number, loan_number);

    session
        .loans()
        .create_charges(&[LoanChargeModel {
            id: Uuid::new_v4(),
            loan_id: created.id,
            charge_type: ChargeType::ProcessingFee,
            amount: dec!(200.00),
        }])
        .await
        .unwrap();
    let charges = session.loans().find_charges_for_loan(created.id).await.unwrap();
    assert_eq!(charges.len(), 1);

    let locked = session
        .loans()
        .find_by_id_for_update(created.id)
        .await
        .unwrap()
        .expect("loan row should be locked and returned");
    assert_eq!(locked.id, created.id);

    let schedule_row = ScheduleRowModel {
        id: Uuid::new_v4(),
        loan_id: created.id,
        installment_number: 1,
        due_date: NaiveDate::from_ymd_opt(2026, 8, 28).unwrap(),
        principal_due: dec!(800.00),
        interest_due: dec!(145.60),
        total_due: dec!(945.60),
        principal_paid: dec!(0),
        interest_paid: dec!(0),
        total_paid: dec!(0),
        status: InstallmentStatus::Scheduled,
        paid_at: None,
    };
    let inserted = session.schedules().insert_rows(&[schedule_row.clone()]).await.unwrap();
    assert_eq!(inserted, 1);

    // Re-inserting the same installment is a no-op thanks to the
    // (loan_id, installment_number) unique index.
    let reinserted = session.schedules().insert_rows(&[schedule_row]).await.unwrap();
    assert_eq!(reinserted, 0);

    let next_unpaid = session
        .schedules()
        .find_next_unpaid(created.id)
        .await
        .unwrap()
        .expect("first installment should be unpaid");
    assert_eq!(next_unpaid.installment_number, 1);

    let collection = CollectionModel {
        id: Uuid::new_v4(),
        loan_id: created.id,
        agent_id,
        amount: dec!(945.60),
        principal_allocation: dec!(800.00),
        interest_allocation: dec!(145.60),
        fee_allocation: dec!(0),
        penalty_allocation: dec!(0),
        collection_date: Utc::now().date_naive(),
        payment_method: PaymentMethod::Cash,
        receipt_number: loancore_db_postgres::generate_receipt_number(Utc::now())
            .parse()
            .unwrap(),
        remarks: None,
        created_at: Utc::now(),
    };
    let recorded = session.collections().create(&collection).await.unwrap();
    let fetched = session
        .collections()
        .find_by_receipt_number(recorded.receipt_number.as_str())
        .await
        .unwrap();
    assert!(fetched.is_some());

    session.rollback().await.unwrap();
}
