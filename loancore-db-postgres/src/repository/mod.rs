pub mod audit_repository_impl;
pub mod capital_repository_impl;
pub mod collection_repository_impl;
pub(crate) mod executor;
pub mod loan_repository_impl;
pub mod schedule_repository_impl;
pub mod unit_of_work_impl;
pub mod user_repository_impl;

pub use audit_repository_impl::PostgresAuditRepository;
pub use capital_repository_impl::PostgresCapitalLedgerRepository;
pub use collection_repository_impl::PostgresCollectionRepository;
pub use loan_repository_impl::PostgresLoanRepository;
pub use schedule_repository_impl::PostgresScheduleRepository;
pub use unit_of_work_impl::{PostgresUnitOfWork, PostgresUnitOfWorkSession};
pub use user_repository_impl::{
    PostgresAgentAssignmentRepository, PostgresCustomerRepository, PostgresUserRepository,
};
