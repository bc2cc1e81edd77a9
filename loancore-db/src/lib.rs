pub mod models;
pub mod repository;

pub use models::audit::*;
pub use models::capital::*;
pub use models::collection::*;
pub use models::customer::*;
pub use models::loan::*;
pub use models::user::*;

pub use repository::{
    AgentAssignmentRepository, AuditRepository, CapitalLedgerRepository, CollectionRepository,
    CustomerRepository, LoanRepository, ScheduleRepository, TransactionAware, UnitOfWork,
    UnitOfWorkSession, UserRepository,
};
