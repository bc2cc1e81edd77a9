pub mod audit_repository;
pub mod capital_repository;
pub mod collection_repository;
pub mod loan_repository;
pub mod schedule_repository;
pub mod transaction_aware;
pub mod unit_of_work;
pub mod user_repository;

pub use audit_repository::*;
pub use capital_repository::*;
pub use collection_repository::*;
pub use loan_repository::*;
pub use schedule_repository::*;
pub use transaction_aware::*;
pub use unit_of_work::*;
pub use user_repository::*;
