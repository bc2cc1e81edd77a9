pub mod audit_service_impl;
pub mod authorization_service_impl;
pub mod capital_service_impl;
pub mod collection_service_impl;
pub mod loan_service_impl;
mod password;
pub mod schedule_generator_impl;
pub mod user_service_impl;

pub use audit_service_impl::*;
pub use authorization_service_impl::*;
pub use capital_service_impl::*;
pub use collection_service_impl::*;
pub use loan_service_impl::*;
pub use schedule_generator_impl::*;
pub use user_service_impl::*;
