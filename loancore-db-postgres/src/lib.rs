pub mod cache;
pub mod rate_limit;
pub mod receipt;
pub mod repository;
#[cfg(any(test, feature = "postgres_tests"))]
pub mod test_helper;
pub mod types;
pub mod utils;

pub use cache::*;
pub use rate_limit::*;
pub use receipt::*;
pub use repository::*;
