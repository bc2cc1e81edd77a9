pub mod calculator;
pub mod domain;
pub mod error;
pub mod money;
pub mod service;

pub use domain::*;
pub use error::*;
pub use service::*;
