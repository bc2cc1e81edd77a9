use std::sync::Arc;

use loancore_api::{AuditService, AuthorizationService, CapitalService, CollectionService, LoanService, UserService};
use loancore_db_postgres::RateLimiter;

use crate::config::AppConfig;

/// The handles every handler needs, installed once at startup via
/// `App::app_data`. Service fields are trait objects so this struct does
/// not carry the `PostgresUnitOfWork` type parameter into every handler
/// signature.
#[derive(Clone)]
pub struct AppState {
    pub loan_service: Arc<dyn LoanService>,
    pub collection_service: Arc<dyn CollectionService>,
    pub user_service: Arc<dyn UserService>,
    pub capital_service: Arc<dyn CapitalService>,
    pub authorization_service: Arc<dyn AuthorizationService>,
    pub audit_service: Arc<dyn AuditService>,
    pub config: Arc<AppConfig>,
    pub login_rate_limiter: Arc<RateLimiter>,
}
