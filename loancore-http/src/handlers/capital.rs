use actix_web::{web, HttpResponse};
use loancore_api::{CreateBorrowingRequest, CreateInvestmentRequest};

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::state::AppState;

/// `POST /investments`.
pub async fn create_investment(
    state: web::Data<AppState>,
    actor: AuthenticatedUser,
    body: web::Json<CreateInvestmentRequest>,
) -> Result<HttpResponse, ApiError> {
    let investment = state.capital_service.create_investment(actor.user_id, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(investment))
}

/// `GET /investments`.
pub async fn list_investments(state: web::Data<AppState>, actor: AuthenticatedUser) -> Result<HttpResponse, ApiError> {
    let investments = state.capital_service.list_investments(actor.user_id).await?;
    Ok(HttpResponse::Ok().json(investments))
}

/// `POST /borrowings`.
pub async fn create_borrowing(
    state: web::Data<AppState>,
    actor: AuthenticatedUser,
    body: web::Json<CreateBorrowingRequest>,
) -> Result<HttpResponse, ApiError> {
    let borrowing = state.capital_service.create_borrowing(actor.user_id, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(borrowing))
}

/// `GET /borrowings`.
pub async fn list_borrowings(state: web::Data<AppState>, actor: AuthenticatedUser) -> Result<HttpResponse, ApiError> {
    let borrowings = state.capital_service.list_borrowings(actor.user_id).await?;
    Ok(HttpResponse::Ok().json(borrowings))
}

/// `GET /analytics`. Net capital position only — dashboard aggregation
/// beyond the ledger totals is out of scope; `period`/date-range query
/// parameters are accepted but unused since no aggregation keys off them.
pub async fn analytics(state: web::Data<AppState>, actor: AuthenticatedUser) -> Result<HttpResponse, ApiError> {
    let position = state.capital_service.position(actor.user_id).await?;
    Ok(HttpResponse::Ok().json(position))
}
