use actix_web::{web, HttpResponse};
use chrono::Utc;
use loancore_api::{CreateLoanRequest, LoanAction, LoanActionRequest, LoanCoreError, TopUpRequest};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListLoansQuery {
    pub customer_id: Uuid,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}
fn default_limit() -> u32 {
    20
}

/// `POST /loans`.
pub async fn create_loan(
    state: web::Data<AppState>,
    actor: AuthenticatedUser,
    body: web::Json<CreateLoanRequest>,
) -> Result<HttpResponse, ApiError> {
    body.validate().map_err(validation_error)?;
    let loan = state.loan_service.create_loan(actor.user_id, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(loan))
}

/// `GET /loans?customerId=&page=&limit=`. Listing is scoped to one
/// customer at a time, the same shape `LoanService` exposes; role
/// filtering (agent/customer vs admin/manager) happens inside the service.
pub async fn list_loans(
    state: web::Data<AppState>,
    actor: AuthenticatedUser,
    query: web::Query<ListLoansQuery>,
) -> Result<HttpResponse, ApiError> {
    let views = state
        .loan_service
        .list_loans_for_customer(actor.user_id, query.customer_id, query.page, query.limit)
        .await?;
    Ok(HttpResponse::Ok().json(views))
}

/// `GET /loans/{id}`.
pub async fn get_loan(
    state: web::Data<AppState>,
    actor: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let view = state.loan_service.get_loan(actor.user_id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(view))
}

/// `PATCH /loans/{id}`. Dispatches on `action` to the matching
/// `LoanService` lifecycle method.
pub async fn patch_loan(
    state: web::Data<AppState>,
    actor: AuthenticatedUser,
    path: web::Path<Uuid>,
    body: web::Json<LoanActionRequest>,
) -> Result<HttpResponse, ApiError> {
    let loan_id = path.into_inner();
    let loan = match body.action {
        LoanAction::Approve => state.loan_service.approve(actor.user_id, loan_id).await?,
        LoanAction::Disburse => {
            state
                .loan_service
                .disburse(actor.user_id, loan_id, body.disbursed_amount, Utc::now().date_naive())
                .await?
        }
        LoanAction::Close => state.loan_service.close(actor.user_id, loan_id).await?,
        LoanAction::Preclose => {
            state
                .loan_service
                .preclose(actor.user_id, loan_id, Utc::now().date_naive())
                .await?
        }
        LoanAction::Default => {
            state
                .loan_service
                .mark_defaulted(actor.user_id, loan_id, body.remarks.clone())
                .await?
        }
    };
    Ok(HttpResponse::Ok().json(loan))
}

/// `POST /loans/topup`.
pub async fn top_up(
    state: web::Data<AppState>,
    actor: AuthenticatedUser,
    body: web::Json<TopUpRequest>,
) -> Result<HttpResponse, ApiError> {
    body.validate().map_err(validation_error)?;
    let request = body.into_inner();
    let old_loan_id = request.loan_id;
    let top_up_amount = request.top_up_amount;

    let new_loan = state.loan_service.top_up(actor.user_id, request).await?;
    let old_loan = state.loan_service.get_loan(actor.user_id, old_loan_id).await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "oldLoan": old_loan,
        "newLoan": new_loan,
        "topUpDetails": { "topUpAmount": top_up_amount },
    })))
}

fn validation_error(errors: validator::ValidationErrors) -> ApiError {
    ApiError(LoanCoreError::ValidationError {
        field: "body".to_string(),
        message: errors.to_string(),
    })
}
