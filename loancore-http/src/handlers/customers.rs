use actix_web::{web, HttpResponse};
use loancore_api::{CreateCustomerRequest, LoanCoreError};
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::state::AppState;

/// `POST /customers`.
pub async fn create_customer(
    state: web::Data<AppState>,
    actor: AuthenticatedUser,
    body: web::Json<CreateCustomerRequest>,
) -> Result<HttpResponse, ApiError> {
    body.validate().map_err(|e| {
        ApiError(LoanCoreError::ValidationError {
            field: "body".to_string(),
            message: e.to_string(),
        })
    })?;
    let customer = state.user_service.create_customer(actor.user_id, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(customer))
}

/// `GET /customers`.
pub async fn list_customers(state: web::Data<AppState>, actor: AuthenticatedUser) -> Result<HttpResponse, ApiError> {
    let customers = state.user_service.list_customers(actor.user_id).await?;
    Ok(HttpResponse::Ok().json(customers))
}

/// `GET /customers/{id}`.
pub async fn get_customer(
    state: web::Data<AppState>,
    actor: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let customer = state.user_service.get_customer(actor.user_id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(customer))
}

/// `DELETE /customers/{id}`. Gated inside `UserService::delete_customer`
/// by `AuthorizationService::may_delete_customer`.
pub async fn delete_customer(
    state: web::Data<AppState>,
    actor: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    state.user_service.delete_customer(actor.user_id, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
