use actix_web::{web, HttpResponse};
use loancore_api::LoginRequest;
use validator::Validate;

use crate::auth::{
    build_cookie, issue_access_token, issue_refresh_token, refresh_access_token, ACCESS_COOKIE, REFRESH_COOKIE,
};
use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::state::AppState;

/// `POST /auth/login`. Throttled per-email via the same fixed-window
/// limiter `loancore-db-postgres` already exposes for other keyed limits;
/// a rejected attempt never reaches `UserService::authenticate`.
pub async fn login(state: web::Data<AppState>, body: web::Json<LoginRequest>) -> Result<HttpResponse, ApiError> {
    body.validate()
        .map_err(|e| ApiError(loancore_api::LoanCoreError::ValidationError {
            field: "body".to_string(),
            message: e.to_string(),
        }))?;

    state.login_rate_limiter.check(&body.email)?;

    let user = state.user_service.authenticate(&body.email, &body.password).await?;

    let access = issue_access_token(user.id, user.role, &state.config)?;
    let refresh = issue_refresh_token(user.id, user.role, &state.config)?;

    let access_cookie = build_cookie(
        ACCESS_COOKIE,
        access,
        state.config.access_token_minutes * 60,
        &state.config,
    );
    let refresh_cookie = build_cookie(
        REFRESH_COOKIE,
        refresh,
        state.config.refresh_token_days * 86_400,
        &state.config,
    );

    Ok(HttpResponse::Ok()
        .cookie(access_cookie)
        .cookie(refresh_cookie)
        .json(crate::handlers::dto::UserView::from(&user)))
}

/// `GET /auth/me`. Returns the currently authenticated user.
pub async fn me(state: web::Data<AppState>, actor: AuthenticatedUser) -> Result<HttpResponse, ApiError> {
    let user = state.user_service.get_user(actor.user_id).await?;
    Ok(HttpResponse::Ok().json(crate::handlers::dto::UserView::from(&user)))
}

/// `POST /auth/refresh`. Mints a fresh access token from the refresh
/// cookie; the refresh token itself is never rotated.
pub async fn refresh(
    req: actix_web::HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let refresh_token = req
        .cookie(REFRESH_COOKIE)
        .ok_or(loancore_api::LoanCoreError::AuthenticationRequired)?;

    let (_user_id, access) = refresh_access_token(refresh_token.value(), &state.config)?;

    let access_cookie = build_cookie(
        ACCESS_COOKIE,
        access,
        state.config.access_token_minutes * 60,
        &state.config,
    );

    Ok(HttpResponse::Ok().cookie(access_cookie).json(serde_json::json!({ "ok": true })))
}
