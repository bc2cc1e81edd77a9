use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::{dev::Payload, FromRequest, HttpRequest};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use std::future::{ready, Ready};
use loancore_api::{LoanCoreError, Role};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::ApiError;

pub const ACCESS_COOKIE: &str = "loancore_access";
pub const REFRESH_COOKIE: &str = "loancore_refresh";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    role: String,
    token_type: TokenType,
    exp: i64,
}

/// The authenticated actor, extracted from the `loancore_access` cookie on
/// every request that declares it as a handler argument. Missing or
/// expired/invalid tokens surface as `LoanCoreError::AuthenticationRequired`
/// before the handler body ever runs.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub role: Role,
}

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = (|| -> Result<Self, LoanCoreError> {
            let config = req
                .app_data::<actix_web::web::Data<AppConfig>>()
                .ok_or_else(|| LoanCoreError::Internal("app config missing".to_string()))?;
            let cookie = req
                .cookie(ACCESS_COOKIE)
                .ok_or(LoanCoreError::AuthenticationRequired)?;
            let claims = decode_token(cookie.value(), &config.access_token_secret, TokenType::Access)?;
            let role = Role::from_str(&claims.role).map_err(|_| LoanCoreError::AuthenticationRequired)?;
            Ok(AuthenticatedUser {
                user_id: claims.sub,
                role,
            })
        })();
        ready(result.map_err(ApiError))
    }
}

fn decode_token(token: &str, secret: &str, expected: TokenType) -> Result<Claims, LoanCoreError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| LoanCoreError::AuthenticationRequired)?;
    if data.claims.token_type != expected {
        return Err(LoanCoreError::AuthenticationRequired);
    }
    Ok(data.claims)
}

fn sign(user_id: Uuid, role: Role, token_type: TokenType, ttl: Duration, secret: &str) -> Result<String, LoanCoreError> {
    let claims = Claims {
        sub: user_id,
        role: role.to_string(),
        token_type,
        exp: (Utc::now() + ttl).timestamp(),
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| LoanCoreError::Internal(format!("token signing failed: {e}")))
}

pub fn issue_access_token(user_id: Uuid, role: Role, config: &AppConfig) -> Result<String, LoanCoreError> {
    sign(
        user_id,
        role,
        TokenType::Access,
        Duration::minutes(config.access_token_minutes),
        &config.access_token_secret,
    )
}

pub fn issue_refresh_token(user_id: Uuid, role: Role, config: &AppConfig) -> Result<String, LoanCoreError> {
    sign(
        user_id,
        role,
        TokenType::Refresh,
        Duration::days(config.refresh_token_days),
        &config.refresh_token_secret,
    )
}

/// Verifies a refresh token and mints a fresh access token for the same
/// subject; the refresh token itself is never rotated.
pub fn refresh_access_token(refresh_token: &str, config: &AppConfig) -> Result<(Uuid, String), LoanCoreError> {
    let claims = decode_token(refresh_token, &config.refresh_token_secret, TokenType::Refresh)?;
    let role = Role::from_str(&claims.role).map_err(|_| LoanCoreError::AuthenticationRequired)?;
    let access = issue_access_token(claims.sub, role, config)?;
    Ok((claims.sub, access))
}

/// Builds an httpOnly, same-site=lax cookie, marked `Secure` only when
/// `config.is_production()` — the one place that flag is consulted.
pub fn build_cookie<'c>(name: &'c str, value: String, max_age_secs: i64, config: &AppConfig) -> Cookie<'c> {
    Cookie::build(name, value)
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.is_production())
        .path("/")
        .max_age(CookieDuration::seconds(max_age_secs))
        .finish()
}

pub fn expire_cookie<'c>(name: &'c str, config: &AppConfig) -> Cookie<'c> {
    Cookie::build(name, "")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.is_production())
        .path("/")
        .max_age(CookieDuration::seconds(0))
        .finish()
}
