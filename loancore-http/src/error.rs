use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use loancore_api::LoanCoreError;
use serde::Serialize;
use uuid::Uuid;

/// The `{error, message?, details?}` envelope every failure response uses.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

/// Wraps `LoanCoreError` so this crate can impl `ResponseError` on it
/// (the orphan rule forbids implementing it directly on a foreign type).
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub LoanCoreError);

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match &self.0 {
            LoanCoreError::ValidationError { .. }
            | LoanCoreError::InvalidTerms(_)
            | LoanCoreError::InvalidCollectionAmount(_)
            | LoanCoreError::NegativeInstallmentIndex(_)
            | LoanCoreError::ChargesExceedPrincipal { .. }
            | LoanCoreError::Overpayment { .. } => StatusCode::BAD_REQUEST,

            LoanCoreError::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            LoanCoreError::NotAuthorized(_) => StatusCode::FORBIDDEN,

            LoanCoreError::LoanNotFound(_) | LoanCoreError::CustomerNotFound(_) | LoanCoreError::UserNotFound(_) => {
                StatusCode::NOT_FOUND
            }

            LoanCoreError::StatusNotCollectable { .. }
            | LoanCoreError::InvalidLoanState { .. }
            | LoanCoreError::HasOutstandingDues { .. } => StatusCode::CONFLICT,

            LoanCoreError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,

            LoanCoreError::TransientFailure { .. } | LoanCoreError::ReceiptCollision(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }

            LoanCoreError::DateCalculationError(_) | LoanCoreError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = match &self.0 {
            LoanCoreError::ValidationError { field, message } => ErrorBody {
                error: "validation_error".to_string(),
                message: Some(message.clone()),
                details: Some(serde_json::json!({ "field": field })),
            },
            LoanCoreError::Overpayment { amount, outstanding } => ErrorBody {
                error: "overpayment".to_string(),
                message: Some(self.0.to_string()),
                details: Some(serde_json::json!({ "amount": amount, "outstanding": outstanding })),
            },
            LoanCoreError::RateLimited { retry_after_secs } => ErrorBody {
                error: "rate_limited".to_string(),
                message: Some(self.0.to_string()),
                details: Some(serde_json::json!({ "retry_after_secs": retry_after_secs })),
            },
            LoanCoreError::Internal(_) | LoanCoreError::DateCalculationError(_) => {
                let correlation_id = Uuid::new_v4();
                tracing::error!(correlation_id = %correlation_id, error = %self.0, "internal error");
                ErrorBody {
                    error: "internal_error".to_string(),
                    message: Some(format!("an unexpected error occurred (id: {correlation_id})")),
                    details: None,
                }
            }
            other => ErrorBody {
                error: status_slug(status).to_string(),
                message: Some(other.to_string()),
                details: None,
            },
        };
        HttpResponse::build(status).json(body)
    }
}

fn status_slug(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "bad_request",
        StatusCode::UNAUTHORIZED => "unauthorized",
        StatusCode::FORBIDDEN => "forbidden",
        StatusCode::NOT_FOUND => "not_found",
        StatusCode::CONFLICT => "conflict",
        StatusCode::TOO_MANY_REQUESTS => "rate_limited",
        StatusCode::SERVICE_UNAVAILABLE => "unavailable",
        _ => "internal_error",
    }
}
