use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::auth::AuthError;
use crate::checkout::CheckoutError;
use crate::match_client::MatchApiError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Auth service error: {0}")]
    AuthService(String),

    #[error("Payment provider error: {0}")]
    Payment(String),

    #[error("Authentication service is not configured")]
    AuthDisabled,

    #[error("Payment provider is not configured")]
    PaymentDisabled,

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<MatchApiError> for AppError {
    fn from(err: MatchApiError) -> Self {
        match err {
            MatchApiError::Auth(
                auth @ (AuthError::SessionExpired | AuthError::NotAuthenticated),
            ) => AppError::Unauthorized(auth.to_string()),
            other => AppError::Upstream(other.to_string()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::SessionExpired | AuthError::NotAuthenticated => {
                AppError::Unauthorized(err.to_string())
            }
            AuthError::Api { status: 401, .. } | AuthError::Api { status: 403, .. } => {
                AppError::Unauthorized(err.to_string())
            }
            other => AppError::AuthService(other.to_string()),
        }
    }
}

impl From<CheckoutError> for AppError {
    fn from(err: CheckoutError) -> Self {
        AppError::Payment(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnknownTemplate(id) => (
                StatusCode::NOT_FOUND,
                "UNKNOWN_TEMPLATE",
                format!("Template '{id}' is not supported"),
            ),
            AppError::Unauthorized(msg) => {
                tracing::warn!("Unauthorized: {msg}");
                (
                    StatusCode::UNAUTHORIZED,
                    "UNAUTHORIZED",
                    "Authentication required".to_string(),
                )
            }
            AppError::Upstream(msg) => {
                tracing::error!("Upstream error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_ERROR",
                    "The analysis service is unavailable".to_string(),
                )
            }
            AppError::AuthService(msg) => {
                tracing::error!("Auth service error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "AUTH_SERVICE_ERROR",
                    "The authentication service is unavailable".to_string(),
                )
            }
            AppError::Payment(msg) => {
                tracing::error!("Payment provider error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "PAYMENT_ERROR",
                    "The payment provider rejected the request".to_string(),
                )
            }
            AppError::AuthDisabled => (
                StatusCode::SERVICE_UNAVAILABLE,
                "AUTH_DISABLED",
                self.to_string(),
            ),
            AppError::PaymentDisabled => (
                StatusCode::SERVICE_UNAVAILABLE,
                "PAYMENT_DISABLED",
                self.to_string(),
            ),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
