use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::services::hashing::MIN_PASSWORD_LENGTH;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("{0}")]
    Validation(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account is awaiting approval by an administrator")]
    PendingApproval,

    #[error("Code is invalid or already used")]
    InvalidOrUsedCode,

    #[error("Code expired, request a new code")]
    CodeExpired,

    #[error("Link is invalid or already used")]
    InvalidToken,

    #[error("Link expired, request a new one")]
    TokenExpired,

    #[error("Password must be at least {min} characters", min = MIN_PASSWORD_LENGTH)]
    WeakPassword,

    #[error("Email already exists")]
    EmailAlreadyExists,

    #[error("Account is already approved")]
    InvalidTransition,

    #[error("Account not found")]
    NotFound,

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Administrator access required")]
    Forbidden,

    #[error("Email delivery failed: {0}")]
    DeliveryFailed(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRole(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::PendingApproval => StatusCode::FORBIDDEN,
            Self::InvalidOrUsedCode
            | Self::CodeExpired
            | Self::InvalidToken
            | Self::TokenExpired
            | Self::WeakPassword => StatusCode::BAD_REQUEST,
            Self::EmailAlreadyExists | Self::InvalidTransition => StatusCode::CONFLICT,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::DeliveryFailed(_) => StatusCode::BAD_GATEWAY,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for the `error` field of the response body.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRole(_) => "invalid_role",
            Self::Validation(_) => "validation_error",
            Self::InvalidCredentials => "invalid_credentials",
            Self::PendingApproval => "pending_approval",
            Self::InvalidOrUsedCode => "invalid_or_used_code",
            Self::CodeExpired => "code_expired",
            Self::InvalidToken => "invalid_token",
            Self::TokenExpired => "token_expired",
            Self::WeakPassword => "weak_password",
            Self::EmailAlreadyExists => "email_already_exists",
            Self::InvalidTransition => "invalid_transition",
            Self::NotFound => "not_found",
            Self::Unauthenticated => "unauthenticated",
            Self::Forbidden => "forbidden",
            Self::DeliveryFailed(_) => "delivery_failed",
            Self::Database(_) | Self::Internal(_) => "internal_error",
        }
    }

    /// Message shown to the caller. Store and transport details stay in the logs.
    fn public_message(&self) -> String {
        match self {
            Self::DeliveryFailed(_) => "Could not deliver the email, please try again".to_string(),
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Database(e) => tracing::error!(error = %e, "database error"),
            Self::Internal(e) => tracing::error!(error = %e, "internal error"),
            Self::DeliveryFailed(e) => tracing::error!(error = %e, "email delivery failed"),
            _ => {}
        }

        let status = self.status_code();
        let body = ErrorResponse {
            error: self.code(),
            message: self.public_message(),
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
}
