use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use super::model::TokenCheck;
use super::schema::{
    ResetPasswordRequest, ResetPasswordResponse, ResetRequest, ResetRequestResponse, TokenInvalidResponse,
    TokenValidResponse,
};
use super::service::PasswordResetService;
use crate::errors::ApiError;
use crate::modules::accounts::model::Role;
use crate::modules::extract::ValidatedJson;
use crate::AppState;

// =============================================================================
// POST /api/password-reset/request
// =============================================================================

pub async fn request_reset(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<ResetRequest>,
) -> Result<Json<ResetRequestResponse>, ApiError> {
    let role: Role = req.role.parse()?;

    let exists = PasswordResetService::from_state(&state)
        .request_reset(&req.email, role)
        .await?;

    let message = if exists {
        "A reset link has been sent to your email"
    } else {
        "No account with this email for this role"
    };

    Ok(Json(ResetRequestResponse { exists, message }))
}

// =============================================================================
// GET /api/password-reset/verify-token/{token}
// =============================================================================

pub async fn verify_token(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<Response, ApiError> {
    let check = PasswordResetService::from_state(&state)
        .verify_token(&token)
        .await?;

    let response = match check {
        TokenCheck::Valid { email, role } => Json(TokenValidResponse {
            valid: true,
            email,
            role,
        })
        .into_response(),
        TokenCheck::Missing | TokenCheck::Used => (
            StatusCode::BAD_REQUEST,
            Json(TokenInvalidResponse {
                valid: false,
                reason: "invalid",
                message: "Link is invalid or already used",
            }),
        )
            .into_response(),
        TokenCheck::Expired => (
            StatusCode::BAD_REQUEST,
            Json(TokenInvalidResponse {
                valid: false,
                reason: "expired",
                message: "Link expired, request a new one",
            }),
        )
            .into_response(),
    };

    Ok(response)
}

// =============================================================================
// POST /api/password-reset/reset
// =============================================================================

pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<ResetPasswordRequest>,
) -> Result<Json<ResetPasswordResponse>, ApiError> {
    PasswordResetService::from_state(&state)
        .reset_password(&req.token, &req.new_password)
        .await?;

    Ok(Json(ResetPasswordResponse {
        success: true,
        message: "Password has been reset",
    }))
}
