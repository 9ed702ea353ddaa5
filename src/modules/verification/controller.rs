use axum::{extract::State, Json};
use std::sync::Arc;

use super::model::CODE_TTL_MINUTES;
use super::schema::{SendCodeRequest, SendCodeResponse, VerifyCodeRequest, VerifyCodeResponse};
use super::service::VerificationService;
use crate::errors::ApiError;
use crate::modules::accounts::model::Role;
use crate::modules::extract::ValidatedJson;
use crate::AppState;

// =============================================================================
// POST /api/verification/send-code
// =============================================================================

pub async fn send_code(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<SendCodeRequest>,
) -> Result<Json<SendCodeResponse>, ApiError> {
    let role: Role = req.role.parse()?;

    VerificationService::from_state(&state)
        .request_code(&req.email, role)
        .await?;

    Ok(Json(SendCodeResponse {
        message: "Verification code sent",
        expires_in_minutes: CODE_TTL_MINUTES,
    }))
}

// =============================================================================
// POST /api/verification/verify-code
// =============================================================================

pub async fn verify_code(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<VerifyCodeRequest>,
) -> Result<Json<VerifyCodeResponse>, ApiError> {
    let role: Role = req.role.parse()?;

    VerificationService::from_state(&state)
        .verify_code(&req.email, req.code.trim(), role)
        .await?;

    Ok(Json(VerifyCodeResponse {
        message: "Code verified",
        verified: true,
    }))
}
