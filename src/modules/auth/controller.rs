use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::schema::{EmailExistsResponse, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, UserSummary};
use super::service::{AuthService, NewAccount};
use super::session::RegistrationRole;
use crate::errors::ApiError;
use crate::modules::accounts::model::Role;
use crate::modules::extract::ValidatedJson;
use crate::AppState;

// =============================================================================
// POST /api/login
// =============================================================================

pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let role: Role = req.role.parse()?;

    let result = AuthService::from_state(&state)
        .login(&req.email, &req.password, role)
        .await?;

    Ok(Json(LoginResponse {
        session_token: result.session_token,
        token_type: "Bearer",
        expires_in: result.expires_in,
        user: UserSummary::from(&result.account),
    }))
}

// =============================================================================
// POST /api/register/{role}
// =============================================================================

pub async fn register(
    State(state): State<Arc<AppState>>,
    RegistrationRole(role): RegistrationRole,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let account = AuthService::from_state(&state)
        .register(
            role,
            NewAccount {
                email: req.email.clone(),
                password: req.password.clone(),
                profile: req.profile(),
            },
        )
        .await?;

    let message = if role.requires_approval() {
        "Account created, awaiting administrator approval"
    } else {
        "Account created"
    };

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user: UserSummary::from(&account),
            message,
        }),
    ))
}

// =============================================================================
// GET /api/email-exists/{role}/{email}
// =============================================================================

pub async fn email_exists(
    State(state): State<Arc<AppState>>,
    Path((role, email)): Path<(String, String)>,
) -> Result<Json<EmailExistsResponse>, ApiError> {
    let role: Role = role.parse()?;

    let exists = AuthService::from_state(&state)
        .email_exists(role, &email)
        .await?;

    Ok(Json(EmailExistsResponse { exists }))
}
