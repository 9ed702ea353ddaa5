use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use super::schema::{ApprovalResponse, StatsResponse};
use super::service::ApprovalWorkflow;
use crate::errors::ApiError;
use crate::modules::accounts::model::Role;
use crate::modules::auth::{schema::UserSummary, session::AdminSession};
use crate::AppState;

// =============================================================================
// PUT /api/approve/{role}/{id}
// =============================================================================

pub async fn approve(
    State(state): State<Arc<AppState>>,
    AdminSession(admin): AdminSession,
    Path((role, id)): Path<(String, String)>,
) -> Result<Json<ApprovalResponse>, ApiError> {
    let role: Role = role.parse()?;

    let account = ApprovalWorkflow::from_state(&state).approve(role, &id).await?;
    tracing::debug!(admin_id = %admin.sub, account_id = %id, "approve handled");

    Ok(Json(ApprovalResponse {
        message: format!("{} approved", role.label()),
        user: UserSummary::from(&account),
    }))
}

// =============================================================================
// DELETE /api/reject/{role}/{id}
// =============================================================================

pub async fn reject(
    State(state): State<Arc<AppState>>,
    AdminSession(admin): AdminSession,
    Path((role, id)): Path<(String, String)>,
) -> Result<Json<ApprovalResponse>, ApiError> {
    let role: Role = role.parse()?;

    let account = ApprovalWorkflow::from_state(&state).reject(role, &id).await?;
    tracing::debug!(admin_id = %admin.sub, account_id = %id, "reject handled");

    Ok(Json(ApprovalResponse {
        message: format!("{} rejected and removed", role.label()),
        user: UserSummary::from(&account),
    }))
}

// =============================================================================
// GET /api/admin/pending/{role}
// =============================================================================

pub async fn list_pending(
    State(state): State<Arc<AppState>>,
    _admin: AdminSession,
    Path(role): Path<String>,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    let role: Role = role.parse()?;

    let accounts = ApprovalWorkflow::from_state(&state).list_pending(role).await?;

    Ok(Json(accounts.iter().map(UserSummary::from).collect()))
}

// =============================================================================
// GET /api/admin/doctors, GET /api/admin/secretaries
// =============================================================================

pub async fn list_doctors(
    State(state): State<Arc<AppState>>,
    _admin: AdminSession,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    list_approved(&state, Role::Doctor).await
}

pub async fn list_secretaries(
    State(state): State<Arc<AppState>>,
    _admin: AdminSession,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    list_approved(&state, Role::Secretary).await
}

async fn list_approved(state: &AppState, role: Role) -> Result<Json<Vec<UserSummary>>, ApiError> {
    let accounts = ApprovalWorkflow::from_state(state).list_approved(role).await?;
    Ok(Json(accounts.iter().map(UserSummary::from).collect()))
}

// =============================================================================
// GET /api/admin/stats
// =============================================================================

pub async fn stats(
    State(state): State<Arc<AppState>>,
    _admin: AdminSession,
) -> Result<Json<StatsResponse>, ApiError> {
    let stats = ApprovalWorkflow::from_state(&state).stats().await?;
    Ok(Json(stats.into()))
}
