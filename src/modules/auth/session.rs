use axum::{
    extract::{FromRequestParts, Path},
    http::{header, request::Parts, HeaderMap},
};
use std::sync::Arc;

use crate::errors::ApiError;
use crate::modules::accounts::model::Role;
use crate::services::jwt::{JwtService, SessionClaims};
use crate::AppState;

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Verifies the bearer session token. Missing, malformed and expired tokens
/// are all `Unauthenticated`.
pub fn authenticate(headers: &HeaderMap, jwt_service: &JwtService) -> Result<SessionClaims, ApiError> {
    let token = bearer_token(headers).ok_or(ApiError::Unauthenticated)?;

    jwt_service
        .verify_session_token(token)
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!(error = %e, "rejected session token");
            ApiError::Unauthenticated
        })
}

/// Extractor for routes reserved to administrators.
pub struct AdminSession(pub SessionClaims);

impl FromRequestParts<Arc<AppState>> for AdminSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let claims = authenticate(&parts.headers, &state.jwt_service)?;

        if claims.role != Role::Admin {
            return Err(ApiError::Forbidden);
        }

        Ok(Self(claims))
    }
}

/// Role taken from the `{role}` path segment of a registration route.
/// Creating an admin needs an admin session, checked before the body is read.
pub struct RegistrationRole(pub Role);

impl FromRequestParts<Arc<AppState>> for RegistrationRole {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::Validation(rejection.body_text()))?;

        let role: Role = raw.parse()?;
        if role == Role::Admin {
            AdminSession::from_request_parts(parts, state).await?;
        }

        Ok(Self(role))
    }
}
