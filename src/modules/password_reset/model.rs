use chrono::{DateTime, Duration, Utc};
use sqlx::FromRow;

use crate::errors::ApiError;
use crate::modules::accounts::model::Role;

pub fn reset_ttl() -> Duration {
    Duration::hours(1)
}

#[derive(Debug, Clone)]
pub struct PasswordResetToken {
    pub id: String,
    pub email: String,
    pub role: Role,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub created_at: DateTime<Utc>,
}

impl PasswordResetToken {
    pub fn state(&self, now: DateTime<Utc>) -> TokenState {
        if self.used {
            TokenState::Used
        } else if now >= self.expires_at {
            TokenState::Expired
        } else {
            TokenState::Active
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct PasswordResetRow {
    pub id: String,
    pub email: String,
    pub role: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<PasswordResetRow> for PasswordResetToken {
    type Error = ApiError;

    fn try_from(row: PasswordResetRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse::<Role>()
            .map_err(|_| ApiError::Internal(format!("stored reset token has unknown role '{}'", row.role)))?;

        Ok(Self {
            id: row.id,
            email: row.email,
            role,
            token: row.token,
            expires_at: row.expires_at,
            used: row.used,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    Active,
    Used,
    Expired,
}

/// What a lookup of a reset token found. `Missing` and `Used` are kept apart
/// internally but reported identically to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenCheck {
    Valid { email: String, role: Role },
    Missing,
    Used,
    Expired,
}

impl TokenCheck {
    pub fn into_result(self) -> Result<(String, Role), ApiError> {
        match self {
            TokenCheck::Valid { email, role } => Ok((email, role)),
            TokenCheck::Missing | TokenCheck::Used => Err(ApiError::InvalidToken),
            TokenCheck::Expired => Err(ApiError::TokenExpired),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redemption {
    /// Password updated and token marked used, as one unit.
    Redeemed { role: Role },
    Expired,
    /// Unknown, already used, or the account behind it no longer exists.
    Rejected,
}
