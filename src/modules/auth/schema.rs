use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::modules::accounts::model::{ApprovalStatus, Profile, Role, UserAccount};

// =============================================================================
// REGISTER
// =============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub password: String,
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub rpps: Option<String>,
    #[serde(default)]
    pub hospital_address: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
}

impl RegisterRequest {
    pub fn profile(&self) -> Profile {
        Profile {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            phone: self.phone.clone(),
            sex: self.sex.clone(),
            country: self.country.clone(),
            city: self.city.clone(),
            specialty: self.specialty.clone(),
            rpps: self.rpps.clone(),
            hospital_address: self.hospital_address.clone(),
            position: self.position.clone(),
            department: self.department.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: UserSummary,
    pub message: &'static str,
}

// =============================================================================
// LOGIN
// =============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    pub role: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub session_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user: UserSummary,
}

// =============================================================================
// EMAIL EXISTS
// =============================================================================

#[derive(Debug, Serialize)]
pub struct EmailExistsResponse {
    pub exists: bool,
}

// =============================================================================
// USER SUMMARY
// =============================================================================

/// Public view of an account. Role-specific fields are omitted when empty and
/// the password hash is never part of it.
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: String,
    pub email: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpps: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hospital_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_status: Option<ApprovalStatus>,
    pub created_at: DateTime<Utc>,
}

impl From<&UserAccount> for UserSummary {
    fn from(account: &UserAccount) -> Self {
        let p = &account.profile;
        Self {
            id: account.id.clone(),
            email: account.email.clone(),
            role: account.role,
            first_name: p.first_name.clone(),
            last_name: p.last_name.clone(),
            phone: p.phone.clone(),
            sex: p.sex.clone(),
            country: p.country.clone(),
            city: p.city.clone(),
            specialty: p.specialty.clone(),
            rpps: p.rpps.clone(),
            hospital_address: p.hospital_address.clone(),
            position: p.position.clone(),
            department: p.department.clone(),
            approval_status: account
                .role
                .requires_approval()
                .then_some(account.approval_status),
            created_at: account.created_at,
        }
    }
}
