use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::modules::accounts::model::Role;

#[derive(Debug, Deserialize, Validate)]
pub struct ResetRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct ResetRequestResponse {
    pub exists: bool,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct TokenValidResponse {
    pub valid: bool,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct TokenInvalidResponse {
    pub valid: bool,
    pub reason: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct ResetPasswordResponse {
    pub success: bool,
    pub message: &'static str,
}
