use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct SendCodeRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub role: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendCodeResponse {
    pub message: &'static str,
    pub expires_in_minutes: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct VerifyCodeRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Code is required"))]
    pub code: String,
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyCodeResponse {
    pub message: &'static str,
    pub verified: bool,
}
