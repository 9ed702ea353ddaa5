use chrono::{DateTime, Duration, Utc};

use crate::modules::accounts::model::Role;

pub const CODE_TTL_MINUTES: i64 = 15;

pub fn code_ttl() -> Duration {
    Duration::minutes(CODE_TTL_MINUTES)
}

#[derive(Debug, Clone)]
pub struct VerificationCode {
    pub id: String,
    pub email: String,
    pub role: Role,
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub created_at: DateTime<Utc>,
}

impl VerificationCode {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.used && now < self.expires_at
    }
}

/// Result of trying to consume a code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeConsumption {
    Consumed,
    Expired,
    /// Unknown, already used, or superseded by a newer code.
    Rejected,
}
