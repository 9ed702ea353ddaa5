use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::{CodeConsumption, VerificationCode};
use crate::errors::Result;
use crate::modules::accounts::model::Role;

#[async_trait]
pub trait VerificationCodeRepository: Send + Sync {
    /// Stores `code` as the only code for its (email, role), replacing any
    /// previous one in a single atomic step.
    async fn replace(&self, code: &VerificationCode) -> Result<()>;

    /// Marks the matching unused, unexpired code as used. The check and the
    /// mark happen atomically, so concurrent callers cannot both succeed.
    async fn consume(&self, email: &str, role: Role, code: &str, now: DateTime<Utc>) -> Result<CodeConsumption>;

    async fn count_active(&self, email: &str, role: Role, now: DateTime<Utc>) -> Result<i64>;
}
