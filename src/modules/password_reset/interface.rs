use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::{PasswordResetToken, Redemption};
use crate::errors::Result;
use crate::modules::accounts::model::Role;

#[async_trait]
pub trait PasswordResetRepository: Send + Sync {
    /// Stores `token` as the only reset token for its (email, role).
    async fn replace(&self, token: &PasswordResetToken) -> Result<()>;

    /// Tokens are globally unique; email and role come from the record.
    async fn find_by_token(&self, token: &str) -> Result<Option<PasswordResetToken>>;

    /// Marks the token used and stores the new password hash on the owning
    /// account. Both writes commit together or not at all, and only one
    /// concurrent caller can redeem a given token.
    async fn redeem(&self, token: &str, password_hash: &str, now: DateTime<Utc>) -> Result<Redemption>;

    async fn count_active(&self, email: &str, role: Role, now: DateTime<Utc>) -> Result<i64>;
}
