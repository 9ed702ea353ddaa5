use uuid::Uuid;

use super::interface::PasswordResetRepository;
use super::model::{reset_ttl, PasswordResetToken, Redemption, TokenCheck, TokenState};
use crate::errors::{ApiError, Result};
use crate::modules::accounts::{interface::AccountRepository, model::Role};
use crate::services::{clock::Clock, hashing, notifier::Notifier, tokens};
use crate::AppState;

pub struct PasswordResetService<'a> {
    accounts: &'a dyn AccountRepository,
    resets: &'a dyn PasswordResetRepository,
    notifier: &'a dyn Notifier,
    clock: &'a dyn Clock,
}

impl<'a> PasswordResetService<'a> {
    pub fn new(
        accounts: &'a dyn AccountRepository,
        resets: &'a dyn PasswordResetRepository,
        notifier: &'a dyn Notifier,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            accounts,
            resets,
            notifier,
            clock,
        }
    }

    pub fn from_state(state: &'a AppState) -> Self {
        Self::new(
            state.store.accounts.as_ref(),
            state.store.resets.as_ref(),
            state.notifier.as_ref(),
            state.clock.as_ref(),
        )
    }

    /// Returns whether an account exists for (email, role). When it does, a
    /// new token replaces any earlier one and the link is emailed.
    pub async fn request_reset(&self, email: &str, role: Role) -> Result<bool> {
        if self.accounts.find_by_email(role, email).await?.is_none() {
            tracing::info!(role = %role, "password reset requested for unknown account");
            return Ok(false);
        }

        let now = self.clock.now();
        let record = PasswordResetToken {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role,
            token: tokens::generate_reset_token(),
            expires_at: now + reset_ttl(),
            used: false,
            created_at: now,
        };

        self.resets.replace(&record).await?;

        self.notifier
            .send_reset_link(email, &record.token, role)
            .await
            .map_err(|e| ApiError::DeliveryFailed(e.to_string()))?;

        tracing::info!(role = %role, "password reset token issued");
        Ok(true)
    }

    pub async fn verify_token(&self, token: &str) -> Result<TokenCheck> {
        let Some(record) = self.resets.find_by_token(token).await? else {
            return Ok(TokenCheck::Missing);
        };

        Ok(match record.state(self.clock.now()) {
            TokenState::Active => TokenCheck::Valid {
                email: record.email,
                role: record.role,
            },
            TokenState::Used => TokenCheck::Used,
            TokenState::Expired => TokenCheck::Expired,
        })
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<()> {
        self.verify_token(token).await?.into_result()?;
        hashing::ensure_strong_enough(new_password)?;

        let password_hash = hashing::hash_password(new_password)?;

        match self.resets.redeem(token, &password_hash, self.clock.now()).await? {
            Redemption::Redeemed { role } => {
                tracing::info!(role = %role, "password reset completed");
                Ok(())
            }
            Redemption::Expired => Err(ApiError::TokenExpired),
            Redemption::Rejected => Err(ApiError::InvalidToken),
        }
    }
}
