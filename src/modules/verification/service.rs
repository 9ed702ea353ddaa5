use uuid::Uuid;

use super::interface::VerificationCodeRepository;
use super::model::{code_ttl, CodeConsumption, VerificationCode};
use crate::errors::{ApiError, Result};
use crate::modules::accounts::model::Role;
use crate::services::{clock::Clock, notifier::Notifier, tokens};
use crate::AppState;

pub struct VerificationService<'a> {
    codes: &'a dyn VerificationCodeRepository,
    notifier: &'a dyn Notifier,
    clock: &'a dyn Clock,
}

impl<'a> VerificationService<'a> {
    pub fn new(codes: &'a dyn VerificationCodeRepository, notifier: &'a dyn Notifier, clock: &'a dyn Clock) -> Self {
        Self { codes, notifier, clock }
    }

    pub fn from_state(state: &'a AppState) -> Self {
        Self::new(state.store.codes.as_ref(), state.notifier.as_ref(), state.clock.as_ref())
    }

    /// Issues a fresh code for (email, role), superseding any earlier one,
    /// then emails it. The row is written before delivery; if delivery fails
    /// the row stays behind unused and the next request replaces it.
    pub async fn request_code(&self, email: &str, role: Role) -> Result<()> {
        ensure_accepts_codes(role)?;

        let now = self.clock.now();
        let record = VerificationCode {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role,
            code: tokens::generate_verification_code(),
            expires_at: now + code_ttl(),
            used: false,
            created_at: now,
        };

        self.codes.replace(&record).await?;

        self.notifier
            .send_verification(email, &record.code, role)
            .await
            .map_err(|e| ApiError::DeliveryFailed(e.to_string()))?;

        tracing::info!(role = %role, "verification code issued");
        Ok(())
    }

    pub async fn verify_code(&self, email: &str, code: &str, role: Role) -> Result<()> {
        ensure_accepts_codes(role)?;

        match self.codes.consume(email, role, code, self.clock.now()).await? {
            CodeConsumption::Consumed => {
                tracing::info!(role = %role, "verification code accepted");
                Ok(())
            }
            CodeConsumption::Expired => Err(ApiError::CodeExpired),
            CodeConsumption::Rejected => Err(ApiError::InvalidOrUsedCode),
        }
    }
}

fn ensure_accepts_codes(role: Role) -> Result<()> {
    if role.accepts_verification_codes() {
        Ok(())
    } else {
        Err(ApiError::InvalidRole(role.to_string()))
    }
}
