use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::errors::{ApiError, Result};
use crate::modules::accounts::{
    interface::AccountRepository,
    model::{ApprovalStatus, RejectOutcome, Role, UserAccount},
};
use crate::modules::password_reset::{
    interface::PasswordResetRepository,
    model::{PasswordResetToken, Redemption, TokenState},
};
use crate::modules::verification::{
    interface::VerificationCodeRepository,
    model::{CodeConsumption, VerificationCode},
};

/// Emails compare the way the MySQL default collation does.
type IdentityKey = (Role, String);

fn key(role: Role, email: &str) -> IdentityKey {
    (role, email.to_ascii_lowercase())
}

#[derive(Default)]
struct Inner {
    accounts: HashMap<Role, Vec<UserAccount>>,
    codes: HashMap<IdentityKey, VerificationCode>,
    resets: HashMap<IdentityKey, PasswordResetToken>,
}

impl Inner {
    fn table(&self, role: Role) -> &[UserAccount] {
        self.accounts.get(&role).map(Vec::as_slice).unwrap_or(&[])
    }

    fn account_mut(&mut self, role: Role, email: &str) -> Option<&mut UserAccount> {
        self.accounts
            .get_mut(&role)?
            .iter_mut()
            .find(|a| a.email.eq_ignore_ascii_case(email))
    }
}

/// Process-local store used when no database is configured and by the
/// integration tests. A single lock guards every table, so the check and the
/// write of each operation happen as one step, like the conditional updates
/// of the MySQL store.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountRepository for MemoryStore {
    async fn create(&self, account: &UserAccount) -> Result<()> {
        let mut inner = self.inner.lock().await;
        let table = inner.accounts.entry(account.role).or_default();

        if table.iter().any(|a| a.email.eq_ignore_ascii_case(&account.email)) {
            return Err(ApiError::EmailAlreadyExists);
        }

        table.push(account.clone());
        Ok(())
    }

    async fn find_by_id(&self, role: Role, id: &str) -> Result<Option<UserAccount>> {
        let inner = self.inner.lock().await;
        Ok(inner.table(role).iter().find(|a| a.id == id).cloned())
    }

    async fn find_by_email(&self, role: Role, email: &str) -> Result<Option<UserAccount>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .table(role)
            .iter()
            .find(|a| a.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn approve(&self, role: Role, id: &str) -> Result<Option<UserAccount>> {
        if !role.requires_approval() {
            return Ok(None);
        }

        let mut inner = self.inner.lock().await;
        let Some(account) = inner
            .accounts
            .get_mut(&role)
            .and_then(|t| t.iter_mut().find(|a| a.id == id))
        else {
            return Ok(None);
        };

        account.approval_status = ApprovalStatus::Approved;
        Ok(Some(account.clone()))
    }

    async fn delete_pending(&self, role: Role, id: &str) -> Result<RejectOutcome> {
        let mut inner = self.inner.lock().await;
        let Some(table) = inner.accounts.get_mut(&role) else {
            return Ok(RejectOutcome::NotFound);
        };
        let Some(pos) = table.iter().position(|a| a.id == id) else {
            return Ok(RejectOutcome::NotFound);
        };

        if table[pos].approval_status != ApprovalStatus::Pending {
            return Ok(RejectOutcome::AlreadyApproved);
        }

        Ok(RejectOutcome::Deleted(table.remove(pos)))
    }

    async fn list_by_status(&self, role: Role, status: ApprovalStatus) -> Result<Vec<UserAccount>> {
        if !role.requires_approval() {
            return Ok(Vec::new());
        }

        let inner = self.inner.lock().await;
        let mut accounts: Vec<UserAccount> = inner
            .table(role)
            .iter()
            .filter(|a| a.approval_status == status)
            .cloned()
            .collect();

        accounts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(accounts)
    }

    async fn count(&self, role: Role, status: Option<ApprovalStatus>) -> Result<i64> {
        let inner = self.inner.lock().await;
        let n = inner
            .table(role)
            .iter()
            .filter(|a| status.map_or(true, |s| a.approval_status == s))
            .count();

        Ok(n as i64)
    }
}

#[async_trait]
impl VerificationCodeRepository for MemoryStore {
    async fn replace(&self, code: &VerificationCode) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.codes.insert(key(code.role, &code.email), code.clone());
        Ok(())
    }

    async fn consume(&self, email: &str, role: Role, code: &str, now: DateTime<Utc>) -> Result<CodeConsumption> {
        let mut inner = self.inner.lock().await;
        let Some(stored) = inner.codes.get_mut(&key(role, email)) else {
            return Ok(CodeConsumption::Rejected);
        };

        if stored.code != code || stored.used {
            return Ok(CodeConsumption::Rejected);
        }
        if now >= stored.expires_at {
            return Ok(CodeConsumption::Expired);
        }

        stored.used = true;
        Ok(CodeConsumption::Consumed)
    }

    async fn count_active(&self, email: &str, role: Role, now: DateTime<Utc>) -> Result<i64> {
        let inner = self.inner.lock().await;
        let active = inner
            .codes
            .get(&key(role, email))
            .is_some_and(|c| c.is_active(now));

        Ok(i64::from(active))
    }
}

#[async_trait]
impl PasswordResetRepository for MemoryStore {
    async fn replace(&self, token: &PasswordResetToken) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.resets.insert(key(token.role, &token.email), token.clone());
        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<PasswordResetToken>> {
        let inner = self.inner.lock().await;
        Ok(inner.resets.values().find(|t| t.token == token).cloned())
    }

    async fn redeem(&self, token: &str, password_hash: &str, now: DateTime<Utc>) -> Result<Redemption> {
        let mut inner = self.inner.lock().await;

        let Some(record) = inner.resets.values().find(|t| t.token == token).cloned() else {
            return Ok(Redemption::Rejected);
        };

        match record.state(now) {
            TokenState::Active => {}
            TokenState::Expired => return Ok(Redemption::Expired),
            TokenState::Used => return Ok(Redemption::Rejected),
        }

        // Both writes land under the same lock, so neither is visible alone.
        let Some(account) = inner.account_mut(record.role, &record.email) else {
            return Ok(Redemption::Rejected);
        };
        account.password_hash = password_hash.to_string();

        if let Some(stored) = inner.resets.get_mut(&key(record.role, &record.email)) {
            stored.used = true;
        }

        Ok(Redemption::Redeemed { role: record.role })
    }

    async fn count_active(&self, email: &str, role: Role, now: DateTime<Utc>) -> Result<i64> {
        let inner = self.inner.lock().await;
        let active = inner
            .resets
            .get(&key(role, email))
            .is_some_and(|t| t.state(now) == TokenState::Active);

        Ok(i64::from(active))
    }
}
