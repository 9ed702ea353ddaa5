use crate::errors::{ApiError, Result};
use crate::modules::accounts::{
    interface::AccountRepository,
    model::{ApprovalStatus, RejectOutcome, Role, UserAccount},
};
use crate::AppState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stats {
    pub total_patients: i64,
    pub total_doctors: i64,
    pub total_secretaries: i64,
    pub total_pending: i64,
}

/// `pending --approve--> approved`, `pending --reject--> (deleted)`.
/// Nothing leaves `approved`.
pub struct ApprovalWorkflow<'a> {
    accounts: &'a dyn AccountRepository,
}

impl<'a> ApprovalWorkflow<'a> {
    pub fn new(accounts: &'a dyn AccountRepository) -> Self {
        Self { accounts }
    }

    pub fn from_state(state: &'a AppState) -> Self {
        Self::new(state.store.accounts.as_ref())
    }

    /// Re-approving an approved account succeeds without change.
    pub async fn approve(&self, role: Role, id: &str) -> Result<UserAccount> {
        ensure_gated(role)?;

        let account = self
            .accounts
            .approve(role, id)
            .await?
            .ok_or(ApiError::NotFound)?;

        tracing::info!(account_id = %id, role = %role, "account approved");
        Ok(account)
    }

    pub async fn reject(&self, role: Role, id: &str) -> Result<UserAccount> {
        ensure_gated(role)?;

        match self.accounts.delete_pending(role, id).await? {
            RejectOutcome::Deleted(account) => {
                tracing::info!(account_id = %id, role = %role, "account rejected and removed");
                Ok(account)
            }
            RejectOutcome::NotFound => Err(ApiError::NotFound),
            RejectOutcome::AlreadyApproved => Err(ApiError::InvalidTransition),
        }
    }

    pub async fn list_pending(&self, role: Role) -> Result<Vec<UserAccount>> {
        ensure_gated(role)?;
        self.accounts.list_by_status(role, ApprovalStatus::Pending).await
    }

    pub async fn list_approved(&self, role: Role) -> Result<Vec<UserAccount>> {
        ensure_gated(role)?;
        self.accounts.list_by_status(role, ApprovalStatus::Approved).await
    }

    pub async fn stats(&self) -> Result<Stats> {
        let total_patients = self.accounts.count(Role::Patient, None).await?;
        let total_doctors = self
            .accounts
            .count(Role::Doctor, Some(ApprovalStatus::Approved))
            .await?;
        let total_secretaries = self
            .accounts
            .count(Role::Secretary, Some(ApprovalStatus::Approved))
            .await?;
        let total_pending = self
            .accounts
            .count(Role::Doctor, Some(ApprovalStatus::Pending))
            .await?
            + self
                .accounts
                .count(Role::Secretary, Some(ApprovalStatus::Pending))
                .await?;

        Ok(Stats {
            total_patients,
            total_doctors,
            total_secretaries,
            total_pending,
        })
    }
}

fn ensure_gated(role: Role) -> Result<()> {
    if role.requires_approval() {
        Ok(())
    } else {
        Err(ApiError::InvalidRole(role.to_string()))
    }
}
