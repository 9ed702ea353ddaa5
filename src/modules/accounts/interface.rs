use async_trait::async_trait;

use super::model::{ApprovalStatus, RejectOutcome, Role, UserAccount};
use crate::errors::Result;

/// Role-parameterised access to the per-role account tables.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Fails with `EmailAlreadyExists` when the email is taken within the role.
    async fn create(&self, account: &UserAccount) -> Result<()>;
    async fn find_by_id(&self, role: Role, id: &str) -> Result<Option<UserAccount>>;
    async fn find_by_email(&self, role: Role, email: &str) -> Result<Option<UserAccount>>;
    /// Sets the status to approved and returns the account, `None` if absent.
    async fn approve(&self, role: Role, id: &str) -> Result<Option<UserAccount>>;
    /// Deletes the account only while it is still pending.
    async fn delete_pending(&self, role: Role, id: &str) -> Result<RejectOutcome>;
    /// Empty for roles without an approval step.
    async fn list_by_status(&self, role: Role, status: ApprovalStatus) -> Result<Vec<UserAccount>>;
    /// `None` counts every account of the role.
    async fn count(&self, role: Role, status: Option<ApprovalStatus>) -> Result<i64>;
}
