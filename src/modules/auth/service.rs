use uuid::Uuid;

use crate::errors::{ApiError, Result};
use crate::modules::accounts::{
    interface::AccountRepository,
    model::{Profile, Role, UserAccount},
};
use crate::services::{clock::Clock, hashing, jwt::JwtService};
use crate::AppState;

pub struct LoginResult {
    pub account: UserAccount,
    pub session_token: String,
    pub expires_in: i64,
}

pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub profile: Profile,
}

pub struct AuthService<'a> {
    accounts: &'a dyn AccountRepository,
    jwt_service: &'a JwtService,
    clock: &'a dyn Clock,
}

impl<'a> AuthService<'a> {
    pub fn new(accounts: &'a dyn AccountRepository, jwt_service: &'a JwtService, clock: &'a dyn Clock) -> Self {
        Self {
            accounts,
            jwt_service,
            clock,
        }
    }

    pub fn from_state(state: &'a AppState) -> Self {
        Self::new(state.store.accounts.as_ref(), &state.jwt_service, state.clock.as_ref())
    }

    /// Unknown email and wrong password both give `InvalidCredentials`.
    /// `PendingApproval` is only reported after the password checks out.
    pub async fn login(&self, email: &str, password: &str, role: Role) -> Result<LoginResult> {
        let account = self
            .accounts
            .find_by_email(role, email)
            .await?
            .ok_or(ApiError::InvalidCredentials)?;

        if !hashing::verify_password(password, &account.password_hash)? {
            return Err(ApiError::InvalidCredentials);
        }

        if !account.can_log_in() {
            return Err(ApiError::PendingApproval);
        }

        let session_token = self
            .jwt_service
            .create_session_token(&account.id, role)
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        tracing::info!(account_id = %account.id, role = %role, "login succeeded");

        Ok(LoginResult {
            account,
            session_token,
            expires_in: self.jwt_service.session_duration_secs(),
        })
    }

    pub async fn register(&self, role: Role, new: NewAccount) -> Result<UserAccount> {
        hashing::ensure_strong_enough(&new.password)?;

        if role.requires_approval() && new.profile.phone.as_deref().map_or(true, |p| p.trim().is_empty()) {
            return Err(ApiError::Validation("Phone number is required".to_string()));
        }

        if self.accounts.find_by_email(role, &new.email).await?.is_some() {
            return Err(ApiError::EmailAlreadyExists);
        }

        let account = UserAccount {
            id: Uuid::new_v4().to_string(),
            role,
            email: new.email,
            password_hash: hashing::hash_password(&new.password)?,
            profile: new.profile.for_role(role),
            approval_status: role.initial_status(),
            created_at: self.clock.now(),
        };

        self.accounts.create(&account).await?;

        tracing::info!(
            account_id = %account.id,
            role = %role,
            status = account.approval_status.as_str(),
            "account registered"
        );

        Ok(account)
    }

    pub async fn email_exists(&self, role: Role, email: &str) -> Result<bool> {
        Ok(self.accounts.find_by_email(role, email).await?.is_some())
    }

    /// Creates the bootstrap admin if no admin with that email exists yet.
    /// Returns whether an account was created.
    pub async fn ensure_admin(&self, email: &str, password: &str) -> Result<bool> {
        if self.email_exists(Role::Admin, email).await? {
            return Ok(false);
        }

        let profile = Profile {
            first_name: "Platform".to_string(),
            last_name: "Administrator".to_string(),
            ..Profile::default()
        };

        self.register(
            Role::Admin,
            NewAccount {
                email: email.to_string(),
                password: password.to_string(),
                profile,
            },
        )
        .await?;

        Ok(true)
    }
}
