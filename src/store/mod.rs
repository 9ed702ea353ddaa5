pub mod memory;

use std::sync::Arc;

use crate::config::DbPool;
use crate::modules::accounts::{crud::AccountCrud, interface::AccountRepository};
use crate::modules::password_reset::{crud::PasswordResetCrud, interface::PasswordResetRepository};
use crate::modules::verification::{crud::VerificationCodeCrud, interface::VerificationCodeRepository};

pub use memory::MemoryStore;

/// The three persistence seams used by the services.
#[derive(Clone)]
pub struct Repositories {
    pub accounts: Arc<dyn AccountRepository>,
    pub codes: Arc<dyn VerificationCodeRepository>,
    pub resets: Arc<dyn PasswordResetRepository>,
}

impl Repositories {
    pub fn mysql(pool: DbPool) -> Self {
        Self {
            accounts: Arc::new(AccountCrud::new(pool.clone())),
            codes: Arc::new(VerificationCodeCrud::new(pool.clone())),
            resets: Arc::new(PasswordResetCrud::new(pool)),
        }
    }

    /// All three seams share one store so a password reset can update the
    /// account and the token together.
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            accounts: store.clone(),
            codes: store.clone(),
            resets: store,
        }
    }
}
