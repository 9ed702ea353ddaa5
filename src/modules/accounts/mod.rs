pub mod crud;
pub mod interface;
pub mod model;

pub use interface::AccountRepository;
pub use model::{ApprovalStatus, Profile, Role, UserAccount};
