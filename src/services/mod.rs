pub mod clock;
pub mod hashing;
pub mod jwt;
pub mod notifier;
pub mod security;
pub mod tokens;
