pub mod accounts;
pub mod admin;
pub mod auth;
pub mod extract;
pub mod password_reset;
pub mod verification;
