use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::AppState;
use super::controller;

pub fn auth_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", post(controller::login))
        .route("/register/{role}", post(controller::register))
        .route("/email-exists/{role}/{email}", get(controller::email_exists))
}
