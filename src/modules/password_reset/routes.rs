use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::AppState;
use super::controller;

pub fn password_reset_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/password-reset/request", post(controller::request_reset))
        .route("/password-reset/verify-token/{token}", get(controller::verify_token))
        .route("/password-reset/reset", post(controller::reset_password))
}
