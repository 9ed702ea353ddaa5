use axum::{routing::post, Router};
use std::sync::Arc;

use crate::AppState;
use super::controller;

pub fn verification_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/verification/send-code", post(controller::send_code))
        .route("/verification/verify-code", post(controller::verify_code))
}
