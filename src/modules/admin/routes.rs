use axum::{
    routing::{delete, get, put},
    Router,
};
use std::sync::Arc;

use crate::AppState;
use super::controller;

pub fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/approve/{role}/{id}", put(controller::approve))
        .route("/reject/{role}/{id}", delete(controller::reject))
        .route("/admin/pending/{role}", get(controller::list_pending))
        .route("/admin/doctors", get(controller::list_doctors))
        .route("/admin/secretaries", get(controller::list_secretaries))
        .route("/admin/stats", get(controller::stats))
}
