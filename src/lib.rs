pub mod config;
pub mod errors;
pub mod modules;
pub mod services;
pub mod store;

use axum::{middleware, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use modules::{
    admin::admin_routes, auth::auth_routes, password_reset::password_reset_routes,
    verification::verification_routes,
};
use services::clock::Clock;
use services::jwt::JwtService;
use services::notifier::Notifier;
use services::security::security_headers;
use store::Repositories;

pub struct AppState {
    pub store: Repositories,
    pub notifier: Arc<dyn Notifier>,
    pub jwt_service: JwtService,
    pub clock: Arc<dyn Clock>,
}

pub async fn create_app(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .merge(auth_routes())
        .merge(verification_routes())
        .merge(password_reset_routes())
        .merge(admin_routes());

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api", api)
        .layer(middleware::from_fn(security_headers))
        .layer(RequestBodyLimitLayer::new(1024 * 100)) // 100KB max body
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn root() -> &'static str {
    "Telemedicine Auth API"
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
