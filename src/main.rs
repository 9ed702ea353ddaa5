use std::sync::Arc;

use telemed_auth::config::{environment::Config, init_db};
use telemed_auth::modules::auth::service::AuthService;
use telemed_auth::services::{clock::SystemClock, jwt::JwtService, notifier};
use telemed_auth::store::Repositories;
use telemed_auth::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "telemed_auth=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().expect("Failed to load environment configuration");

    let store = match &config.database_url {
        Some(url) => {
            let db = init_db(url).await.expect("Failed to connect to MySQL");
            tracing::info!("Connected to MySQL");
            Repositories::mysql(db)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store (data is lost on restart)");
            Repositories::in_memory()
        }
    };

    let state = Arc::new(AppState {
        store,
        notifier: notifier::from_config(&config),
        jwt_service: JwtService::new(config.jwt_secret.clone()),
        clock: Arc::new(SystemClock),
    });

    if let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) {
        match AuthService::from_state(&state).ensure_admin(email, password).await {
            Ok(true) => tracing::info!(admin_email = %email, "bootstrap admin created"),
            Ok(false) => tracing::debug!(admin_email = %email, "bootstrap admin already present"),
            Err(e) => tracing::error!(error = %e, "failed to create bootstrap admin"),
        }
    }

    let app = telemed_auth::create_app(state).await;

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind listen address");
    tracing::info!("Server running on http://{}", config.bind_addr);
    axum::serve(listener, app).await.expect("Server error");
}
