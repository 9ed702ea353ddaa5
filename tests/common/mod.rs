use async_trait::async_trait;
use axum_test::{TestResponse, TestServer};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use telemed_auth::modules::accounts::model::Role;
use telemed_auth::modules::auth::service::AuthService;
use telemed_auth::services::clock::ManualClock;
use telemed_auth::services::jwt::JwtService;
use telemed_auth::services::notifier::{Notifier, NotifyError};
use telemed_auth::store::Repositories;
use telemed_auth::AppState;

pub const ADMIN_EMAIL: &str = "admin@telemed.test";

#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentMail {
    Code { email: String, code: String, role: Role },
    ResetLink { email: String, token: String, role: Role },
}

/// Notifier that keeps every message in memory and can be switched to fail.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentMail>>,
    failing: AtomicBool,
}

#[allow(dead_code)]
impl RecordingNotifier {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last_code(&self, email: &str) -> Option<String> {
        self.sent().into_iter().rev().find_map(|m| match m {
            SentMail::Code { email: e, code, .. } if e == email => Some(code),
            _ => None,
        })
    }

    pub fn last_reset_token(&self, email: &str) -> Option<String> {
        self.sent().into_iter().rev().find_map(|m| match m {
            SentMail::ResetLink { email: e, token, .. } if e == email => Some(token),
            _ => None,
        })
    }

    fn record(&self, mail: SentMail) -> Result<(), NotifyError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError::Transport("connection refused".to_string()));
        }
        self.sent.lock().unwrap().push(mail);
        Ok(())
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_verification(&self, email: &str, code: &str, role: Role) -> Result<(), NotifyError> {
        self.record(SentMail::Code {
            email: email.to_string(),
            code: code.to_string(),
            role,
        })
    }

    async fn send_reset_link(&self, email: &str, token: &str, role: Role) -> Result<(), NotifyError> {
        self.record(SentMail::ResetLink {
            email: email.to_string(),
            token: token.to_string(),
            role,
        })
    }
}

// Allow dead_code for utilities used by other test files
#[allow(dead_code)]
pub struct TestContext {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub notifier: Arc<RecordingNotifier>,
    pub clock: Arc<ManualClock>,
}

#[allow(dead_code)]
impl TestContext {
    pub async fn new() -> Self {
        let notifier = Arc::new(RecordingNotifier::default());
        let clock = Arc::new(ManualClock::new(Utc::now()));

        let state = Arc::new(AppState {
            store: Repositories::in_memory(),
            notifier: notifier.clone(),
            jwt_service: JwtService::new("test-secret-key-for-testing-only".to_string()),
            clock: clock.clone(),
        });

        let app = telemed_auth::create_app(state.clone()).await;
        let server = TestServer::new(app).expect("Failed to create test server");

        Self {
            server,
            state,
            notifier,
            clock,
        }
    }

    pub async fn register(&self, role: &str, email: &str) -> TestResponse {
        self.server
            .post(&format!("/api/register/{role}"))
            .json(&register_body(email))
            .await
    }

    pub async fn login(&self, email: &str, password: &str, role: &str) -> TestResponse {
        self.server
            .post("/api/login")
            .json(&json!({
                "email": email,
                "password": password,
                "role": role
            }))
            .await
    }

    /// Registers and returns the new account id.
    pub async fn register_id(&self, role: &str, email: &str) -> String {
        let response = self.register(role, email).await;
        let body: Value = response.json();
        body["user"]["id"].as_str().expect("register returned no id").to_string()
    }

    /// Provisions the bootstrap admin and returns a session token for it.
    pub async fn admin_token(&self) -> String {
        AuthService::from_state(&self.state)
            .ensure_admin(ADMIN_EMAIL, test_password())
            .await
            .expect("Failed to create admin");

        let body: Value = self.login(ADMIN_EMAIL, test_password(), "admin").await.json();
        body["sessionToken"].as_str().expect("admin login failed").to_string()
    }

    pub async fn approve(&self, role: &str, id: &str) -> TestResponse {
        let token = self.admin_token().await;
        self.server
            .put(&format!("/api/approve/{role}/{id}"))
            .authorization_bearer(token)
            .await
    }
}

#[allow(dead_code)]
pub fn register_body(email: &str) -> Value {
    json!({
        "email": email,
        "password": test_password(),
        "first_name": "Camille",
        "last_name": "Martin",
        "phone": "+33600000000",
        "sex": "F",
        "country": "France",
        "city": "Lyon",
        "specialty": "Cardiology",
        "rpps": "10101010101",
        "hospital_address": "1 Place de l'Hopital, Lyon",
        "position": "Reception",
        "department": "Cardiology"
    })
}

// Helper to generate unique test email
#[allow(dead_code)]
pub fn test_email() -> String {
    format!("test_{}@example.com", uuid::Uuid::new_v4())
}

// Helper to generate test password
#[allow(dead_code)]
pub fn test_password() -> &'static str {
    "TestPassword123!"
}
