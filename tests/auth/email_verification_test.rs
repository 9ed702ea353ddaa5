use axum::http::StatusCode;
use chrono::Duration;
use serde_json::{json, Value};

use telemed_auth::modules::accounts::model::Role;
use telemed_auth::modules::verification::interface::VerificationCodeRepository;
use telemed_auth::modules::verification::model::CODE_TTL_MINUTES;
use telemed_auth::services::clock::Clock;

use crate::common::{test_email, TestContext};

async fn send_code(ctx: &TestContext, email: &str, role: &str) -> axum_test::TestResponse {
    ctx.server
        .post("/api/verification/send-code")
        .json(&json!({ "email": email, "role": role }))
        .await
}

async fn verify_code(ctx: &TestContext, email: &str, code: &str, role: &str) -> axum_test::TestResponse {
    ctx.server
        .post("/api/verification/verify-code")
        .json(&json!({ "email": email, "code": code, "role": role }))
        .await
}

#[tokio::test]
async fn send_code_emails_a_six_digit_code() {
    let ctx = TestContext::new().await;
    let email = test_email();

    let response = send_code(&ctx, &email, "patient").await;

    response.assert_status(StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["expiresInMinutes"], CODE_TTL_MINUTES);

    let code = ctx.notifier.last_code(&email).expect("no code sent");
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_digit()));
    assert!(!code.starts_with('0'));
}

#[tokio::test]
async fn verify_with_valid_code_succeeds() {
    let ctx = TestContext::new().await;
    let email = test_email();
    send_code(&ctx, &email, "patient").await;
    let code = ctx.notifier.last_code(&email).unwrap();

    let response = verify_code(&ctx, &email, &code, "patient").await;

    response.assert_status(StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["verified"], true);
}

#[tokio::test]
async fn code_can_only_be_used_once() {
    let ctx = TestContext::new().await;
    let email = test_email();
    send_code(&ctx, &email, "patient").await;
    let code = ctx.notifier.last_code(&email).unwrap();

    verify_code(&ctx, &email, &code, "patient").await.assert_status(StatusCode::OK);

    for _ in 0..3 {
        let response = verify_code(&ctx, &email, &code, "patient").await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body: Value = response.json();
        assert_eq!(body["error"], "invalid_or_used_code");
    }
}

#[tokio::test]
async fn expired_code_is_reported_as_expired() {
    let ctx = TestContext::new().await;
    let email = test_email();
    send_code(&ctx, &email, "patient").await;
    let code = ctx.notifier.last_code(&email).unwrap();

    ctx.clock.advance(Duration::minutes(CODE_TTL_MINUTES));

    let response = verify_code(&ctx, &email, &code, "patient").await;

    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["error"], "code_expired");
}

#[tokio::test]
async fn code_is_accepted_just_before_expiry() {
    let ctx = TestContext::new().await;
    let email = test_email();
    send_code(&ctx, &email, "patient").await;
    let code = ctx.notifier.last_code(&email).unwrap();

    ctx.clock.advance(Duration::minutes(CODE_TTL_MINUTES) - Duration::seconds(1));

    verify_code(&ctx, &email, &code, "patient").await.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn new_code_supersedes_the_previous_one() {
    let ctx = TestContext::new().await;
    let email = test_email();

    send_code(&ctx, &email, "patient").await;
    let first = ctx.notifier.last_code(&email).unwrap();
    send_code(&ctx, &email, "patient").await;
    let second = ctx.notifier.last_code(&email).unwrap();

    let active = ctx
        .state
        .store
        .codes
        .count_active(&email, Role::Patient, ctx.clock.now())
        .await
        .unwrap();
    assert_eq!(active, 1);

    if first != second {
        let stale = verify_code(&ctx, &email, &first, "patient").await;
        stale.assert_status(StatusCode::BAD_REQUEST);
    }
    verify_code(&ctx, &email, &second, "patient").await.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn code_is_bound_to_its_role() {
    let ctx = TestContext::new().await;
    let email = test_email();
    send_code(&ctx, &email, "patient").await;
    let code = ctx.notifier.last_code(&email).unwrap();

    let response = verify_code(&ctx, &email, &code, "doctor").await;

    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["error"], "invalid_or_used_code");
}

#[tokio::test]
async fn wrong_code_is_rejected() {
    let ctx = TestContext::new().await;
    let email = test_email();
    send_code(&ctx, &email, "patient").await;
    let code = ctx.notifier.last_code(&email).unwrap();
    let wrong = if code == "123456" { "654321" } else { "123456" };

    let response = verify_code(&ctx, &email, wrong, "patient").await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admins_cannot_request_codes() {
    let ctx = TestContext::new().await;

    let response = send_code(&ctx, &test_email(), "admin").await;

    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["error"], "invalid_role");
    assert!(ctx.notifier.sent().is_empty());
}

#[tokio::test]
async fn unknown_role_is_rejected_before_anything_is_sent() {
    let ctx = TestContext::new().await;

    let response = send_code(&ctx, &test_email(), "nurse").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(ctx.notifier.sent().is_empty());
}

#[tokio::test]
async fn delivery_failure_returns_bad_gateway() {
    let ctx = TestContext::new().await;
    ctx.notifier.set_failing(true);

    let response = send_code(&ctx, &test_email(), "patient").await;

    response.assert_status(StatusCode::BAD_GATEWAY);

    let body: Value = response.json();
    assert_eq!(body["error"], "delivery_failed");
    assert!(!body["message"].as_str().unwrap().contains("connection refused"));
}
