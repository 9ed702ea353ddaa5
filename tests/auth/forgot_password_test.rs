use axum::http::StatusCode;
use chrono::Duration;
use serde_json::{json, Value};

use crate::common::{test_email, SentMail, TestContext};

async fn request_reset(ctx: &TestContext, email: &str, role: &str) -> axum_test::TestResponse {
    ctx.server
        .post("/api/password-reset/request")
        .json(&json!({ "email": email, "role": role }))
        .await
}

#[tokio::test]
async fn request_for_existing_account_sends_link() {
    let ctx = TestContext::new().await;
    let email = test_email();
    ctx.register("patient", &email).await;

    let response = request_reset(&ctx, &email, "patient").await;

    response.assert_status(StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["exists"], true);

    let token = ctx.notifier.last_reset_token(&email).expect("no reset link sent");
    assert_eq!(token.len(), 64);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
}

#[tokio::test]
async fn request_for_unknown_account_reports_it_and_sends_nothing() {
    let ctx = TestContext::new().await;

    let response = request_reset(&ctx, &test_email(), "patient").await;

    response.assert_status(StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["exists"], false);
    assert!(ctx.notifier.sent().is_empty());
}

#[tokio::test]
async fn verify_token_round_trips_email_and_role() {
    let ctx = TestContext::new().await;
    let email = test_email();
    ctx.register("secretary", &email).await;
    request_reset(&ctx, &email, "secretary").await;
    let token = ctx.notifier.last_reset_token(&email).unwrap();

    let response = ctx
        .server
        .get(&format!("/api/password-reset/verify-token/{token}"))
        .await;

    response.assert_status(StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["valid"], true);
    assert_eq!(body["email"], email.as_str());
    assert_eq!(body["role"], "secretary");
}

#[tokio::test]
async fn verify_unknown_token_is_invalid() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .get("/api/password-reset/verify-token/deadbeef")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["valid"], false);
    assert_eq!(body["reason"], "invalid");
}

#[tokio::test]
async fn verify_token_after_an_hour_is_expired() {
    let ctx = TestContext::new().await;
    let email = test_email();
    ctx.register("patient", &email).await;
    request_reset(&ctx, &email, "patient").await;
    let token = ctx.notifier.last_reset_token(&email).unwrap();

    ctx.clock.advance(Duration::hours(1));

    let body: Value = ctx
        .server
        .get(&format!("/api/password-reset/verify-token/{token}"))
        .await
        .json();

    assert_eq!(body["valid"], false);
    assert_eq!(body["reason"], "expired");
}

#[tokio::test]
async fn second_request_invalidates_first_link() {
    let ctx = TestContext::new().await;
    let email = test_email();
    ctx.register("patient", &email).await;

    request_reset(&ctx, &email, "patient").await;
    let first = ctx.notifier.last_reset_token(&email).unwrap();
    request_reset(&ctx, &email, "patient").await;
    let second = ctx.notifier.last_reset_token(&email).unwrap();

    assert_ne!(first, second);

    let stale: Value = ctx
        .server
        .get(&format!("/api/password-reset/verify-token/{first}"))
        .await
        .json();
    assert_eq!(stale["valid"], false);

    let fresh: Value = ctx
        .server
        .get(&format!("/api/password-reset/verify-token/{second}"))
        .await
        .json();
    assert_eq!(fresh["valid"], true);
}

#[tokio::test]
async fn reset_link_is_sent_for_the_requested_role() {
    let ctx = TestContext::new().await;
    let email = test_email();
    ctx.register("doctor", &email).await;

    request_reset(&ctx, &email, "medecin").await;

    let sent = ctx.notifier.sent();
    assert!(matches!(
        sent.last(),
        Some(SentMail::ResetLink { role, .. }) if role.as_str() == "doctor"
    ));
}

#[tokio::test]
async fn delivery_failure_returns_bad_gateway() {
    let ctx = TestContext::new().await;
    let email = test_email();
    ctx.register("patient", &email).await;
    ctx.notifier.set_failing(true);

    let response = request_reset(&ctx, &email, "patient").await;

    response.assert_status(StatusCode::BAD_GATEWAY);
}
