use axum::http::StatusCode;
use chrono::Duration;
use serde_json::{json, Value};

use telemed_auth::modules::accounts::{interface::AccountRepository, model::Role};

use crate::common::{test_email, test_password, TestContext};

const NEW_PASSWORD: &str = "BrandNewPassword456!";

async fn issue_token(ctx: &TestContext, email: &str, role: &str) -> String {
    ctx.server
        .post("/api/password-reset/request")
        .json(&json!({ "email": email, "role": role }))
        .await
        .assert_status(StatusCode::OK);

    ctx.notifier.last_reset_token(email).expect("no reset link sent")
}

async fn reset(ctx: &TestContext, token: &str, password: &str) -> axum_test::TestResponse {
    ctx.server
        .post("/api/password-reset/reset")
        .json(&json!({ "token": token, "newPassword": password }))
        .await
}

async fn stored_hash(ctx: &TestContext, email: &str, role: Role) -> String {
    ctx.state
        .store
        .accounts
        .find_by_email(role, email)
        .await
        .unwrap()
        .expect("account missing")
        .password_hash
}

#[tokio::test]
async fn reset_with_valid_token_changes_password() {
    let ctx = TestContext::new().await;
    let email = test_email();
    ctx.register("patient", &email).await;
    let token = issue_token(&ctx, &email, "patient").await;

    let response = reset(&ctx, &token, NEW_PASSWORD).await;

    response.assert_status(StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["success"], true);

    ctx.login(&email, NEW_PASSWORD, "patient")
        .await
        .assert_status(StatusCode::OK);
    ctx.login(&email, test_password(), "patient")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_cannot_be_used_twice() {
    let ctx = TestContext::new().await;
    let email = test_email();
    ctx.register("patient", &email).await;
    let token = issue_token(&ctx, &email, "patient").await;

    reset(&ctx, &token, NEW_PASSWORD).await.assert_status(StatusCode::OK);
    let hash_after_first = stored_hash(&ctx, &email, Role::Patient).await;

    let response = reset(&ctx, &token, "AnotherPassword789!").await;

    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["error"], "invalid_token");
    assert_eq!(stored_hash(&ctx, &email, Role::Patient).await, hash_after_first);
}

#[tokio::test]
async fn used_token_no_longer_verifies() {
    let ctx = TestContext::new().await;
    let email = test_email();
    ctx.register("patient", &email).await;
    let token = issue_token(&ctx, &email, "patient").await;
    reset(&ctx, &token, NEW_PASSWORD).await;

    let body: Value = ctx
        .server
        .get(&format!("/api/password-reset/verify-token/{token}"))
        .await
        .json();

    assert_eq!(body["valid"], false);
    assert_eq!(body["reason"], "invalid");
}

#[tokio::test]
async fn reset_with_unknown_token_changes_nothing() {
    let ctx = TestContext::new().await;
    let email = test_email();
    ctx.register("patient", &email).await;
    let before = stored_hash(&ctx, &email, Role::Patient).await;

    let response = reset(&ctx, &"ab".repeat(32), NEW_PASSWORD).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(stored_hash(&ctx, &email, Role::Patient).await, before);
}

#[tokio::test]
async fn reset_with_expired_token_fails() {
    let ctx = TestContext::new().await;
    let email = test_email();
    ctx.register("patient", &email).await;
    let token = issue_token(&ctx, &email, "patient").await;
    let before = stored_hash(&ctx, &email, Role::Patient).await;

    ctx.clock.advance(Duration::hours(1) + Duration::seconds(1));

    let response = reset(&ctx, &token, NEW_PASSWORD).await;

    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["error"], "token_expired");
    assert_eq!(stored_hash(&ctx, &email, Role::Patient).await, before);
}

#[tokio::test]
async fn weak_password_is_rejected_and_token_stays_usable() {
    let ctx = TestContext::new().await;
    let email = test_email();
    ctx.register("patient", &email).await;
    let token = issue_token(&ctx, &email, "patient").await;

    let response = reset(&ctx, &token, "123").await;

    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["error"], "weak_password");

    reset(&ctx, &token, NEW_PASSWORD).await.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn reset_only_touches_the_account_of_the_token_role() {
    let ctx = TestContext::new().await;
    let email = test_email();
    ctx.register("patient", &email).await;
    ctx.register("doctor", &email).await;
    let doctor_hash = stored_hash(&ctx, &email, Role::Doctor).await;

    let token = issue_token(&ctx, &email, "patient").await;
    reset(&ctx, &token, NEW_PASSWORD).await.assert_status(StatusCode::OK);

    assert_eq!(stored_hash(&ctx, &email, Role::Doctor).await, doctor_hash);
}

#[tokio::test]
async fn snake_case_password_field_is_not_accepted() {
    let ctx = TestContext::new().await;
    let email = test_email();
    ctx.register("patient", &email).await;
    let token = issue_token(&ctx, &email, "patient").await;
    let before = stored_hash(&ctx, &email, Role::Patient).await;

    let response = ctx
        .server
        .post("/api/password-reset/reset")
        .json(&json!({ "token": token, "new_password": NEW_PASSWORD }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(stored_hash(&ctx, &email, Role::Patient).await, before);
}
