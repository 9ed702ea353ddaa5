use axum::http::StatusCode;
use futures::future::join_all;

use telemed_auth::errors::ApiError;
use telemed_auth::modules::accounts::{interface::AccountRepository, model::Role};
use telemed_auth::modules::password_reset::service::PasswordResetService;
use telemed_auth::modules::verification::{
    interface::VerificationCodeRepository, service::VerificationService,
};
use telemed_auth::services::clock::Clock;

use crate::common::{test_email, TestContext};

#[tokio::test]
async fn concurrent_code_requests_leave_one_active_code() {
    let ctx = TestContext::new().await;
    let email = test_email();

    let requests = (0..10).map(|_| {
        let state = ctx.state.clone();
        let email = email.clone();
        tokio::spawn(async move {
            VerificationService::from_state(&state)
                .request_code(&email, Role::Patient)
                .await
        })
    });

    for result in join_all(requests).await {
        result.unwrap().unwrap();
    }

    let active = ctx
        .state
        .store
        .codes
        .count_active(&email, Role::Patient, ctx.clock.now())
        .await
        .unwrap();
    assert_eq!(active, 1);
}

#[tokio::test]
async fn concurrent_verifications_succeed_exactly_once() {
    let ctx = TestContext::new().await;
    let email = test_email();
    VerificationService::from_state(&ctx.state)
        .request_code(&email, Role::Patient)
        .await
        .unwrap();
    let code = ctx.notifier.last_code(&email).unwrap();

    let attempts = (0..10).map(|_| {
        let state = ctx.state.clone();
        let email = email.clone();
        let code = code.clone();
        tokio::spawn(async move {
            VerificationService::from_state(&state)
                .verify_code(&email, &code, Role::Patient)
                .await
        })
    });

    let results: Vec<_> = join_all(attempts).await.into_iter().map(|r| r.unwrap()).collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, ApiError::InvalidOrUsedCode)));
}

#[tokio::test]
async fn concurrent_resets_with_one_token_apply_once() {
    let ctx = TestContext::new().await;
    let email = test_email();
    ctx.register("patient", &email).await.assert_status(StatusCode::CREATED);

    PasswordResetService::from_state(&ctx.state)
        .request_reset(&email, Role::Patient)
        .await
        .unwrap();
    let token = ctx.notifier.last_reset_token(&email).unwrap();

    let attempts = (0..5).map(|i| {
        let state = ctx.state.clone();
        let token = token.clone();
        tokio::spawn(async move {
            let password = format!("ConcurrentPassword{i}!");
            PasswordResetService::from_state(&state)
                .reset_password(&token, &password)
                .await
                .map(|_| password)
        })
    });

    let results: Vec<_> = join_all(attempts).await.into_iter().map(|r| r.unwrap()).collect();
    let winners: Vec<&String> = results.iter().filter_map(|r| r.as_ref().ok()).collect();

    assert_eq!(winners.len(), 1);

    let account = ctx
        .state
        .store
        .accounts
        .find_by_email(Role::Patient, &email)
        .await
        .unwrap()
        .unwrap();
    assert!(telemed_auth::services::hashing::verify_password(winners[0], &account.password_hash).unwrap());
}
