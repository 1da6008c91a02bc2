use chrono::{Duration, Utc};

use latchkey_auth::domain::types::MAX_REFRESH_TOKENS;
use latchkey_auth::error::AuthServiceError;
use latchkey_auth::token::TokenKind;
use latchkey_auth::usecase::login::{LoginInput, LoginUseCase};

use crate::helpers::{MockUserStore, TEST_PASSWORD, test_issuer, test_user};

fn login_input(identifier: &str, password: &str) -> LoginInput {
    LoginInput {
        identifier: identifier.into(),
        password: password.into(),
    }
}

#[tokio::test]
async fn should_login_with_handle_and_store_refresh_token() {
    let user = test_user();
    let store = MockUserStore::new(vec![user.clone()]);
    let tokens = test_issuer();
    let usecase = LoginUseCase {
        store: store.clone(),
        tokens: tokens.clone(),
    };

    let out = usecase
        .execute(login_input("ada", TEST_PASSWORD))
        .await
        .unwrap();

    assert_eq!(out.user.id, user.id);
    assert!(out.user.last_login_at.is_some());

    let claims = tokens.verify_access(&out.access_token).unwrap();
    assert_eq!(claims.sub, user.id.to_string());
    assert_eq!(claims.handle, "ada");
    assert_eq!(claims.exp, out.access_token_exp);

    let stored = store.get(user.id).unwrap();
    assert_eq!(stored.refresh_tokens.len(), 1);
    assert_eq!(stored.refresh_tokens[0].token, out.refresh_token);
    assert!(stored.last_login_at.is_some());
}

#[tokio::test]
async fn should_login_with_email_as_identifier() {
    let user = test_user();
    let usecase = LoginUseCase {
        store: MockUserStore::new(vec![user.clone()]),
        tokens: test_issuer(),
    };

    let out = usecase
        .execute(login_input("ada@example.com", TEST_PASSWORD))
        .await
        .unwrap();
    assert_eq!(out.user.id, user.id);
}

#[tokio::test]
async fn should_return_invalid_credentials_for_unknown_identifier() {
    let usecase = LoginUseCase {
        store: MockUserStore::empty(),
        tokens: test_issuer(),
    };

    let result = usecase.execute(login_input("nobody", TEST_PASSWORD)).await;
    assert!(
        matches!(result, Err(AuthServiceError::InvalidCredentials)),
        "expected InvalidCredentials, got {result:?}"
    );
}

#[tokio::test]
async fn should_count_failures_and_lock_on_fifth() {
    let user = test_user();
    let store = MockUserStore::new(vec![user.clone()]);
    let usecase = LoginUseCase {
        store: store.clone(),
        tokens: test_issuer(),
    };

    for attempt in 1..=5 {
        let result = usecase.execute(login_input("ada", "Wrong-pass1")).await;
        // The fifth failure trips the lock but answers the same as the
        // first four.
        assert!(
            matches!(result, Err(AuthServiceError::InvalidCredentials)),
            "attempt {attempt}: expected InvalidCredentials, got {result:?}"
        );
    }

    let stored = store.get(user.id).unwrap();
    assert_eq!(stored.failed_logins, 5);
    let lock_until = stored.lock_until.expect("account should be locked");
    assert!(lock_until > Utc::now() + Duration::minutes(119));
    assert!(lock_until <= Utc::now() + Duration::hours(2));
}

#[tokio::test]
async fn should_reject_locked_account_even_with_correct_password() {
    let mut user = test_user();
    user.failed_logins = 5;
    user.lock_until = Some(Utc::now() + Duration::hours(1));
    let usecase = LoginUseCase {
        store: MockUserStore::new(vec![user]),
        tokens: test_issuer(),
    };

    let result = usecase.execute(login_input("ada", TEST_PASSWORD)).await;
    assert!(
        matches!(result, Err(AuthServiceError::AccountLocked)),
        "expected AccountLocked, got {result:?}"
    );
}

#[tokio::test]
async fn should_restart_failure_count_after_lock_expires() {
    let mut user = test_user();
    user.failed_logins = 5;
    user.lock_until = Some(Utc::now() - Duration::minutes(1));
    let store = MockUserStore::new(vec![user.clone()]);
    let usecase = LoginUseCase {
        store: store.clone(),
        tokens: test_issuer(),
    };

    let result = usecase.execute(login_input("ada", "Wrong-pass1")).await;
    assert!(matches!(result, Err(AuthServiceError::InvalidCredentials)));

    // Expired lock: the stale count restarts at 1 instead of re-locking.
    let stored = store.get(user.id).unwrap();
    assert_eq!(stored.failed_logins, 1);
    assert!(stored.lock_until.is_none());
}

#[tokio::test]
async fn should_reset_failure_count_on_successful_login() {
    let mut user = test_user();
    user.failed_logins = 3;
    let store = MockUserStore::new(vec![user.clone()]);
    let usecase = LoginUseCase {
        store: store.clone(),
        tokens: test_issuer(),
    };

    usecase
        .execute(login_input("ada", TEST_PASSWORD))
        .await
        .unwrap();

    let stored = store.get(user.id).unwrap();
    assert_eq!(stored.failed_logins, 0);
    assert!(stored.lock_until.is_none());
}

#[tokio::test]
async fn should_reject_disabled_account() {
    let mut user = test_user();
    user.active = false;
    let usecase = LoginUseCase {
        store: MockUserStore::new(vec![user]),
        tokens: test_issuer(),
    };

    let result = usecase.execute(login_input("ada", TEST_PASSWORD)).await;
    assert!(
        matches!(result, Err(AuthServiceError::AccountDisabled)),
        "expected AccountDisabled, got {result:?}"
    );
}

#[tokio::test]
async fn should_evict_oldest_refresh_token_beyond_capacity() {
    let user = test_user();
    let store = MockUserStore::new(vec![user.clone()]);
    let usecase = LoginUseCase {
        store: store.clone(),
        tokens: test_issuer(),
    };

    let mut issued = Vec::new();
    for _ in 0..6 {
        let out = usecase
            .execute(login_input("ada", TEST_PASSWORD))
            .await
            .unwrap();
        issued.push(out.refresh_token);
    }

    let stored = store.get(user.id).unwrap();
    assert_eq!(stored.refresh_tokens.len(), MAX_REFRESH_TOKENS);
    let kept: Vec<_> = stored
        .refresh_tokens
        .iter()
        .map(|r| r.token.as_str())
        .collect();
    // The first session was evicted; the five newest remain in order.
    assert_eq!(kept, issued[1..].iter().map(String::as_str).collect::<Vec<_>>());
}

#[tokio::test]
async fn should_issue_refresh_token_verifiable_with_refresh_secret_only() {
    let user = test_user();
    let tokens = test_issuer();
    let usecase = LoginUseCase {
        store: MockUserStore::new(vec![user.clone()]),
        tokens: tokens.clone(),
    };

    let out = usecase
        .execute(login_input("ada", TEST_PASSWORD))
        .await
        .unwrap();

    let claims = tokens
        .verify_subject(TokenKind::Refresh, &out.refresh_token)
        .unwrap();
    assert_eq!(claims.sub, user.id.to_string());
    // An access-token check with the refresh token must fail.
    assert!(tokens.verify_access(&out.refresh_token).is_err());
}

#[tokio::test]
async fn should_collect_missing_credential_fields() {
    let usecase = LoginUseCase {
        store: MockUserStore::empty(),
        tokens: test_issuer(),
    };

    let result = usecase.execute(login_input("", "")).await;
    let Err(AuthServiceError::Validation(errors)) = result else {
        panic!("expected Validation, got {result:?}");
    };
    assert_eq!(errors.len(), 2);
}
