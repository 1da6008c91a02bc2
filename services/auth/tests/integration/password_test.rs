use chrono::{Duration, Utc};

use latchkey_auth::domain::types::StoredSecret;
use latchkey_auth::error::AuthServiceError;
use latchkey_auth::token::TokenKind;
use latchkey_auth::usecase::password::{
    ChangePasswordUseCase, RequestPasswordResetUseCase, ResetPasswordUseCase,
};
use latchkey_auth::usecase::token::RefreshTokenUseCase;

use crate::helpers::{CapturingDelivery, MockUserStore, TEST_PASSWORD, test_issuer, test_user};

const NEW_PASSWORD: &str = "Brand-new-pw7";

// ── RequestPasswordResetUseCase ──────────────────────────────────────────────

#[tokio::test]
async fn should_store_reset_secret_and_deliver_token() {
    let user = test_user();
    let store = MockUserStore::new(vec![user.clone()]);
    let delivery = CapturingDelivery::default();
    let usecase = RequestPasswordResetUseCase {
        store: store.clone(),
        delivery: delivery.clone(),
        tokens: test_issuer(),
    };

    usecase.execute("ada@example.com").await.unwrap();

    let stored = store.get(user.id).unwrap();
    let secret = stored.reset_secret.expect("reset secret should be stored");
    assert!(!secret.is_expired());

    let sent = delivery.reset.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].1, secret.token);
}

#[tokio::test]
async fn should_succeed_silently_for_unknown_email() {
    let delivery = CapturingDelivery::default();
    let usecase = RequestPasswordResetUseCase {
        store: MockUserStore::empty(),
        delivery: delivery.clone(),
        tokens: test_issuer(),
    };

    // Unknown address answers exactly like a known one.
    usecase.execute("ghost@example.com").await.unwrap();
    assert!(delivery.reset.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_not_issue_reset_for_disabled_account() {
    let mut user = test_user();
    user.active = false;
    let store = MockUserStore::new(vec![user.clone()]);
    let delivery = CapturingDelivery::default();
    let usecase = RequestPasswordResetUseCase {
        store: store.clone(),
        delivery: delivery.clone(),
        tokens: test_issuer(),
    };

    usecase.execute("ada@example.com").await.unwrap();

    assert!(store.get(user.id).unwrap().reset_secret.is_none());
    assert!(delivery.reset.lock().unwrap().is_empty());
}

// ── ResetPasswordUseCase ─────────────────────────────────────────────────────

fn user_with_reset_token() -> (latchkey_auth::domain::types::User, String) {
    let mut user = test_user();
    let tokens = test_issuer();
    let (token, _, expires_at) = tokens
        .issue_subject(TokenKind::PasswordReset, user.id)
        .unwrap();
    user.reset_secret = Some(StoredSecret {
        token: token.clone(),
        expires_at,
    });
    user.refresh_tokens = vec![tokens.issue_refresh(user.id).unwrap()];
    (user, token)
}

#[tokio::test]
async fn should_replace_password_and_revoke_all_sessions() {
    let (user, token) = user_with_reset_token();
    let store = MockUserStore::new(vec![user.clone()]);
    let usecase = ResetPasswordUseCase {
        store: store.clone(),
        tokens: test_issuer(),
    };

    usecase.execute(&token, NEW_PASSWORD).await.unwrap();

    let stored = store.get(user.id).unwrap();
    assert!(bcrypt::verify(NEW_PASSWORD, &stored.password_hash).unwrap());
    assert!(stored.reset_secret.is_none());
    assert!(stored.refresh_tokens.is_empty());
}

#[tokio::test]
async fn should_reject_superseded_reset_token() {
    let (mut user, old_token) = user_with_reset_token();
    user.reset_secret = Some(StoredSecret {
        token: "newer-token".into(),
        expires_at: Utc::now() + Duration::hours(1),
    });
    let usecase = ResetPasswordUseCase {
        store: MockUserStore::new(vec![user]),
        tokens: test_issuer(),
    };

    let result = usecase.execute(&old_token, NEW_PASSWORD).await;
    assert!(
        matches!(result, Err(AuthServiceError::InvalidToken)),
        "expected InvalidToken, got {result:?}"
    );
}

#[tokio::test]
async fn should_report_expired_stored_reset_secret() {
    let (mut user, token) = user_with_reset_token();
    user.reset_secret = Some(StoredSecret {
        token: token.clone(),
        expires_at: Utc::now() - Duration::minutes(1),
    });
    let usecase = ResetPasswordUseCase {
        store: MockUserStore::new(vec![user]),
        tokens: test_issuer(),
    };

    let result = usecase.execute(&token, NEW_PASSWORD).await;
    assert!(matches!(result, Err(AuthServiceError::TokenExpired)));
}

#[tokio::test]
async fn should_enforce_password_policy_on_reset() {
    let (user, token) = user_with_reset_token();
    let usecase = ResetPasswordUseCase {
        store: MockUserStore::new(vec![user]),
        tokens: test_issuer(),
    };

    let result = usecase.execute(&token, "weak").await;
    let Err(AuthServiceError::Validation(errors)) = result else {
        panic!("expected Validation, got {result:?}");
    };
    assert!(errors.iter().all(|e| e.field == "password"));
}

#[tokio::test]
async fn should_invalidate_existing_refresh_tokens_after_reset() {
    let (user, token) = user_with_reset_token();
    let pre_reset_refresh = user.refresh_tokens[0].token.clone();
    let store = MockUserStore::new(vec![user.clone()]);
    let tokens = test_issuer();

    ResetPasswordUseCase {
        store: store.clone(),
        tokens: tokens.clone(),
    }
    .execute(&token, NEW_PASSWORD)
    .await
    .unwrap();

    // The old session's refresh token still carries a valid signature but
    // was cleared from the list: refresh must fail.
    let result = RefreshTokenUseCase {
        store: store.clone(),
        tokens,
    }
    .execute(&pre_reset_refresh)
    .await;

    assert!(
        matches!(result, Err(AuthServiceError::InvalidRefreshToken)),
        "expected InvalidRefreshToken, got {result:?}"
    );
}

// ── ChangePasswordUseCase ────────────────────────────────────────────────────

#[tokio::test]
async fn should_change_password_and_clear_refresh_list() {
    let mut user = test_user();
    user.refresh_tokens = vec![test_issuer().issue_refresh(user.id).unwrap()];
    let store = MockUserStore::new(vec![user.clone()]);
    let usecase = ChangePasswordUseCase {
        store: store.clone(),
    };

    usecase
        .execute(user.id, TEST_PASSWORD, NEW_PASSWORD)
        .await
        .unwrap();

    let stored = store.get(user.id).unwrap();
    assert!(bcrypt::verify(NEW_PASSWORD, &stored.password_hash).unwrap());
    assert!(stored.refresh_tokens.is_empty());
}

#[tokio::test]
async fn should_reject_change_with_wrong_current_password() {
    let user = test_user();
    let store = MockUserStore::new(vec![user.clone()]);
    let usecase = ChangePasswordUseCase {
        store: store.clone(),
    };

    let result = usecase
        .execute(user.id, "Wrong-current1", NEW_PASSWORD)
        .await;

    assert!(
        matches!(result, Err(AuthServiceError::InvalidCredentials)),
        "expected InvalidCredentials, got {result:?}"
    );
    // Hash untouched on failure.
    let stored = store.get(user.id).unwrap();
    assert!(bcrypt::verify(TEST_PASSWORD, &stored.password_hash).unwrap());
}

#[tokio::test]
async fn should_validate_new_password_before_touching_store() {
    let user = test_user();
    let usecase = ChangePasswordUseCase {
        store: MockUserStore::new(vec![user.clone()]),
    };

    let result = usecase.execute(user.id, TEST_PASSWORD, "weak").await;
    assert!(matches!(result, Err(AuthServiceError::Validation(_))));
}
