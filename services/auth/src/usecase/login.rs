use chrono::{Duration, Utc};

use crate::domain::repository::{UserStore, UserUpdate};
use crate::domain::types::{
    LOCKOUT_SECS, MAX_FAILED_LOGINS, PublicUser, push_refresh_token,
};
use crate::domain::validate::FieldError;
use crate::error::AuthServiceError;
use crate::token::TokenIssuer;
use crate::usecase::verify_password;

pub struct LoginInput {
    /// Handle or email address.
    pub identifier: String,
    pub password: String,
}

#[derive(Debug)]
pub struct LoginOutput {
    pub user: PublicUser,
    pub access_token: String,
    pub access_token_exp: u64,
    pub refresh_token: String,
}

pub struct LoginUseCase<S: UserStore> {
    pub store: S,
    pub tokens: TokenIssuer,
}

impl<S: UserStore> LoginUseCase<S> {
    pub async fn execute(&self, input: LoginInput) -> Result<LoginOutput, AuthServiceError> {
        let mut missing = Vec::new();
        if input.identifier.is_empty() {
            missing.push(FieldError {
                field: "identifier",
                message: "identifier is required",
            });
        }
        if input.password.is_empty() {
            missing.push(FieldError {
                field: "password",
                message: "password is required",
            });
        }
        if !missing.is_empty() {
            return Err(AuthServiceError::Validation(missing));
        }

        let user = self
            .store
            .find_by_identifier(&input.identifier)
            .await?
            .ok_or(AuthServiceError::InvalidCredentials)?;

        // Locked check precedes the password check: a locked account must
        // not leak whether the password was correct.
        if user.is_locked() {
            return Err(AuthServiceError::AccountLocked);
        }
        if !user.active {
            return Err(AuthServiceError::AccountDisabled);
        }

        if !verify_password(&input.password, &user.password_hash)? {
            let update = if user.lock_expired() {
                // The previous lock has elapsed: restart counting at 1.
                UserUpdate {
                    set_failed_logins: Some(1),
                    clear_lock_until: true,
                    ..Default::default()
                }
            } else {
                let mut update = UserUpdate {
                    inc_failed_logins: Some(1),
                    ..Default::default()
                };
                // Threshold reached: lock in the same atomic update. Two
                // concurrent failures can race past this check before
                // either observes the lock — accepted; the window is short
                // and the next attempt sees the lock.
                if user.failed_logins + 1 >= MAX_FAILED_LOGINS {
                    update.set_lock_until = Some(Utc::now() + Duration::seconds(LOCKOUT_SECS));
                }
                update
            };
            self.store.apply(user.id, update).await?;
            // Same response shape whether or not this attempt tripped the
            // lock — the lock reveals itself only on the next attempt.
            return Err(AuthServiceError::InvalidCredentials);
        }

        let (access_token, access_token_exp) = self.tokens.issue_access(&user)?;
        let record = self.tokens.issue_refresh(user.id)?;
        let refresh_token = record.token.clone();

        let mut refresh_tokens = user.refresh_tokens.clone();
        push_refresh_token(&mut refresh_tokens, record);

        let now = Utc::now();
        self.store
            .apply(
                user.id,
                UserUpdate {
                    set_failed_logins: Some(0),
                    clear_lock_until: true,
                    set_last_login_at: Some(now),
                    set_refresh_tokens: Some(refresh_tokens),
                    ..Default::default()
                },
            )
            .await?;

        let mut user = user;
        user.last_login_at = Some(now);

        Ok(LoginOutput {
            user: user.sanitized(),
            access_token,
            access_token_exp,
            refresh_token,
        })
    }
}
