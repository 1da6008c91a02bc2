use uuid::Uuid;

use crate::domain::repository::{TokenDelivery, UserStore, UserUpdate};
use crate::domain::types::StoredSecret;
use crate::domain::validate::{FieldError, password_errors};
use crate::error::AuthServiceError;
use crate::token::{TokenError, TokenIssuer, TokenKind};
use crate::usecase::{hash_password, verify_password};

pub struct RequestPasswordResetUseCase<S: UserStore, D: TokenDelivery> {
    pub store: S,
    pub delivery: D,
    pub tokens: TokenIssuer,
}

impl<S: UserStore, D: TokenDelivery> RequestPasswordResetUseCase<S, D> {
    /// Always succeeds, whether or not the address belongs to an account.
    /// The response must not reveal which.
    pub async fn execute(&self, email: &str) -> Result<(), AuthServiceError> {
        let Some(user) = self.store.find_by_email(email).await? else {
            return Ok(());
        };
        if !user.active {
            return Ok(());
        }

        let (token, _, expires_at) = self.tokens.issue_subject(TokenKind::PasswordReset, user.id)?;

        self.store
            .apply(
                user.id,
                UserUpdate {
                    set_reset_secret: Some(StoredSecret {
                        token: token.clone(),
                        expires_at,
                    }),
                    ..Default::default()
                },
            )
            .await?;

        self.delivery.reset_issued(&user.email, &token).await?;

        Ok(())
    }
}

pub struct ResetPasswordUseCase<S: UserStore> {
    pub store: S,
    pub tokens: TokenIssuer,
}

impl<S: UserStore> ResetPasswordUseCase<S> {
    pub async fn execute(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<(), AuthServiceError> {
        let mut errors = Vec::new();
        if token.is_empty() {
            errors.push(FieldError {
                field: "token",
                message: "token is required",
            });
        }
        errors.extend(password_errors(new_password));
        if !errors.is_empty() {
            return Err(AuthServiceError::Validation(errors));
        }

        let claims = self
            .tokens
            .verify_subject(TokenKind::PasswordReset, token)
            .map_err(|err| match err {
                TokenError::Expired => AuthServiceError::TokenExpired,
                TokenError::Invalid => AuthServiceError::InvalidToken,
            })?;

        let user_id: Uuid = claims
            .sub
            .parse()
            .map_err(|_| AuthServiceError::InvalidToken)?;

        let user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or(AuthServiceError::UserNotFound)?;

        let stored = user
            .reset_secret
            .as_ref()
            .ok_or(AuthServiceError::InvalidToken)?;
        if stored.token != token {
            return Err(AuthServiceError::InvalidToken);
        }
        if stored.is_expired() {
            return Err(AuthServiceError::TokenExpired);
        }

        let password_hash = hash_password(new_password)?;

        // Every session is revoked along with the old password.
        self.store
            .apply(
                user_id,
                UserUpdate {
                    set_password_hash: Some(password_hash),
                    clear_reset_secret: true,
                    set_refresh_tokens: Some(Vec::new()),
                    ..Default::default()
                },
            )
            .await?;

        Ok(())
    }
}

pub struct ChangePasswordUseCase<S: UserStore> {
    pub store: S,
}

impl<S: UserStore> ChangePasswordUseCase<S> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthServiceError> {
        let mut errors = Vec::new();
        if current_password.is_empty() {
            errors.push(FieldError {
                field: "current_password",
                message: "current_password is required",
            });
        }
        errors.extend(password_errors(new_password));
        if !errors.is_empty() {
            return Err(AuthServiceError::Validation(errors));
        }

        let user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or(AuthServiceError::UserNotFound)?;

        if !verify_password(current_password, &user.password_hash)? {
            return Err(AuthServiceError::InvalidCredentials);
        }

        let password_hash = hash_password(new_password)?;

        self.store
            .apply(
                user_id,
                UserUpdate {
                    set_password_hash: Some(password_hash),
                    set_refresh_tokens: Some(Vec::new()),
                    ..Default::default()
                },
            )
            .await?;

        Ok(())
    }
}
