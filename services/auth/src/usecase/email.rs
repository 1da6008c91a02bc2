use crate::domain::repository::{UserStore, UserUpdate};
use crate::domain::validate::FieldError;
use crate::error::AuthServiceError;
use crate::token::{TokenError, TokenIssuer, TokenKind};

pub struct VerifyEmailUseCase<S: UserStore> {
    pub store: S,
    pub tokens: TokenIssuer,
}

impl<S: UserStore> VerifyEmailUseCase<S> {
    pub async fn execute(&self, token: &str) -> Result<(), AuthServiceError> {
        if token.is_empty() {
            return Err(AuthServiceError::Validation(vec![FieldError {
                field: "token",
                message: "token is required",
            }]));
        }

        let claims = self
            .tokens
            .verify_subject(TokenKind::EmailVerification, token)
            .map_err(|err| match err {
                TokenError::Expired => AuthServiceError::TokenExpired,
                TokenError::Invalid => AuthServiceError::InvalidToken,
            })?;

        let user_id = claims
            .sub
            .parse()
            .map_err(|_| AuthServiceError::InvalidToken)?;

        let user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or(AuthServiceError::UserNotFound)?;

        if user.email_verified {
            return Err(AuthServiceError::AlreadyVerified);
        }

        // Only the most recently issued token is honored; the stored copy
        // supersedes any older, still-signed one.
        let stored = user
            .verification_secret
            .as_ref()
            .ok_or(AuthServiceError::InvalidToken)?;
        if stored.token != token {
            return Err(AuthServiceError::InvalidToken);
        }
        if stored.is_expired() {
            return Err(AuthServiceError::TokenExpired);
        }

        self.store
            .apply(
                user_id,
                UserUpdate {
                    set_email_verified: Some(true),
                    clear_verification_secret: true,
                    ..Default::default()
                },
            )
            .await?;

        Ok(())
    }
}
