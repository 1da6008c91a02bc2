use chrono::Utc;
use uuid::Uuid;

use crate::domain::repository::{TokenDelivery, UserStore};
use crate::domain::types::{StoredSecret, PublicUser, User, UserRole};
use crate::domain::validate::registration_errors;
use crate::error::AuthServiceError;
use crate::token::{TokenIssuer, TokenKind};
use crate::usecase::hash_password;

pub struct RegisterInput {
    pub handle: String,
    pub email: String,
    pub password: String,
    pub display_name: String,
}

#[derive(Debug)]
pub struct RegisterOutput {
    pub user: PublicUser,
    /// Raw email-verification token; the caller delivers it out-of-band.
    pub verification_token: String,
}

pub struct RegisterUseCase<S: UserStore, D: TokenDelivery> {
    pub store: S,
    pub delivery: D,
    pub tokens: TokenIssuer,
}

impl<S: UserStore, D: TokenDelivery> RegisterUseCase<S, D> {
    pub async fn execute(&self, input: RegisterInput) -> Result<RegisterOutput, AuthServiceError> {
        let errors = registration_errors(&input.handle, &input.email, &input.password);
        if !errors.is_empty() {
            return Err(AuthServiceError::Validation(errors));
        }

        // Pre-check to disambiguate which field conflicts. The store's own
        // unique constraint remains the definitive guard: under a race the
        // create below may still report a conflict this check missed.
        if self.store.find_by_handle(&input.handle).await?.is_some() {
            return Err(AuthServiceError::HandleTaken);
        }
        if self.store.find_by_email(&input.email).await?.is_some() {
            return Err(AuthServiceError::EmailTaken);
        }

        let password_hash = hash_password(&input.password)?;
        let id = Uuid::now_v7();
        let (verification_token, _, verification_expires_at) = self
            .tokens
            .issue_subject(TokenKind::EmailVerification, id)?;

        let now = Utc::now();
        let user = User {
            id,
            handle: input.handle,
            email: input.email,
            password_hash,
            display_name: input.display_name,
            role: UserRole::User,
            email_verified: false,
            active: true,
            failed_logins: 0,
            lock_until: None,
            refresh_tokens: vec![],
            verification_secret: Some(StoredSecret {
                token: verification_token.clone(),
                expires_at: verification_expires_at,
            }),
            reset_secret: None,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };

        self.store.create(&user).await?;
        self.delivery
            .verification_issued(&user.email, &verification_token)
            .await?;

        Ok(RegisterOutput {
            user: user.sanitized(),
            verification_token,
        })
    }
}
