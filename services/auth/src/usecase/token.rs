use crate::domain::repository::{UserStore, UserUpdate};
use crate::error::AuthServiceError;
use crate::token::{TokenError, TokenIssuer, TokenKind};

#[derive(Debug)]
pub struct RefreshOutput {
    pub access_token: String,
    pub access_token_exp: u64,
}

pub struct RefreshTokenUseCase<S: UserStore> {
    pub store: S,
    pub tokens: TokenIssuer,
}

impl<S: UserStore> RefreshTokenUseCase<S> {
    pub async fn execute(&self, refresh_token: &str) -> Result<RefreshOutput, AuthServiceError> {
        if refresh_token.is_empty() {
            return Err(AuthServiceError::InvalidRefreshToken);
        }

        let claims = self
            .tokens
            .verify_subject(TokenKind::Refresh, refresh_token)
            .map_err(|err| match err {
                TokenError::Expired => AuthServiceError::TokenExpired,
                TokenError::Invalid => AuthServiceError::InvalidRefreshToken,
            })?;

        let user_id = claims
            .sub
            .parse()
            .map_err(|_| AuthServiceError::InvalidRefreshToken)?;

        let user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or(AuthServiceError::InvalidRefreshToken)?;

        // The stored list is authoritative: a token evicted or cleared from
        // it is revoked even while its signature is still valid.
        let known = user
            .refresh_tokens
            .iter()
            .any(|record| record.token == refresh_token);
        if !known {
            return Err(AuthServiceError::InvalidRefreshToken);
        }

        let (access_token, access_token_exp) = self.tokens.issue_access(&user)?;

        Ok(RefreshOutput {
            access_token,
            access_token_exp,
        })
    }
}

pub struct LogoutUseCase<S: UserStore> {
    pub store: S,
}

impl<S: UserStore> LogoutUseCase<S> {
    pub async fn execute(
        &self,
        user_id: uuid::Uuid,
        refresh_token: &str,
    ) -> Result<(), AuthServiceError> {
        let user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or(AuthServiceError::UserNotFound)?;

        let remaining: Vec<_> = user
            .refresh_tokens
            .iter()
            .filter(|record| record.token != refresh_token)
            .cloned()
            .collect();

        // A token already absent from the list is a no-op success.
        if remaining.len() != user.refresh_tokens.len() {
            self.store
                .apply(
                    user_id,
                    UserUpdate {
                        set_refresh_tokens: Some(remaining),
                        ..Default::default()
                    },
                )
                .await?;
        }

        Ok(())
    }
}
