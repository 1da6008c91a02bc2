//! Signed, time-bound tokens of four kinds, each with an independent
//! secret and default TTL. Revocation of refresh tokens is not handled
//! here — it is list membership on the user record (`usecase::token`).

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::types::{RefreshTokenRecord, User, UserRole};
use crate::error::AuthServiceError;

/// Access-token lifetime in seconds (15 minutes).
pub const ACCESS_TOKEN_TTL_SECS: i64 = 900;

/// Refresh-token lifetime in seconds (7 days).
pub const REFRESH_TOKEN_TTL_SECS: i64 = 604_800;

/// Email-verification token lifetime in seconds (24 hours).
pub const VERIFICATION_TOKEN_TTL_SECS: i64 = 86_400;

/// Password-reset token lifetime in seconds (1 hour).
pub const RESET_TOKEN_TTL_SECS: i64 = 3_600;

/// Subject-only token kinds (everything except access).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Refresh,
    EmailVerification,
    PasswordReset,
}

impl TokenKind {
    fn ttl_secs(self) -> i64 {
        match self {
            Self::Refresh => REFRESH_TOKEN_TTL_SECS,
            Self::EmailVerification => VERIFICATION_TOKEN_TTL_SECS,
            Self::PasswordReset => RESET_TOKEN_TTL_SECS,
        }
    }
}

/// Per-kind HS256 signing secrets.
#[derive(Debug)]
pub struct TokenSecrets {
    pub access: String,
    pub refresh: String,
    pub email_verification: String,
    pub password_reset: String,
}

/// JWT claims for access tokens: enough for authorization decisions
/// without a store round-trip.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    pub email: String,
    pub handle: String,
    pub role: UserRole,
    pub exp: u64,
}

/// JWT claims for refresh, verification and reset tokens. `jti` keeps two
/// tokens issued in the same second distinct.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct SubjectClaims {
    pub sub: String,
    pub jti: String,
    pub exp: u64,
}

/// Verification failures, normalized for user-facing messaging.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token")]
    Invalid,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before UNIX epoch")
        .as_secs()
}

fn decode_claims<C: serde::de::DeserializeOwned>(
    token: &str,
    secret: &str,
) -> Result<C, TokenError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.required_spec_claims.clear();
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<C>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid,
    })?;

    Ok(data.claims)
}

/// Issues and verifies all four token kinds.
#[derive(Clone)]
pub struct TokenIssuer {
    secrets: Arc<TokenSecrets>,
}

impl TokenIssuer {
    pub fn new(secrets: TokenSecrets) -> Self {
        Self {
            secrets: Arc::new(secrets),
        }
    }

    fn secret(&self, kind: TokenKind) -> &str {
        match kind {
            TokenKind::Refresh => &self.secrets.refresh,
            TokenKind::EmailVerification => &self.secrets.email_verification,
            TokenKind::PasswordReset => &self.secrets.password_reset,
        }
    }

    /// Issue an access token for a user. Returns `(token, exp)`.
    pub fn issue_access(&self, user: &User) -> Result<(String, u64), AuthServiceError> {
        let exp = now_secs() + ACCESS_TOKEN_TTL_SECS as u64;
        let claims = AccessClaims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            handle: user.handle.clone(),
            role: user.role,
            exp,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secrets.access.as_bytes()),
        )
        .map_err(|e| AuthServiceError::Internal(e.into()))?;
        Ok((token, exp))
    }

    /// Issue a subject-only token of the given kind. Returns the token
    /// plus its issue and expiry instants.
    pub fn issue_subject(
        &self,
        kind: TokenKind,
        user_id: Uuid,
    ) -> Result<(String, DateTime<Utc>, DateTime<Utc>), AuthServiceError> {
        let issued_at = Utc::now();
        let expires_at = issued_at + Duration::seconds(kind.ttl_secs());
        let claims = SubjectClaims {
            sub: user_id.to_string(),
            jti: Uuid::new_v4().to_string(),
            exp: now_secs() + kind.ttl_secs() as u64,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret(kind).as_bytes()),
        )
        .map_err(|e| AuthServiceError::Internal(e.into()))?;
        Ok((token, issued_at, expires_at))
    }

    /// Issue a refresh token as a ready-to-store record.
    pub fn issue_refresh(&self, user_id: Uuid) -> Result<RefreshTokenRecord, AuthServiceError> {
        let (token, issued_at, expires_at) = self.issue_subject(TokenKind::Refresh, user_id)?;
        Ok(RefreshTokenRecord {
            token,
            issued_at,
            expires_at,
        })
    }

    pub fn verify_access(&self, token: &str) -> Result<AccessClaims, TokenError> {
        decode_claims(token, &self.secrets.access)
    }

    pub fn verify_subject(&self, kind: TokenKind, token: &str) -> Result<SubjectClaims, TokenError> {
        decode_claims(token, self.secret(kind))
    }
}
