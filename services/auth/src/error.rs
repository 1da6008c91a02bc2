use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::domain::validate::FieldError;

/// Auth service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),
    #[error("handle already in use")]
    HandleTaken,
    #[error("email already in use")]
    EmailTaken,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("account locked")]
    AccountLocked,
    #[error("account disabled")]
    AccountDisabled,
    #[error("token expired")]
    TokenExpired,
    #[error("invalid token")]
    InvalidToken,
    #[error("invalid refresh token")]
    InvalidRefreshToken,
    #[error("user not found")]
    UserNotFound,
    #[error("email already verified")]
    AlreadyVerified,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl AuthServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::HandleTaken => "HANDLE_TAKEN",
            Self::EmailTaken => "EMAIL_TAKEN",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::AccountLocked => "ACCOUNT_LOCKED",
            Self::AccountDisabled => "ACCOUNT_DISABLED",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::InvalidRefreshToken => "INVALID_REFRESH_TOKEN",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::AlreadyVerified => "ALREADY_VERIFIED",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for AuthServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::HandleTaken | Self::EmailTaken | Self::AlreadyVerified => StatusCode::CONFLICT,
            Self::InvalidCredentials
            | Self::TokenExpired
            | Self::InvalidToken
            | Self::InvalidRefreshToken => StatusCode::UNAUTHORIZED,
            Self::AccountLocked | Self::AccountDisabled => StatusCode::FORBIDDEN,
            Self::UserNotFound => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Log 500s only — tower-http TraceLayer already records method/uri/status for all
        // requests. 4xx are expected client errors; logging them here would be noise.
        // Internal errors need the anyhow chain logged so the root cause is traceable.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        let body = match &self {
            Self::Validation(errors) => serde_json::json!({
                "kind": self.kind(),
                "message": self.to_string(),
                "errors": errors,
            }),
            _ => serde_json::json!({
                "kind": self.kind(),
                "message": self.to_string(),
            }),
        };
        (status, axum::Json(body)).into_response()
    }
}
