//! Bearer-token identity extractor.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::token::TokenError;

/// Authenticated caller, extracted from the `Authorization: Bearer` header.
///
/// Rejection is `TOKEN_EXPIRED` for a well-formed but expired access token
/// and `INVALID_TOKEN` for everything else, both 401.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    pub handle: String,
    pub email: String,
    pub role: crate::domain::types::UserRole,
}

impl FromRequestParts<AppState> for Identity {
    type Rejection = AuthServiceError;

    // axum-core 0.5 defines this as `fn -> impl Future + Send` (not `async fn`).
    // In Rust 1.82+ precise capturing, `async fn` captures lifetimes differently,
    // causing E0195. Fix: extract values synchronously, return a 'static async move block.
    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let bearer = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "))
            .map(str::to_owned);

        let verified = bearer.map(|token| state.tokens.verify_access(&token));

        async move {
            let claims = match verified {
                None => return Err(AuthServiceError::InvalidToken),
                Some(Err(TokenError::Expired)) => return Err(AuthServiceError::TokenExpired),
                Some(Err(TokenError::Invalid)) => return Err(AuthServiceError::InvalidToken),
                Some(Ok(claims)) => claims,
            };

            let user_id = claims
                .sub
                .parse()
                .map_err(|_| AuthServiceError::InvalidToken)?;

            Ok(Self {
                user_id,
                handle: claims.handle,
                email: claims.email,
                role: claims.role,
            })
        }
    }
}
