use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use crate::cookie::{LATCHKEY_REFRESH_TOKEN, clear_refresh_token_cookie};
use crate::error::AuthServiceError;
use crate::identity::Identity;
use crate::state::AppState;
use crate::usecase::token::{LogoutUseCase, RefreshTokenUseCase};

/// Clients without cookie support may send the refresh token in the body.
#[derive(Deserialize)]
pub struct RefreshTokenBody {
    pub refresh_token: String,
}

/// Cookie wins over body when both are present.
fn refresh_token_from(jar: &CookieJar, body: Option<Json<RefreshTokenBody>>) -> Option<String> {
    jar.get(LATCHKEY_REFRESH_TOKEN)
        .map(|c| c.value().to_owned())
        .or(body.map(|Json(b)| b.refresh_token))
}

// ── PATCH /auth/token ────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub access_token_exp: u64,
}

pub async fn refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Option<Json<RefreshTokenBody>>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let refresh_value =
        refresh_token_from(&jar, body).ok_or(AuthServiceError::InvalidRefreshToken)?;

    let usecase = RefreshTokenUseCase {
        store: state.user_store(),
        tokens: state.tokens.clone(),
    };

    let out = usecase.execute(&refresh_value).await?;

    Ok((
        StatusCode::OK,
        Json(RefreshResponse {
            access_token: out.access_token,
            access_token_exp: out.access_token_exp,
        }),
    ))
}

// ── DELETE /auth/token ───────────────────────────────────────────────────────

pub async fn logout(
    State(state): State<AppState>,
    identity: Identity,
    jar: CookieJar,
    body: Option<Json<RefreshTokenBody>>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let refresh_value = refresh_token_from(&jar, body).unwrap_or_default();

    let usecase = LogoutUseCase {
        store: state.user_store(),
    };
    usecase.execute(identity.user_id, &refresh_value).await?;

    let jar = clear_refresh_token_cookie(jar, state.cookie_domain.clone());
    Ok((StatusCode::NO_CONTENT, jar))
}
