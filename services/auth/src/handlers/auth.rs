use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use crate::cookie::set_refresh_token_cookie;
use crate::domain::types::PublicUser;
use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::login::{LoginInput, LoginUseCase};
use crate::usecase::register::{RegisterInput, RegisterUseCase};

// ── POST /auth/register ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub handle: String,
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub user: PublicUser,
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let usecase = RegisterUseCase {
        store: state.user_store(),
        delivery: state.delivery(),
        tokens: state.tokens.clone(),
    };

    // Display name falls back to the handle when omitted.
    let display_name = body.display_name.unwrap_or_else(|| body.handle.clone());

    let out = usecase
        .execute(RegisterInput {
            handle: body.handle,
            email: body.email,
            password: body.password,
            display_name,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(RegisterResponse { user: out.user })))
}

// ── POST /auth/token ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    pub identifier: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub user: PublicUser,
    pub access_token: String,
    pub access_token_exp: u64,
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let usecase = LoginUseCase {
        store: state.user_store(),
        tokens: state.tokens.clone(),
    };

    let out = usecase
        .execute(LoginInput {
            identifier: body.identifier,
            password: body.password,
        })
        .await?;

    let jar = set_refresh_token_cookie(jar, out.refresh_token, state.cookie_domain.clone());

    Ok((
        StatusCode::CREATED,
        jar,
        Json(LoginResponse {
            user: out.user,
            access_token: out.access_token,
            access_token_exp: out.access_token_exp,
        }),
    ))
}
