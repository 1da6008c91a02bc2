use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};

use crate::error::AuthServiceError;
use crate::identity::Identity;
use crate::state::AppState;
use crate::usecase::password::{
    ChangePasswordUseCase, RequestPasswordResetUseCase, ResetPasswordUseCase,
};

// ── POST /auth/password/recovery ─────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RecoveryRequest {
    pub email: String,
}

#[derive(Serialize)]
pub struct RecoveryResponse {
    pub message: &'static str,
}

/// Returns 202 with the same body whether or not the address is known.
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(body): Json<RecoveryRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let usecase = RequestPasswordResetUseCase {
        store: state.user_store(),
        delivery: state.delivery(),
        tokens: state.tokens.clone(),
    };
    usecase.execute(&body.email).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(RecoveryResponse {
            message: "if the address is registered, a reset link has been sent",
        }),
    ))
}

// ── POST /auth/password/reset ────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<StatusCode, AuthServiceError> {
    let usecase = ResetPasswordUseCase {
        store: state.user_store(),
        tokens: state.tokens.clone(),
    };
    usecase.execute(&body.token, &body.new_password).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── PATCH /auth/password ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

pub async fn change_password(
    State(state): State<AppState>,
    identity: Identity,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<StatusCode, AuthServiceError> {
    let usecase = ChangePasswordUseCase {
        store: state.user_store(),
    };
    usecase
        .execute(identity.user_id, &body.current_password, &body.new_password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
