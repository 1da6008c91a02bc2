use axum::{Json, extract::State};

use crate::domain::types::PublicUser;
use crate::error::AuthServiceError;
use crate::identity::Identity;
use crate::state::AppState;
use crate::usecase::profile::GetProfileUseCase;

// ── GET /users/@me ───────────────────────────────────────────────────────────

pub async fn get_me(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<PublicUser>, AuthServiceError> {
    let usecase = GetProfileUseCase {
        store: state.user_store(),
    };
    let user = usecase.execute(identity.user_id).await?;
    Ok(Json(user))
}
