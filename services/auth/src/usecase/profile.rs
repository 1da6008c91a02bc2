use uuid::Uuid;

use crate::domain::repository::UserStore;
use crate::domain::types::PublicUser;
use crate::error::AuthServiceError;

pub struct GetProfileUseCase<S: UserStore> {
    pub store: S,
}

impl<S: UserStore> GetProfileUseCase<S> {
    pub async fn execute(&self, user_id: Uuid) -> Result<PublicUser, AuthServiceError> {
        let user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or(AuthServiceError::UserNotFound)?;

        Ok(user.sanitized())
    }
}
