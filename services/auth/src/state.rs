use sea_orm::DatabaseConnection;

use crate::infra::db::DbUserStore;
use crate::infra::delivery::LogDelivery;
use crate::token::TokenIssuer;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub tokens: TokenIssuer,
    pub cookie_domain: String,
}

impl AppState {
    pub fn user_store(&self) -> DbUserStore {
        DbUserStore {
            db: self.db.clone(),
        }
    }

    pub fn delivery(&self) -> LogDelivery {
        LogDelivery
    }
}
