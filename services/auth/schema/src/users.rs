use sea_orm::entity::prelude::*;

/// User account record — the sole aggregate root of the auth service.
///
/// `refresh_tokens` is a JSONB array of issued refresh-token records
/// (bounded at 5, oldest evicted first). The pending verification and
/// reset secrets live inline as token + expiry column pairs; at most one
/// of each is outstanding at a time.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub handle: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub display_name: String,
    pub role: i16,
    pub email_verified: bool,
    pub active: bool,
    pub failed_logins: i32,
    pub lock_until: Option<chrono::DateTime<chrono::Utc>>,
    pub refresh_tokens: Json,
    pub verification_token: Option<String>,
    pub verification_expires_at: Option<chrono::DateTime<chrono::Utc>>,
    pub reset_token: Option<String>,
    pub reset_expires_at: Option<chrono::DateTime<chrono::Utc>>,
    pub last_login_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
