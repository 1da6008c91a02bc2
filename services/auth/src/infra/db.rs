use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, SqlErr,
    sea_query::Expr,
};
use uuid::Uuid;

use latchkey_auth_schema::users;

use crate::domain::repository::{UserStore, UserUpdate};
use crate::domain::types::{RefreshTokenRecord, StoredSecret, User, UserRole};
use crate::error::AuthServiceError;

// ── User store ───────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserStore {
    pub db: DatabaseConnection,
}

impl UserStore for DbUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthServiceError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        model.map(user_from_model).transpose()
    }

    async fn find_by_handle(&self, handle: &str) -> Result<Option<User>, AuthServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::Handle.eq(handle))
            .one(&self.db)
            .await
            .context("find user by handle")?;
        model.map(user_from_model).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        model.map(user_from_model).transpose()
    }

    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>, AuthServiceError> {
        let model = users::Entity::find()
            .filter(
                Condition::any()
                    .add(users::Column::Handle.eq(identifier))
                    .add(users::Column::Email.eq(identifier)),
            )
            .one(&self.db)
            .await
            .context("find user by identifier")?;
        model.map(user_from_model).transpose()
    }

    async fn create(&self, user: &User) -> Result<(), AuthServiceError> {
        let refresh_tokens = serde_json::to_value(&user.refresh_tokens)
            .context("serialize refresh tokens")?;
        let (verification_token, verification_expires_at) = split_secret(&user.verification_secret);
        let (reset_token, reset_expires_at) = split_secret(&user.reset_secret);

        users::ActiveModel {
            id: Set(user.id),
            handle: Set(user.handle.clone()),
            email: Set(user.email.clone()),
            password_hash: Set(user.password_hash.clone()),
            display_name: Set(user.display_name.clone()),
            role: Set(user.role.as_i16()),
            email_verified: Set(user.email_verified),
            active: Set(user.active),
            failed_logins: Set(user.failed_logins),
            lock_until: Set(user.lock_until),
            refresh_tokens: Set(refresh_tokens),
            verification_token: Set(verification_token),
            verification_expires_at: Set(verification_expires_at),
            reset_token: Set(reset_token),
            reset_expires_at: Set(reset_expires_at),
            last_login_at: Set(user.last_login_at),
            created_at: Set(user.created_at),
            updated_at: Set(user.updated_at),
        }
        .insert(&self.db)
        .await
        .map_err(conflict_from_db_err)?;
        Ok(())
    }

    async fn apply(&self, id: Uuid, update: UserUpdate) -> Result<(), AuthServiceError> {
        let mut query = users::Entity::update_many().filter(users::Column::Id.eq(id));

        if let Some(n) = update.inc_failed_logins {
            query = query.col_expr(
                users::Column::FailedLogins,
                Expr::col(users::Column::FailedLogins).add(n),
            );
        }
        if let Some(n) = update.set_failed_logins {
            query = query.col_expr(users::Column::FailedLogins, Expr::value(n));
        }
        if let Some(at) = update.set_lock_until {
            query = query.col_expr(users::Column::LockUntil, Expr::value(at));
        }
        if update.clear_lock_until {
            query = query.col_expr(
                users::Column::LockUntil,
                Expr::value(None::<chrono::DateTime<Utc>>),
            );
        }
        if let Some(at) = update.set_last_login_at {
            query = query.col_expr(users::Column::LastLoginAt, Expr::value(at));
        }
        if let Some(ref records) = update.set_refresh_tokens {
            let json = serde_json::to_value(records).context("serialize refresh tokens")?;
            query = query.col_expr(users::Column::RefreshTokens, Expr::value(json));
        }
        if let Some(ref hash) = update.set_password_hash {
            query = query.col_expr(users::Column::PasswordHash, Expr::value(hash.clone()));
        }
        if let Some(verified) = update.set_email_verified {
            query = query.col_expr(users::Column::EmailVerified, Expr::value(verified));
        }
        if let Some(ref secret) = update.set_verification_secret {
            query = query
                .col_expr(
                    users::Column::VerificationToken,
                    Expr::value(secret.token.clone()),
                )
                .col_expr(
                    users::Column::VerificationExpiresAt,
                    Expr::value(secret.expires_at),
                );
        }
        if update.clear_verification_secret {
            query = query
                .col_expr(users::Column::VerificationToken, Expr::value(None::<String>))
                .col_expr(
                    users::Column::VerificationExpiresAt,
                    Expr::value(None::<chrono::DateTime<Utc>>),
                );
        }
        if let Some(ref secret) = update.set_reset_secret {
            query = query
                .col_expr(users::Column::ResetToken, Expr::value(secret.token.clone()))
                .col_expr(users::Column::ResetExpiresAt, Expr::value(secret.expires_at));
        }
        if update.clear_reset_secret {
            query = query
                .col_expr(users::Column::ResetToken, Expr::value(None::<String>))
                .col_expr(
                    users::Column::ResetExpiresAt,
                    Expr::value(None::<chrono::DateTime<Utc>>),
                );
        }
        if let Some(active) = update.set_active {
            query = query.col_expr(users::Column::Active, Expr::value(active));
        }

        let result = query
            .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
            .exec(&self.db)
            .await
            .context("apply user update")?;

        if result.rows_affected == 0 {
            return Err(AuthServiceError::UserNotFound);
        }
        Ok(())
    }
}

/// Map an insert failure to the field-specific conflict error when the
/// database reports a unique violation; the constraint name says which
/// column collided.
fn conflict_from_db_err(err: DbErr) -> AuthServiceError {
    if let Some(SqlErr::UniqueConstraintViolation(message)) = err.sql_err() {
        if message.contains("uq_users_handle") {
            return AuthServiceError::HandleTaken;
        }
        if message.contains("uq_users_email") {
            return AuthServiceError::EmailTaken;
        }
    }
    AuthServiceError::Internal(anyhow::Error::new(err).context("create user"))
}

fn split_secret(
    secret: &Option<StoredSecret>,
) -> (Option<String>, Option<chrono::DateTime<Utc>>) {
    match secret {
        Some(s) => (Some(s.token.clone()), Some(s.expires_at)),
        None => (None, None),
    }
}

fn join_secret(
    token: Option<String>,
    expires_at: Option<chrono::DateTime<Utc>>,
) -> Option<StoredSecret> {
    match (token, expires_at) {
        (Some(token), Some(expires_at)) => Some(StoredSecret { token, expires_at }),
        _ => None,
    }
}

fn user_from_model(model: users::Model) -> Result<User, AuthServiceError> {
    let refresh_tokens: Vec<RefreshTokenRecord> =
        serde_json::from_value(model.refresh_tokens).context("deserialize refresh tokens")?;

    Ok(User {
        id: model.id,
        handle: model.handle,
        email: model.email,
        password_hash: model.password_hash,
        display_name: model.display_name,
        role: UserRole::from_i16(model.role),
        email_verified: model.email_verified,
        active: model.active,
        failed_logins: model.failed_logins,
        lock_until: model.lock_until,
        refresh_tokens,
        verification_secret: join_secret(model.verification_token, model.verification_expires_at),
        reset_secret: join_secret(model.reset_token, model.reset_expires_at),
        last_login_at: model.last_login_at,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}
