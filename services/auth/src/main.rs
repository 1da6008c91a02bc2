use sea_orm::Database;
use tracing::info;

use latchkey_auth::config::AuthConfig;
use latchkey_auth::router::build_router;
use latchkey_auth::state::AppState;
use latchkey_auth::token::{TokenIssuer, TokenSecrets};

#[tokio::main]
async fn main() {
    latchkey_core::tracing::init_tracing();

    let config = AuthConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let tokens = TokenIssuer::new(TokenSecrets {
        access: config.access_token_secret,
        refresh: config.refresh_token_secret,
        email_verification: config.email_verification_secret,
        password_reset: config.password_reset_secret,
    });

    let state = AppState {
        db,
        tokens,
        cookie_domain: config.cookie_domain,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.auth_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("auth service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
