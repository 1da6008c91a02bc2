/// Auth service configuration loaded from environment variables.
#[derive(Debug)]
pub struct AuthConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HMAC secret for signing access tokens.
    pub access_token_secret: String,
    /// HMAC secret for signing refresh tokens.
    pub refresh_token_secret: String,
    /// HMAC secret for signing email-verification tokens.
    pub email_verification_secret: String,
    /// HMAC secret for signing password-reset tokens.
    pub password_reset_secret: String,
    /// Cookie domain attribute (root domain, e.g. "example.com").
    pub cookie_domain: String,
    /// TCP port to listen on (default 3100). Env var: `AUTH_PORT`.
    pub auth_port: u16,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            access_token_secret: std::env::var("ACCESS_TOKEN_SECRET")
                .expect("ACCESS_TOKEN_SECRET"),
            refresh_token_secret: std::env::var("REFRESH_TOKEN_SECRET")
                .expect("REFRESH_TOKEN_SECRET"),
            email_verification_secret: std::env::var("EMAIL_VERIFICATION_SECRET")
                .expect("EMAIL_VERIFICATION_SECRET"),
            password_reset_secret: std::env::var("PASSWORD_RESET_SECRET")
                .expect("PASSWORD_RESET_SECRET"),
            cookie_domain: std::env::var("COOKIE_DOMAIN").expect("COOKIE_DOMAIN"),
            auth_port: std::env::var("AUTH_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3100),
        }
    }
}
