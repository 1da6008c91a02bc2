//! Refresh-token cookie builders.
//!
//! The refresh token travels only on this cookie; access tokens stay in the
//! response body and the Authorization header.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use crate::token::REFRESH_TOKEN_TTL_SECS;

/// Cookie name for the refresh token.
pub const LATCHKEY_REFRESH_TOKEN: &str = "latchkey_refresh_token";

/// Set the refresh-token cookie on the jar.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use latchkey_auth::cookie::{set_refresh_token_cookie, LATCHKEY_REFRESH_TOKEN};
///
/// let jar = CookieJar::new();
/// let jar = set_refresh_token_cookie(jar, "refresh_value".to_string(), "example.com".to_string());
/// let cookie = jar.get(LATCHKEY_REFRESH_TOKEN).unwrap();
/// assert_eq!(cookie.path(), Some("/auth/token"));
/// assert_eq!(cookie.domain(), Some("example.com"));
/// assert_eq!(cookie.max_age(), Some(time::Duration::seconds(604800)));
/// assert!(cookie.http_only().unwrap_or(false));
/// assert!(cookie.secure().unwrap_or(false));
/// ```
pub fn set_refresh_token_cookie(jar: CookieJar, value: String, domain: String) -> CookieJar {
    let cookie = Cookie::build((LATCHKEY_REFRESH_TOKEN, value))
        .path("/auth/token")
        .domain(domain)
        .max_age(Duration::seconds(REFRESH_TOKEN_TTL_SECS))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}

/// Clear the refresh-token cookie by setting Max-Age to 0.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use latchkey_auth::cookie::{
///     clear_refresh_token_cookie, set_refresh_token_cookie, LATCHKEY_REFRESH_TOKEN,
/// };
///
/// let jar = CookieJar::new();
/// let jar = set_refresh_token_cookie(jar, "r".to_string(), "example.com".to_string());
/// let jar = clear_refresh_token_cookie(jar, "example.com".to_string());
/// let cookie = jar.get(LATCHKEY_REFRESH_TOKEN).unwrap();
/// assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
/// ```
pub fn clear_refresh_token_cookie(jar: CookieJar, domain: String) -> CookieJar {
    let cookie = Cookie::build((LATCHKEY_REFRESH_TOKEN, ""))
        .path("/auth/token")
        .domain(domain)
        .max_age(Duration::ZERO)
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}
