use axum::http::{header::InvalidHeaderValue, HeaderValue};

use super::jwt::SESSION_TTL;

pub const SESSION_COOKIE_NAME: &str = "jwt";

/// Builds the `Set-Cookie` value carrying the session token.
///
/// `SameSite=None` lets a separately hosted frontend send the cookie back;
/// `Secure` is only added when `secure` is set (production).
pub fn session_cookie(token: &str, secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    let max_age = SESSION_TTL.as_secs();
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; Max-Age={max_age}; HttpOnly; SameSite=None"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}
