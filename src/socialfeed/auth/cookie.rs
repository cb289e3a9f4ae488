//! The `sessionID` cookie.

use axum::http::{
    HeaderMap, HeaderValue,
    header::{COOKIE, InvalidHeaderValue},
};

use super::state::AuthConfig;

pub const SESSION_COOKIE_NAME: &str = "sessionID";

/// `Set-Cookie` value carrying a fresh session token. Lives as long as the
/// bearer token issued alongside it.
pub fn session_cookie(config: &AuthConfig, token: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    let max_age = config.token_ttl_seconds();
    let mut cookie =
        format!("{SESSION_COOKIE_NAME}={token}; Path=/; Max-Age={max_age}; HttpOnly; SameSite=Lax");
    if config.cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

pub fn clear_session_cookie(config: &AuthConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax");
    if config.cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Pull the session token out of the `Cookie` header(s). Empty values count
/// as absent.
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| {
            let (key, val) = pair.trim().split_once('=')?;
            let val = val.trim();
            (key.trim() == SESSION_COOKIE_NAME && !val.is_empty()).then(|| val.to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn config() -> AuthConfig {
        AuthConfig::new(
            SecretString::from("s"),
            "admin".to_string(),
            SecretString::from("p"),
        )
    }

    #[test]
    fn session_cookie_attributes() {
        let value = session_cookie(&config(), "abc").unwrap();
        let value = value.to_str().unwrap();
        assert!(value.starts_with("sessionID=abc;"));
        assert!(value.contains("Max-Age=259200"));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("Secure"));
        assert!(value.contains("Path=/"));
    }

    #[test]
    fn insecure_cookie_omits_secure() {
        let value = session_cookie(&config().with_cookie_secure(false), "abc").unwrap();
        assert!(!value.to_str().unwrap().contains("Secure"));
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let value = clear_session_cookie(&config()).unwrap();
        let value = value.to_str().unwrap();
        assert!(value.starts_with("sessionID=;"));
        assert!(value.contains("Max-Age=0"));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("Secure"));
    }

    #[test]
    fn extracts_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; sessionID=tok-1; x=y"));
        assert_eq!(extract_session_token(&headers).as_deref(), Some("tok-1"));
    }

    #[test]
    fn missing_or_empty_cookie_is_none() {
        let mut headers = HeaderMap::new();
        assert!(extract_session_token(&headers).is_none());
        headers.insert(COOKIE, HeaderValue::from_static("sessionID="));
        assert!(extract_session_token(&headers).is_none());
    }
}
