//! Request gates.
//!
//! Each gate is an `axum::middleware::from_fn` function mounted with
//! `route_layer` on its route group. On success it inserts the resolved
//! principal into request extensions for the handler.

use std::sync::Arc;

use axum::{
    Extension,
    body::Body,
    http::{
        HeaderMap, HeaderValue, Request,
        header::{AUTHORIZATION, WWW_AUTHENTICATE},
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64ct::{Base64, Encoding};
use tracing::{debug, error, warn};

use super::cookie::extract_session_token;
use super::session::SessionStatus;
use super::state::AuthState;
use crate::socialfeed::error::ApiError;
use crate::socialfeed::store::Store;

const MISSING_JWT: &str = "missing or malformed jwt";
const INVALID_JWT: &str = "invalid or expired jwt";
const BASIC_REALM: &str = r#"Basic realm="Restricted""#;

/// Identity resolved from the session cookie.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionUser {
    pub user_id: i64,
}

/// Identity resolved from admin basic auth.
#[derive(Clone, Debug)]
pub struct AdminPrincipal {
    pub username: String,
    pub session: SessionStatus,
}

enum BearerError {
    Missing,
    Malformed,
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, BearerError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(BearerError::Missing)?
        .to_str()
        .map_err(|_| BearerError::Malformed)?;
    let token = value
        .trim()
        .strip_prefix("Bearer ")
        .ok_or(BearerError::Malformed)?
        .trim();
    if token.is_empty() {
        Err(BearerError::Malformed)
    } else {
        Ok(token)
    }
}

/// Require a valid bearer token; inserts its `Claims`.
pub async fn require_bearer(
    Extension(auth): Extension<Arc<AuthState>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = match bearer_token(request.headers()) {
        Ok(token) => token,
        Err(BearerError::Missing) => {
            return ApiError::unauthorized(MISSING_JWT).into_response();
        }
        Err(BearerError::Malformed) => {
            return ApiError::validation(MISSING_JWT).into_response();
        }
    };

    match auth.tokens().verify(token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(err) => {
            debug!("Rejected bearer token: {err}");
            ApiError::unauthorized(INVALID_JWT).into_response()
        }
    }
}

/// Require a `sessionID` cookie that matches a user's persisted token.
pub async fn require_session_cookie(
    Extension(store): Extension<Arc<dyn Store>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let Some(token) = extract_session_token(request.headers()) else {
        return ApiError::unauthorized("Session unauthorized").into_response();
    };

    match store.find_user_id_by_cookie_token(&token).await {
        Ok(Some(user_id)) => {
            request.extensions_mut().insert(SessionUser { user_id });
            next.run(request).await
        }
        Ok(None) => ApiError::unauthorized("Session unauthorized or expired").into_response(),
        Err(err) => {
            error!("Failed to resolve session cookie: {err:#}");
            ApiError::unauthorized("Session unauthorized or expired").into_response()
        }
    }
}

fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let encoded = value
        .strip_prefix("Basic ")
        .or_else(|| value.strip_prefix("basic "))?
        .trim();
    let decoded = Base64::decode_vec(encoded).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

fn basic_challenge() -> Response {
    let mut response = ApiError::unauthorized("Unauthorized").into_response();
    response
        .headers_mut()
        .insert(WWW_AUTHENTICATE, HeaderValue::from_static(BASIC_REALM));
    response
}

/// Require the configured admin credentials via HTTP basic auth.
pub async fn require_admin(
    Extension(auth): Extension<Arc<AuthState>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let Some((username, password)) = basic_credentials(request.headers()) else {
        return basic_challenge();
    };

    if !auth.config().is_admin_credentials(&username, &password) {
        warn!("Rejected admin credentials");
        return basic_challenge();
    }

    let session = auth.admin_sessions().admit(&username).await;
    if session == SessionStatus::Created {
        debug!("Created admin session");
    }
    request
        .extensions_mut()
        .insert(AdminPrincipal { username, session });
    next.run(request).await
}
