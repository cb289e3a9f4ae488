//! Login issues both credentials: a bearer token in the body and a rotated
//! `sessionID` cookie. Logout only concerns the cookie.

use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{INVALID_REQUEST_DATA, users::MessageResponse};
use crate::socialfeed::{
    auth::{
        AuthState,
        cookie::{clear_session_cookie, extract_session_token, session_cookie},
    },
    error::ApiError,
    store::Store,
};

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct LoginRequest {
    /// Username or email.
    pub identifier: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in; sets the sessionID cookie", body = LoginResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unknown identifier or wrong password"),
        (status = 500, description = "Token or session could not be issued"),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn login(
    Extension(store): Extension<Arc<dyn Store>>,
    Extension(auth): Extension<Arc<AuthState>>,
    payload: Option<Json<LoginRequest>>,
) -> Result<Response, ApiError> {
    let Some(Json(request)) = payload else {
        return Err(ApiError::validation(INVALID_REQUEST_DATA));
    };
    if request.identifier.trim().is_empty() || request.password.is_empty() {
        return Err(ApiError::validation("Invalid input"));
    }

    let user = match store.find_user_by_identifier(request.identifier.trim()).await {
        Ok(Some(user)) => user,
        Ok(None) => return Err(ApiError::unauthorized("Invalid username or email")),
        Err(err) => {
            error!("Failed to look up user: {err:#}");
            return Err(ApiError::internal("Failed to look up user"));
        }
    };

    if !auth
        .hasher()
        .verify(&user.password_hash, &request.password)
        .await
    {
        warn!(user_id = user.user_id, "Rejected login: wrong password");
        return Err(ApiError::unauthorized("Invalid password"));
    }

    let token = auth.tokens().issue(&user).map_err(|err| {
        error!("Failed to generate token: {err}");
        ApiError::internal("Failed to generate token")
    })?;

    let cookie_token = Uuid::new_v4().to_string();
    store
        .set_cookie_token(user.user_id, &cookie_token)
        .await
        .map_err(|err| {
            error!("Failed to rotate session token: {err:#}");
            ApiError::internal("Failed to update user session token")
        })?;

    let cookie = session_cookie(auth.config(), &cookie_token).map_err(|err| {
        error!("Failed to build session cookie: {err}");
        ApiError::internal("Failed to update user session token")
    })?;

    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);

    info!(user_id = user.user_id, "User logged in");
    Ok((
        StatusCode::OK,
        headers,
        Json(LoginResponse {
            message: "Login successful".to_string(),
            token,
        }),
    )
        .into_response())
}

#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses(
        (status = 200, description = "Logged out; clears the sessionID cookie", body = MessageResponse),
    ),
    tag = "auth"
)]
pub async fn logout(
    headers: HeaderMap,
    Extension(store): Extension<Arc<dyn Store>>,
    Extension(auth): Extension<Arc<AuthState>>,
) -> impl IntoResponse {
    if let Some(token) = extract_session_token(&headers) {
        if let Err(err) = store.clear_cookie_token(&token).await {
            error!("Failed to clear session token: {err:#}");
        }
    }

    // Always clear the cookie, even if no user held the token.
    let mut response_headers = HeaderMap::new();
    match clear_session_cookie(auth.config()) {
        Ok(cookie) => {
            response_headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => error!("Failed to build clearing cookie: {err}"),
    }

    (
        StatusCode::OK,
        response_headers,
        Json(MessageResponse {
            message: "Logout successful".to_string(),
        }),
    )
}
