//! Registration and profile updates.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use utoipa::ToSchema;

use super::{INVALID_REQUEST_DATA, email, max_chars, min_chars, parse_id, required};
use crate::socialfeed::{
    auth::AuthState,
    error::ApiError,
    models::{NewUser, UserChanges, UserResponse},
    store::{SaveOutcome, Store},
};

const USERNAME_TAKEN: &str = "Username already exists";
const EMAIL_TAKEN: &str = "Email already exists";

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct CreateUserRequest {
    pub username: String,
    pub firstname: String,
    pub surname: String,
    pub email: String,
    pub password: String,
}

impl CreateUserRequest {
    fn validate(&self) -> Result<(), ApiError> {
        required("Username", &self.username)?;
        min_chars("Username", &self.username, 3)?;
        max_chars("Username", &self.username, 32)?;
        required("Firstname", &self.firstname)?;
        max_chars("Firstname", &self.firstname, 32)?;
        required("Surname", &self.surname)?;
        max_chars("Surname", &self.surname, 32)?;
        required("Email", &self.email)?;
        email("Email", &self.email)?;
        required("Password", &self.password)?;
        min_chars("Password", &self.password, 8)
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdateUserRequest {
    pub username: String,
    pub firstname: String,
    pub surname: String,
    /// New password; omit or leave empty to keep the current one.
    pub password: Option<String>,
}

impl UpdateUserRequest {
    fn new_password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }

    fn validate(&self) -> Result<(), ApiError> {
        required("Username", &self.username)?;
        min_chars("Username", &self.username, 3)?;
        max_chars("Username", &self.username, 32)?;
        required("Firstname", &self.firstname)?;
        required("Surname", &self.surname)?;
        if let Some(password) = self.new_password() {
            min_chars("Password", password, 8)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct ChangePasswordRequest {
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Name the field that collides with an existing user.
async fn conflict_message(store: &dyn Store, username: &str, email: &str) -> &'static str {
    match store.find_user_conflict(username, email).await {
        Ok(Some(existing)) if existing.username != username => EMAIL_TAKEN,
        _ => USERNAME_TAKEN,
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Username or email already exists"),
    ),
    tag = "users"
)]
#[instrument(skip_all)]
pub async fn create_user(
    Extension(store): Extension<Arc<dyn Store>>,
    Extension(auth): Extension<Arc<AuthState>>,
    payload: Option<Json<CreateUserRequest>>,
) -> Result<Response, ApiError> {
    let Some(Json(request)) = payload else {
        return Err(ApiError::validation(INVALID_REQUEST_DATA));
    };
    request.validate()?;

    match store
        .find_user_conflict(&request.username, &request.email)
        .await
    {
        Ok(Some(existing)) if existing.username == request.username => {
            return Err(ApiError::conflict(USERNAME_TAKEN));
        }
        Ok(Some(_)) => return Err(ApiError::conflict(EMAIL_TAKEN)),
        Ok(None) => {}
        Err(err) => {
            error!("Failed to check user uniqueness: {err:#}");
            return Err(ApiError::internal("Failed to create user"));
        }
    }

    let is_admin = auth
        .config()
        .is_admin_credentials(&request.username, &request.password);

    let password_hash = auth.hasher().hash(&request.password).await.map_err(|err| {
        error!("Failed to hash password: {err:#}");
        ApiError::internal("Failed to hash password")
    })?;

    let new_user = NewUser {
        username: request.username.clone(),
        firstname: request.firstname,
        surname: request.surname,
        email: request.email.clone(),
        password_hash,
        is_admin,
    };

    match store.create_user(new_user).await {
        Ok(SaveOutcome::Saved(user)) => {
            info!(user_id = user.user_id, "User registered");
            Ok((StatusCode::CREATED, Json(UserResponse::from(&user))).into_response())
        }
        Ok(SaveOutcome::Conflict) => Err(ApiError::conflict(
            conflict_message(store.as_ref(), &request.username, &request.email).await,
        )),
        Err(err) => {
            error!("Failed to create user: {err:#}");
            Err(ApiError::internal("Failed to create user"))
        }
    }
}

#[utoipa::path(
    put,
    path = "/api/v1/restricted/users/{uid}",
    params(("uid" = i64, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Invalid id or input"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Username already exists"),
    ),
    security(("bearer" = [])),
    tag = "users"
)]
#[instrument(skip_all)]
pub async fn update_user(
    Path(uid): Path<String>,
    Extension(store): Extension<Arc<dyn Store>>,
    Extension(auth): Extension<Arc<AuthState>>,
    payload: Option<Json<UpdateUserRequest>>,
) -> Result<Json<UserResponse>, ApiError> {
    let user_id = parse_id(&uid, "Invalid user ID")?;
    let Some(Json(request)) = payload else {
        return Err(ApiError::validation(INVALID_REQUEST_DATA));
    };
    request.validate()?;

    let password_hash = match request.new_password() {
        Some(password) => Some(auth.hasher().hash(password).await.map_err(|err| {
            error!("Failed to hash password: {err:#}");
            ApiError::internal("Failed to hash password")
        })?),
        None => None,
    };

    let changes = UserChanges {
        username: request.username,
        firstname: request.firstname,
        surname: request.surname,
        password_hash,
    };

    match store.update_user(user_id, changes).await {
        Ok(Some(SaveOutcome::Saved(user))) => Ok(Json(UserResponse::from(&user))),
        Ok(Some(SaveOutcome::Conflict)) => Err(ApiError::conflict(USERNAME_TAKEN)),
        Ok(None) => Err(ApiError::not_found("User not found")),
        Err(err) => {
            error!("Failed to update user: {err:#}");
            Err(ApiError::internal("Failed to update user"))
        }
    }
}

#[utoipa::path(
    put,
    path = "/api/v1/restricted/users-update-password/{uid}",
    params(("uid" = i64, Path, description = "User id")),
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password updated", body = MessageResponse),
        (status = 400, description = "Invalid id or empty password"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 404, description = "User not found"),
    ),
    security(("bearer" = [])),
    tag = "users"
)]
#[instrument(skip_all)]
pub async fn update_password(
    Path(uid): Path<String>,
    Extension(store): Extension<Arc<dyn Store>>,
    Extension(auth): Extension<Arc<AuthState>>,
    payload: Option<Json<ChangePasswordRequest>>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user_id = parse_id(&uid, "Invalid user ID")?;
    let Some(Json(request)) = payload else {
        return Err(ApiError::validation(INVALID_REQUEST_DATA));
    };
    required("Password", &request.password)?;
    min_chars("Password", &request.password, 8)?;

    let password_hash = auth.hasher().hash(&request.password).await.map_err(|err| {
        error!("Failed to hash password: {err:#}");
        ApiError::internal("Failed to hash password")
    })?;

    match store.update_password(user_id, &password_hash).await {
        Ok(true) => Ok(Json(MessageResponse {
            message: "Password updated successfully".to_string(),
        })),
        Ok(false) => Err(ApiError::not_found("User not found")),
        Err(err) => {
            error!("Failed to update password: {err:#}");
            Err(ApiError::internal("Failed to update password"))
        }
    }
}
