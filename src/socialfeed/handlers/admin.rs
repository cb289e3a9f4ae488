//! Admin area: user inspection and SQL migrations.
//!
//! Every route here sits behind the basic-auth gate.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, Query},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::{error, info, instrument};
use utoipa::{IntoParams, ToSchema};

use super::{INVALID_REQUEST_DATA, parse_id, users::MessageResponse};
use crate::socialfeed::{
    auth::AdminPrincipal,
    error::ApiError,
    migrations::{MigrationCatalog, MigrationEntry, MigrationError},
    models::UserDetail,
    store::Store,
};

const INVALID_USER_ID: &str = "Invalid user ID";

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(default)]
pub struct AdminUsersQuery {
    /// Return only this user.
    pub uid: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct RunMigrationRequest {
    pub migration_id: String,
}

async fn fetch_user(store: &dyn Store, user_id: i64) -> Result<UserDetail, ApiError> {
    match store.find_user(user_id).await {
        Ok(Some(user)) => Ok(UserDetail::from(&user)),
        Ok(None) => Err(ApiError::not_found("User not found")),
        Err(err) => {
            error!("Failed to fetch user: {err:#}");
            Err(ApiError::internal("Failed to get users"))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    params(AdminUsersQuery),
    responses(
        (status = 200, description = "All users, or the single user named by uid", body = [UserDetail]),
        (status = 400, description = "Invalid user id"),
        (status = 401, description = "Bad admin credentials"),
        (status = 404, description = "User not found"),
    ),
    security(("basic" = [])),
    tag = "admin"
)]
pub async fn list_users(
    Extension(store): Extension<Arc<dyn Store>>,
    Query(query): Query<AdminUsersQuery>,
) -> Result<Response, ApiError> {
    if let Some(uid) = query.uid.as_deref().filter(|uid| !uid.is_empty()) {
        let user_id = parse_id(uid, INVALID_USER_ID)?;
        let user = fetch_user(store.as_ref(), user_id).await?;
        return Ok(Json(user).into_response());
    }

    match store.list_users().await {
        Ok(users) => {
            let users: Vec<UserDetail> = users.iter().map(UserDetail::from).collect();
            Ok(Json(users).into_response())
        }
        Err(err) => {
            error!("Failed to list users: {err:#}");
            Err(ApiError::internal("Failed to get users"))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/users/{uid}",
    params(("uid" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User detail", body = UserDetail),
        (status = 400, description = "Invalid user id"),
        (status = 401, description = "Bad admin credentials"),
        (status = 404, description = "User not found"),
    ),
    security(("basic" = [])),
    tag = "admin"
)]
pub async fn get_user(
    Path(uid): Path<String>,
    Extension(store): Extension<Arc<dyn Store>>,
) -> Result<Json<UserDetail>, ApiError> {
    let user_id = parse_id(&uid, INVALID_USER_ID)?;
    fetch_user(store.as_ref(), user_id).await.map(Json)
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/get-migrations",
    responses(
        (status = 200, description = "Available migration files", body = [MigrationEntry]),
        (status = 401, description = "Bad admin credentials"),
        (status = 500, description = "Migrations directory unreadable"),
    ),
    security(("basic" = [])),
    tag = "admin"
)]
pub async fn list_migrations(
    Extension(catalog): Extension<Arc<MigrationCatalog>>,
) -> Result<Json<Vec<MigrationEntry>>, ApiError> {
    catalog.list().await.map(Json).map_err(|err| {
        error!(dir = %catalog.dir().display(), "Could not read migrations directory: {err}");
        ApiError::internal("Could not read migrations directory")
    })
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/run-migrations",
    request_body = RunMigrationRequest,
    responses(
        (status = 200, description = "Migration executed", body = MessageResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Bad admin credentials"),
        (status = 404, description = "Migration not found"),
        (status = 500, description = "Migration could not be read or executed"),
    ),
    security(("basic" = [])),
    tag = "admin"
)]
#[instrument(skip_all)]
pub async fn run_migration(
    Extension(admin): Extension<AdminPrincipal>,
    Extension(store): Extension<Arc<dyn Store>>,
    Extension(catalog): Extension<Arc<MigrationCatalog>>,
    payload: Option<Json<RunMigrationRequest>>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Some(Json(request)) = payload else {
        return Err(ApiError::validation(INVALID_REQUEST_DATA));
    };

    let sql = match catalog.read(&request.migration_id).await {
        Ok(sql) => sql,
        Err(MigrationError::InvalidId) => return Err(ApiError::validation("Invalid request")),
        Err(MigrationError::NotFound) => return Err(ApiError::not_found("Migration not found")),
        Err(err @ MigrationError::Io(_)) => {
            error!("Failed to read migration {}: {err}", request.migration_id);
            return Err(ApiError::internal("Error reading migration file"));
        }
    };

    if let Err(err) = store.execute_script(&sql).await {
        error!("Failed to run migration {}: {err:#}", request.migration_id);
        return Err(ApiError::internal("Error running migration"));
    }

    info!(
        migration_id = %request.migration_id,
        admin = %admin.username,
        "Migration executed"
    );
    Ok(Json(MessageResponse {
        message: "Migration ran successfully".to_string(),
    }))
}
