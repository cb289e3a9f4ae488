use std::sync::Arc;

use axum::{
    body::Body,
    extract::Extension,
    http::{HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use utoipa::ToSchema;

use crate::GIT_COMMIT_HASH;
use crate::socialfeed::store::Store;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Health {
    commit: String,
    name: String,
    version: String,
    database: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Database is reachable", body = Health),
        (status = 503, description = "Database is unreachable", body = Health)
    ),
    tag = "health"
)]
pub async fn health(method: Method, store: Extension<Arc<dyn Store>>) -> impl IntoResponse {
    let database = store.ping().await.map_err(|err| {
        error!("Failed to ping database: {err:#}");
    });

    let health = Health {
        commit: GIT_COMMIT_HASH.to_string(),
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: if database.is_ok() { "ok" } else { "error" }.to_string(),
    };

    let body = if method == Method::HEAD {
        Body::empty().into_response()
    } else {
        Json(&health).into_response()
    };

    let short_hash = health.commit.get(0..7).unwrap_or_default();
    let mut headers = HeaderMap::new();
    match format!("{}:{}:{short_hash}", health.name, health.version).parse::<HeaderValue>() {
        Ok(value) => {
            headers.insert("X-App", value);
        }
        Err(err) => error!("Failed to parse X-App header: {err}"),
    }

    if database.is_ok() {
        debug!("Database connection is healthy");
        (StatusCode::OK, headers, body)
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, headers, body)
    }
}
