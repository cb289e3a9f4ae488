use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::{error, info};
use utoipa::{IntoParams, ToSchema};

use super::{INVALID_REQUEST_DATA, parse_id, required};
use crate::socialfeed::{
    auth::Claims,
    error::ApiError,
    models::{Post, PostView},
    store::Store,
};

const POST_NOT_FOUND: &str = "Post not found";
const INVALID_POST_ID: &str = "Invalid post ID";

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(default)]
pub struct PostsQuery {
    /// Return only this post.
    pub pid: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct CreatePostRequest {
    #[serde(alias = "post_message")]
    pub message: String,
}

async fn fetch_post(store: &dyn Store, post_id: i64) -> Result<PostView, ApiError> {
    match store.find_post(post_id).await {
        Ok(Some(post)) => Ok(post),
        Ok(None) => Err(ApiError::not_found(POST_NOT_FOUND)),
        Err(err) => {
            error!("Failed to fetch post: {err:#}");
            Err(ApiError::internal("Failed to get posts"))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/posts",
    params(PostsQuery),
    responses(
        (status = 200, description = "All posts newest first, or the single post named by pid", body = [PostView]),
        (status = 400, description = "Invalid post id"),
        (status = 404, description = "Post not found"),
    ),
    tag = "posts"
)]
pub async fn list_posts(
    Extension(store): Extension<Arc<dyn Store>>,
    Query(query): Query<PostsQuery>,
) -> Result<Response, ApiError> {
    if let Some(pid) = query.pid.as_deref().filter(|pid| !pid.is_empty()) {
        let post_id = parse_id(pid, INVALID_POST_ID)?;
        let post = fetch_post(store.as_ref(), post_id).await?;
        return Ok(Json(post).into_response());
    }

    match store.list_posts().await {
        Ok(posts) => Ok(Json(posts).into_response()),
        Err(err) => {
            error!("Failed to list posts: {err:#}");
            Err(ApiError::internal("Failed to get posts"))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/posts/{pid}",
    params(("pid" = i64, Path, description = "Post id")),
    responses(
        (status = 200, description = "Post with author fields", body = PostView),
        (status = 400, description = "Invalid post id"),
        (status = 404, description = "Post not found"),
    ),
    tag = "posts"
)]
pub async fn get_post(
    Path(pid): Path<String>,
    Extension(store): Extension<Arc<dyn Store>>,
) -> Result<Json<PostView>, ApiError> {
    let post_id = parse_id(&pid, INVALID_POST_ID)?;
    fetch_post(store.as_ref(), post_id).await.map(Json)
}

#[utoipa::path(
    post,
    path = "/api/v1/restricted/posts",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Post created", body = Post),
        (status = 400, description = "Invalid input or store failure"),
        (status = 401, description = "Missing or invalid bearer token"),
    ),
    security(("bearer" = [])),
    tag = "posts"
)]
pub async fn create_post(
    Extension(claims): Extension<Claims>,
    Extension(store): Extension<Arc<dyn Store>>,
    payload: Option<Json<CreatePostRequest>>,
) -> Result<Response, ApiError> {
    let Some(Json(request)) = payload else {
        return Err(ApiError::validation(INVALID_REQUEST_DATA));
    };
    required("Message", &request.message)?;

    match store.create_post(claims.uid, &request.message).await {
        Ok(post) => {
            info!(post_id = post.post_id, user_id = claims.uid, "Post created");
            Ok((StatusCode::CREATED, Json(post)).into_response())
        }
        Err(err) => {
            error!("Failed to create post: {err:#}");
            Err(ApiError::store_bad_request(
                "Failed to create post. Please try again",
            ))
        }
    }
}
