//! Comments are stored in two steps: the comment row, then the link to its
//! author. A failed link leaves the comment in place and is reported as a
//! failed request.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::{error, info};
use utoipa::ToSchema;

use super::{INVALID_REQUEST_DATA, parse_id, required};
use crate::socialfeed::{
    auth::Claims,
    error::ApiError,
    models::{Comment, CommentView},
    store::Store,
};

const CREATE_FAILED: &str = "Failed to create comment. Please try again";

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct CreateCommentRequest {
    pub post_id: i64,
    pub comment_msg: String,
}

/// 400 unless the post exists.
async fn ensure_post(store: &dyn Store, post_id: i64) -> Result<(), ApiError> {
    match store.find_post(post_id).await {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(ApiError::validation("Post not found")),
        Err(err) => {
            error!("Failed to fetch post: {err:#}");
            Err(ApiError::store_bad_request("Post not found"))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/comments/{pid}",
    params(("pid" = i64, Path, description = "Post id")),
    responses(
        (status = 200, description = "Comments with author username", body = [CommentView]),
        (status = 400, description = "Invalid post id or post not found"),
    ),
    tag = "comments"
)]
pub async fn list_comments(
    Path(pid): Path<String>,
    Extension(store): Extension<Arc<dyn Store>>,
) -> Result<Json<Vec<CommentView>>, ApiError> {
    let post_id = parse_id(&pid, "Invalid post ID")?;
    ensure_post(store.as_ref(), post_id).await?;

    store.list_comments(post_id).await.map(Json).map_err(|err| {
        error!("Failed to list comments: {err:#}");
        ApiError::store_bad_request("Failed to get comments")
    })
}

#[utoipa::path(
    post,
    path = "/api/v1/restricted/comments",
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment created", body = Comment),
        (status = 400, description = "Invalid input, post not found or store failure"),
        (status = 401, description = "Missing or invalid bearer token"),
    ),
    security(("bearer" = [])),
    tag = "comments"
)]
pub async fn create_comment(
    Extension(claims): Extension<Claims>,
    Extension(store): Extension<Arc<dyn Store>>,
    payload: Option<Json<CreateCommentRequest>>,
) -> Result<Response, ApiError> {
    let Some(Json(request)) = payload else {
        return Err(ApiError::validation(INVALID_REQUEST_DATA));
    };
    if request.post_id <= 0 {
        return Err(ApiError::validation(
            "Field validation for 'PostID' failed on the 'required' tag",
        ));
    }
    required("CommentMsg", &request.comment_msg)?;
    ensure_post(store.as_ref(), request.post_id).await?;

    let comment = store
        .create_comment(request.post_id, &request.comment_msg)
        .await
        .map_err(|err| {
            error!("Failed to create comment: {err:#}");
            ApiError::store_bad_request(CREATE_FAILED)
        })?;

    if let Err(err) = store.link_comment_author(comment.comment_id, claims.uid).await {
        // no rollback: the comment row stays without an author link
        error!(
            comment_id = comment.comment_id,
            user_id = claims.uid,
            "Failed to link comment author, comment left orphaned: {err:#}"
        );
        return Err(ApiError::store_bad_request(CREATE_FAILED));
    }

    info!(comment_id = comment.comment_id, user_id = claims.uid, "Comment created");
    Ok((StatusCode::CREATED, Json(comment)).into_response())
}
