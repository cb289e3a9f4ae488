//! HTTP error taxonomy shared by handlers and auth gates.
//!
//! Every variant renders as `{"message": "..."}` with the matching status.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or missing input.
    #[error("{0}")]
    Validation(String),

    /// Referenced entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Uniqueness violation.
    #[error("{0}")]
    Conflict(String),

    /// Missing, invalid or expired credential.
    #[error("{0}")]
    Unauthorized(String),

    /// Persistence (or other internal) failure, status depends on the operation.
    #[error("{message}")]
    Store { status: StatusCode, message: String },
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    /// Store failure reported as 400.
    pub fn store_bad_request(message: impl Into<String>) -> Self {
        Self::Store {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    /// Store failure reported as 500.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Store {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Store { status, .. } => *status,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(ApiError::validation("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::conflict("x").status(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::unauthorized("x").status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::store_bad_request("x").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::internal("x").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn renders_message_body() {
        let response = ApiError::not_found("Post not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap_or_default();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap_or_default();
        assert_eq!(body["message"], "Post not found");
    }
}
