//! Stored rows and the views returned to clients.
//!
//! Rows carry sensitive columns (password hash, cookie token); views never do.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// A user row as persisted.
#[derive(Clone, Debug)]
pub struct User {
    pub user_id: i64,
    pub username: String,
    pub firstname: String,
    pub surname: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub cookie_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to insert a user.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub username: String,
    pub firstname: String,
    pub surname: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
}

/// Fields an update may change. `password_hash` is only set when a new
/// password was supplied.
#[derive(Clone, Debug)]
pub struct UserChanges {
    pub username: String,
    pub firstname: String,
    pub surname: String,
    pub password_hash: Option<String>,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct Post {
    pub post_id: i64,
    pub user_id: i64,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Post joined with its author.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct PostView {
    pub post_id: i64,
    pub user_id: i64,
    pub username: String,
    pub firstname: String,
    pub surname: String,
    pub post_message: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct Comment {
    pub comment_id: i64,
    pub post_id: i64,
    pub comment_msg: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Comment joined with the author username.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct CommentView {
    pub comment_id: i64,
    pub post_id: i64,
    pub comment_msg: String,
    pub user_id: i64,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// Public user representation: no email, password or session token.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub uid: i64,
    pub username: String,
    pub firstname: String,
    pub surname: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            uid: user.user_id,
            username: user.username.clone(),
            firstname: user.firstname.clone(),
            surname: user.surname.clone(),
        }
    }
}

/// Admin representation: adds email, admin flag and timestamps.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct UserDetail {
    pub uid: i64,
    pub username: String,
    pub firstname: String,
    pub surname: String,
    pub email: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserDetail {
    fn from(user: &User) -> Self {
        Self {
            uid: user.user_id,
            username: user.username.clone(),
            firstname: user.firstname.clone(),
            surname: user.surname.clone(),
            email: user.email.clone(),
            is_admin: user.is_admin,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            user_id: 7,
            username: "alice".to_string(),
            firstname: "A".to_string(),
            surname: "B".to_string(),
            email: "a@b.com".to_string(),
            password_hash: "$2b$04$hash".to_string(),
            is_admin: false,
            cookie_token: Some("cookie".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn user_response_hides_sensitive_fields() {
        let json = serde_json::to_string(&UserResponse::from(&user())).unwrap_or_default();
        assert!(json.contains(r#""username":"alice""#));
        assert!(json.contains(r#""uid":7"#));
        assert!(!json.contains("password"));
        assert!(!json.contains("email"));
        assert!(!json.contains("cookie"));
    }

    #[test]
    fn user_detail_keeps_email_only() {
        let json = serde_json::to_string(&UserDetail::from(&user())).unwrap_or_default();
        assert!(json.contains(r#""email":"a@b.com""#));
        assert!(!json.contains("password"));
        assert!(!json.contains("cookie"));
    }
}
