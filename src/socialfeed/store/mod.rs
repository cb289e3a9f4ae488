//! Persistence seam.
//!
//! Handlers only talk to [`Store`]; [`PgStore`] is the production
//! implementation. Write operations that can hit a unique constraint return a
//! [`SaveOutcome`] instead of an error so callers can answer 409.

use anyhow::Result;
use async_trait::async_trait;

use super::models::{Comment, CommentView, NewUser, Post, PostView, User, UserChanges};

mod postgres;

#[cfg(test)]
pub(crate) mod memory;

pub use postgres::PgStore;

/// Result of an insert/update guarded by unique constraints.
#[derive(Debug)]
pub enum SaveOutcome<T> {
    Saved(T),
    Conflict,
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Check that the backing store is reachable.
    async fn ping(&self) -> Result<()>;

    async fn list_users(&self) -> Result<Vec<User>>;

    async fn find_user(&self, user_id: i64) -> Result<Option<User>>;

    /// Look up a user whose username or email equals `identifier`.
    async fn find_user_by_identifier(&self, identifier: &str) -> Result<Option<User>>;

    /// Return any user that already holds `username` or `email`.
    async fn find_user_conflict(&self, username: &str, email: &str) -> Result<Option<User>>;

    async fn create_user(&self, user: NewUser) -> Result<SaveOutcome<User>>;

    /// Returns `Ok(None)` when the user does not exist.
    async fn update_user(
        &self,
        user_id: i64,
        changes: UserChanges,
    ) -> Result<Option<SaveOutcome<User>>>;

    /// Returns `false` when the user does not exist.
    async fn update_password(&self, user_id: i64, password_hash: &str) -> Result<bool>;

    /// Replace the persisted cookie token, invalidating the previous one.
    async fn set_cookie_token(&self, user_id: i64, token: &str) -> Result<()>;

    /// Forget a cookie token. Returns `true` when a user held it.
    async fn clear_cookie_token(&self, token: &str) -> Result<bool>;

    async fn find_user_id_by_cookie_token(&self, token: &str) -> Result<Option<i64>>;

    async fn list_posts(&self) -> Result<Vec<PostView>>;

    async fn find_post(&self, post_id: i64) -> Result<Option<PostView>>;

    async fn create_post(&self, user_id: i64, message: &str) -> Result<Post>;

    async fn list_comments(&self, post_id: i64) -> Result<Vec<CommentView>>;

    async fn create_comment(&self, post_id: i64, comment_msg: &str) -> Result<Comment>;

    /// Record the author of a comment.
    async fn link_comment_author(&self, comment_id: i64, user_id: i64) -> Result<()>;

    /// Run a raw SQL script (possibly several statements).
    async fn execute_script(&self, sql: &str) -> Result<()>;
}
