//! PostgreSQL-backed [`Store`].

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::{Instrument, info_span};

use super::{SaveOutcome, Store};
use crate::socialfeed::models::{
    Comment, CommentView, NewUser, Post, PostView, User, UserChanges,
};

const USER_COLUMNS: &str = "user_id, username, firstname, surname, email, password, is_admin, \
                            cookie_token, created_at, updated_at";

const POST_VIEW_SELECT: &str = r"
    SELECT p.post_id, p.user_id, u.username, u.firstname, u.surname,
           p.message, p.created_at, p.updated_at
    FROM posts p
    JOIN users u ON u.user_id = p.user_id
";

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

fn user_from_row(row: &PgRow) -> User {
    User {
        user_id: row.get("user_id"),
        username: row.get("username"),
        firstname: row.get("firstname"),
        surname: row.get("surname"),
        email: row.get("email"),
        password_hash: row.get("password"),
        is_admin: row.get("is_admin"),
        cookie_token: row.get("cookie_token"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn post_view_from_row(row: &PgRow) -> PostView {
    PostView {
        post_id: row.get("post_id"),
        user_id: row.get("user_id"),
        username: row.get("username"),
        firstname: row.get("firstname"),
        surname: row.get("surname"),
        post_message: row.get("message"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn query_span(statement: &'static str) -> tracing::Span {
    info_span!("db.query", db.system = "postgresql", db.statement = statement)
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .instrument(query_span("ping"))
            .await
            .context("database ping failed")?;
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users ORDER BY user_id");
        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .instrument(query_span("list_users"))
            .await
            .context("failed to list users")?;
        Ok(rows.iter().map(user_from_row).collect())
    }

    async fn find_user(&self, user_id: i64) -> Result<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = $1");
        let row = sqlx::query(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .instrument(query_span("find_user"))
            .await
            .context("failed to fetch user")?;
        Ok(row.as_ref().map(user_from_row))
    }

    async fn find_user_by_identifier(&self, identifier: &str) -> Result<Option<User>> {
        let query = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1 OR email = $1 LIMIT 1"
        );
        let row = sqlx::query(&query)
            .bind(identifier)
            .fetch_optional(&self.pool)
            .instrument(query_span("find_user_by_identifier"))
            .await
            .context("failed to fetch user by identifier")?;
        Ok(row.as_ref().map(user_from_row))
    }

    async fn find_user_conflict(&self, username: &str, email: &str) -> Result<Option<User>> {
        let query = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1 OR email = $2 LIMIT 1"
        );
        let row = sqlx::query(&query)
            .bind(username)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(query_span("find_user_conflict"))
            .await
            .context("failed to check user uniqueness")?;
        Ok(row.as_ref().map(user_from_row))
    }

    async fn create_user(&self, user: NewUser) -> Result<SaveOutcome<User>> {
        let query = format!(
            "INSERT INTO users (username, firstname, surname, email, password, is_admin) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {USER_COLUMNS}"
        );
        let result = sqlx::query(&query)
            .bind(&user.username)
            .bind(&user.firstname)
            .bind(&user.surname)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.is_admin)
            .fetch_one(&self.pool)
            .instrument(query_span("create_user"))
            .await;

        match result {
            Ok(row) => Ok(SaveOutcome::Saved(user_from_row(&row))),
            Err(err) if is_unique_violation(&err) => Ok(SaveOutcome::Conflict),
            Err(err) => Err(err).context("failed to insert user"),
        }
    }

    async fn update_user(
        &self,
        user_id: i64,
        changes: UserChanges,
    ) -> Result<Option<SaveOutcome<User>>> {
        let query = format!(
            "UPDATE users SET username = $2, firstname = $3, surname = $4, \
             password = COALESCE($5, password), updated_at = NOW() \
             WHERE user_id = $1 RETURNING {USER_COLUMNS}"
        );
        let result = sqlx::query(&query)
            .bind(user_id)
            .bind(&changes.username)
            .bind(&changes.firstname)
            .bind(&changes.surname)
            .bind(changes.password_hash.as_deref())
            .fetch_optional(&self.pool)
            .instrument(query_span("update_user"))
            .await;

        match result {
            Ok(row) => Ok(row.as_ref().map(|row| SaveOutcome::Saved(user_from_row(row)))),
            Err(err) if is_unique_violation(&err) => Ok(Some(SaveOutcome::Conflict)),
            Err(err) => Err(err).context("failed to update user"),
        }
    }

    async fn update_password(&self, user_id: i64, password_hash: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE users SET password = $2, updated_at = NOW() WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(password_hash)
        .execute(&self.pool)
        .instrument(query_span("update_password"))
        .await
        .context("failed to update password")?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_cookie_token(&self, user_id: i64, token: &str) -> Result<()> {
        sqlx::query("UPDATE users SET cookie_token = $2, updated_at = NOW() WHERE user_id = $1")
            .bind(user_id)
            .bind(token)
            .execute(&self.pool)
            .instrument(query_span("set_cookie_token"))
            .await
            .context("failed to store cookie token")?;
        Ok(())
    }

    async fn clear_cookie_token(&self, token: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE users SET cookie_token = NULL, updated_at = NOW() WHERE cookie_token = $1",
        )
        .bind(token)
        .execute(&self.pool)
        .instrument(query_span("clear_cookie_token"))
        .await
        .context("failed to clear cookie token")?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_user_id_by_cookie_token(&self, token: &str) -> Result<Option<i64>> {
        let row = sqlx::query("SELECT user_id FROM users WHERE cookie_token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .instrument(query_span("find_user_id_by_cookie_token"))
            .await
            .context("failed to look up cookie token")?;
        Ok(row.map(|row| row.get("user_id")))
    }

    async fn list_posts(&self) -> Result<Vec<PostView>> {
        let query = format!("{POST_VIEW_SELECT} ORDER BY p.created_at DESC, p.post_id DESC");
        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .instrument(query_span("list_posts"))
            .await
            .context("failed to list posts")?;
        Ok(rows.iter().map(post_view_from_row).collect())
    }

    async fn find_post(&self, post_id: i64) -> Result<Option<PostView>> {
        let query = format!("{POST_VIEW_SELECT} WHERE p.post_id = $1");
        let row = sqlx::query(&query)
            .bind(post_id)
            .fetch_optional(&self.pool)
            .instrument(query_span("find_post"))
            .await
            .context("failed to fetch post")?;
        Ok(row.as_ref().map(post_view_from_row))
    }

    async fn create_post(&self, user_id: i64, message: &str) -> Result<Post> {
        let row = sqlx::query(
            "INSERT INTO posts (user_id, message) VALUES ($1, $2) \
             RETURNING post_id, user_id, message, created_at, updated_at",
        )
        .bind(user_id)
        .bind(message)
        .fetch_one(&self.pool)
        .instrument(query_span("create_post"))
        .await
        .context("failed to insert post")?;

        Ok(Post {
            post_id: row.get("post_id"),
            user_id: row.get("user_id"),
            message: row.get("message"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }

    async fn list_comments(&self, post_id: i64) -> Result<Vec<CommentView>> {
        let rows = sqlx::query(
            r"
            SELECT c.comment_id, c.post_id, c.comment_msg, u.user_id, u.username, c.created_at
            FROM comments c
            JOIN comment_users cu ON cu.comment_id = c.comment_id
            JOIN users u ON u.user_id = cu.user_id
            WHERE c.post_id = $1
            ORDER BY c.created_at, c.comment_id
            ",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .instrument(query_span("list_comments"))
        .await
        .context("failed to list comments")?;

        Ok(rows
            .into_iter()
            .map(|row| CommentView {
                comment_id: row.get("comment_id"),
                post_id: row.get("post_id"),
                comment_msg: row.get("comment_msg"),
                user_id: row.get("user_id"),
                username: row.get("username"),
                created_at: row.get("created_at"),
            })
            .collect())
    }

    async fn create_comment(&self, post_id: i64, comment_msg: &str) -> Result<Comment> {
        let row = sqlx::query(
            "INSERT INTO comments (post_id, comment_msg) VALUES ($1, $2) \
             RETURNING comment_id, post_id, comment_msg, created_at, updated_at",
        )
        .bind(post_id)
        .bind(comment_msg)
        .fetch_one(&self.pool)
        .instrument(query_span("create_comment"))
        .await
        .context("failed to insert comment")?;

        Ok(Comment {
            comment_id: row.get("comment_id"),
            post_id: row.get("post_id"),
            comment_msg: row.get("comment_msg"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }

    async fn link_comment_author(&self, comment_id: i64, user_id: i64) -> Result<()> {
        sqlx::query("INSERT INTO comment_users (comment_id, user_id) VALUES ($1, $2)")
            .bind(comment_id)
            .bind(user_id)
            .execute(&self.pool)
            .instrument(query_span("link_comment_author"))
            .await
            .context("failed to link comment author")?;
        Ok(())
    }

    async fn execute_script(&self, sql: &str) -> Result<()> {
        sqlx::raw_sql(sql)
            .execute(&self.pool)
            .instrument(query_span("execute_script"))
            .await
            .context("failed to execute migration script")?;
        Ok(())
    }
}
