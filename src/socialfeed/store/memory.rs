//! In-memory [`Store`] used by handler tests.

use std::collections::HashMap;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::{SaveOutcome, Store};
use crate::socialfeed::models::{
    Comment, CommentView, NewUser, Post, PostView, User, UserChanges,
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    comment_users: HashMap<i64, i64>,
    scripts: Vec<String>,
}

#[derive(Default)]
pub(crate) struct MemoryStore {
    tables: Mutex<Tables>,
    /// When set, `link_comment_author` fails.
    fail_comment_link: bool,
}

impl MemoryStore {
    pub(crate) fn failing_comment_links() -> Self {
        Self {
            fail_comment_link: true,
            ..Self::default()
        }
    }

    pub(crate) async fn user(&self, user_id: i64) -> Option<User> {
        let tables = self.tables.lock().await;
        tables.users.iter().find(|u| u.user_id == user_id).cloned()
    }

    pub(crate) async fn comment_count(&self) -> usize {
        self.tables.lock().await.comments.len()
    }

    pub(crate) async fn executed_scripts(&self) -> Vec<String> {
        self.tables.lock().await.scripts.clone()
    }
}

fn next_id(len: usize) -> i64 {
    i64::try_from(len).unwrap_or(i64::MAX - 1) + 1
}

fn post_view(tables: &Tables, post: &Post) -> Option<PostView> {
    let author = tables.users.iter().find(|u| u.user_id == post.user_id)?;
    Some(PostView {
        post_id: post.post_id,
        user_id: post.user_id,
        username: author.username.clone(),
        firstname: author.firstname.clone(),
        surname: author.surname.clone(),
        post_message: post.message.clone(),
        created_at: post.created_at,
        updated_at: post.updated_at,
    })
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.tables.lock().await.users.clone())
    }

    async fn find_user(&self, user_id: i64) -> Result<Option<User>> {
        Ok(self.user(user_id).await)
    }

    async fn find_user_by_identifier(&self, identifier: &str) -> Result<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.username == identifier || u.email == identifier)
            .cloned())
    }

    async fn find_user_conflict(&self, username: &str, email: &str) -> Result<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.username == username || u.email == email)
            .cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<SaveOutcome<User>> {
        let mut tables = self.tables.lock().await;
        if tables
            .users
            .iter()
            .any(|u| u.username == user.username || u.email == user.email)
        {
            return Ok(SaveOutcome::Conflict);
        }
        let now = Utc::now();
        let row = User {
            user_id: next_id(tables.users.len()),
            username: user.username,
            firstname: user.firstname,
            surname: user.surname,
            email: user.email,
            password_hash: user.password_hash,
            is_admin: user.is_admin,
            cookie_token: None,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(row.clone());
        Ok(SaveOutcome::Saved(row))
    }

    async fn update_user(
        &self,
        user_id: i64,
        changes: UserChanges,
    ) -> Result<Option<SaveOutcome<User>>> {
        let mut tables = self.tables.lock().await;
        if !tables.users.iter().any(|u| u.user_id == user_id) {
            return Ok(None);
        }
        if tables
            .users
            .iter()
            .any(|u| u.user_id != user_id && u.username == changes.username)
        {
            return Ok(Some(SaveOutcome::Conflict));
        }
        let Some(user) = tables.users.iter_mut().find(|u| u.user_id == user_id) else {
            return Ok(None);
        };
        user.username = changes.username;
        user.firstname = changes.firstname;
        user.surname = changes.surname;
        if let Some(hash) = changes.password_hash {
            user.password_hash = hash;
        }
        user.updated_at = Utc::now();
        Ok(Some(SaveOutcome::Saved(user.clone())))
    }

    async fn update_password(&self, user_id: i64, password_hash: &str) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        match tables.users.iter_mut().find(|u| u.user_id == user_id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_cookie_token(&self, user_id: i64, token: &str) -> Result<()> {
        let mut tables = self.tables.lock().await;
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.user_id == user_id)
            .ok_or_else(|| anyhow!("user {user_id} not found"))?;
        user.cookie_token = Some(token.to_string());
        Ok(())
    }

    async fn clear_cookie_token(&self, token: &str) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        let mut cleared = false;
        for user in &mut tables.users {
            if user.cookie_token.as_deref() == Some(token) {
                user.cookie_token = None;
                cleared = true;
            }
        }
        Ok(cleared)
    }

    async fn find_user_id_by_cookie_token(&self, token: &str) -> Result<Option<i64>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.cookie_token.as_deref() == Some(token))
            .map(|u| u.user_id))
    }

    async fn list_posts(&self) -> Result<Vec<PostView>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .posts
            .iter()
            .rev()
            .filter_map(|post| post_view(&tables, post))
            .collect())
    }

    async fn find_post(&self, post_id: i64) -> Result<Option<PostView>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .posts
            .iter()
            .find(|p| p.post_id == post_id)
            .and_then(|post| post_view(&tables, post)))
    }

    async fn create_post(&self, user_id: i64, message: &str) -> Result<Post> {
        let mut tables = self.tables.lock().await;
        if !tables.users.iter().any(|u| u.user_id == user_id) {
            return Err(anyhow!("posts_user_id_fkey violated"));
        }
        let now = Utc::now();
        let post = Post {
            post_id: next_id(tables.posts.len()),
            user_id,
            message: message.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.posts.push(post.clone());
        Ok(post)
    }

    async fn list_comments(&self, post_id: i64) -> Result<Vec<CommentView>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .filter_map(|c| {
                let user_id = *tables.comment_users.get(&c.comment_id)?;
                let author = tables.users.iter().find(|u| u.user_id == user_id)?;
                Some(CommentView {
                    comment_id: c.comment_id,
                    post_id: c.post_id,
                    comment_msg: c.comment_msg.clone(),
                    user_id,
                    username: author.username.clone(),
                    created_at: c.created_at,
                })
            })
            .collect())
    }

    async fn create_comment(&self, post_id: i64, comment_msg: &str) -> Result<Comment> {
        let mut tables = self.tables.lock().await;
        if !tables.posts.iter().any(|p| p.post_id == post_id) {
            return Err(anyhow!("comments_post_id_fkey violated"));
        }
        let now = Utc::now();
        let comment = Comment {
            comment_id: next_id(tables.comments.len()),
            post_id,
            comment_msg: comment_msg.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.comments.push(comment.clone());
        Ok(comment)
    }

    async fn link_comment_author(&self, comment_id: i64, user_id: i64) -> Result<()> {
        if self.fail_comment_link {
            return Err(anyhow!("comment_users insert failed"));
        }
        self.tables
            .lock()
            .await
            .comment_users
            .insert(comment_id, user_id);
        Ok(())
    }

    async fn execute_script(&self, sql: &str) -> Result<()> {
        if sql.contains("FAIL") {
            return Err(anyhow!("syntax error in script"));
        }
        self.tables.lock().await.scripts.push(sql.to_string());
        Ok(())
    }
}
