//! # Socialfeed
//!
//! A small social feed API: users register and log in, write posts and
//! comment on them.
//!
//! ## Authentication
//!
//! Three independent gates protect the non-public routes:
//!
//! - **Bearer token** (`/api/v1/restricted/*`): an HS256 JWT issued at login,
//!   carrying the user id, username and admin flag. Valid until it expires.
//! - **Session cookie** (`/api/v1/cookie/*`): an opaque `sessionID` value that
//!   is stored on the user row and rotated on every login.
//! - **Basic auth** (`/api/v1/admin/*`): the configured admin credentials,
//!   backed by an in-memory session cache that lives for the process lifetime.

pub mod cli;
pub mod socialfeed;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(GIT_COMMIT_HASH.len() >= 7);
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
