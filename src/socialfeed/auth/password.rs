//! bcrypt password hashing.
//!
//! bcrypt is CPU-bound, so both directions run on the blocking pool.

use anyhow::{Context, Result};

/// Work factor bounds accepted by bcrypt.
pub const MIN_COST: u32 = 4;
pub const MAX_COST: u32 = 31;

#[derive(Clone, Copy, Debug)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    #[must_use]
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash `plaintext` with a fresh random salt.
    ///
    /// # Errors
    /// Returns an error if bcrypt rejects the cost or the worker task panics.
    pub async fn hash(&self, plaintext: &str) -> Result<String> {
        let cost = self.cost;
        let plaintext = plaintext.to_owned();
        tokio::task::spawn_blocking(move || bcrypt::hash(plaintext, cost))
            .await
            .context("password hashing task failed")?
            .context("failed to hash password")
    }

    /// Compare `plaintext` against a stored hash. A malformed hash never matches.
    pub async fn verify(&self, hash: &str, plaintext: &str) -> bool {
        let hash = hash.to_owned();
        let plaintext = plaintext.to_owned();
        tokio::task::spawn_blocking(move || bcrypt::verify(plaintext, &hash).unwrap_or(false))
            .await
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(MIN_COST)
    }

    #[tokio::test]
    async fn hash_then_verify() {
        let hasher = hasher();
        let hash = hasher.hash("correct horse").await.unwrap();
        assert!(hasher.verify(&hash, "correct horse").await);
        assert!(!hasher.verify(&hash, "wrong horse").await);
    }

    #[tokio::test]
    async fn hashes_are_salted() {
        let hasher = hasher();
        let first = hasher.hash("password123").await.unwrap();
        let second = hasher.hash("password123").await.unwrap();
        assert_ne!(first, second);
        assert_ne!(first, "password123");
    }

    #[tokio::test]
    async fn malformed_hash_does_not_verify() {
        assert!(!hasher().verify("not-a-bcrypt-hash", "password123").await);
    }

    #[tokio::test]
    async fn cost_bounds_match_bcrypt() {
        assert!(PasswordHasher::new(MIN_COST).hash("password123").await.is_ok());
        assert!(PasswordHasher::new(MIN_COST - 1).hash("password123").await.is_err());
        assert!(PasswordHasher::new(MAX_COST + 1).hash("password123").await.is_err());
    }

    #[tokio::test]
    async fn invalid_cost_is_an_error() {
        assert!(PasswordHasher::new(99).hash("password123").await.is_err());
    }
}
