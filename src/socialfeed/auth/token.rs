//! HS256 bearer tokens.

use std::fmt;
use std::time::Duration;

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    get_current_timestamp,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::socialfeed::models::User;

/// Claims carried by every bearer token.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct Claims {
    pub uid: i64,
    pub username: String,
    pub admin: bool,
    pub iat: u64,
    pub exp: u64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("signing secret is not configured")]
    MissingSecret,

    #[error("invalid or expired jwt")]
    Invalid(#[source] jsonwebtoken::errors::Error),

    #[error("failed to sign token")]
    Encode(#[source] jsonwebtoken::errors::Error),
}

pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// # Errors
    /// Returns [`TokenError::MissingSecret`] when `secret` is empty.
    pub fn new(secret: &[u8], ttl: Duration) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "iat"]);
        // a token is dead the second its exp passes
        validation.leeway = 0;

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        })
    }

    /// Sign a token for `user`, valid for the configured TTL.
    ///
    /// # Errors
    /// Returns [`TokenError::Encode`] if signing fails.
    pub fn issue(&self, user: &User) -> Result<String, TokenError> {
        let iat = get_current_timestamp();
        let claims = Claims {
            uid: user.user_id,
            username: user.username.clone(),
            admin: user.is_admin,
            iat,
            exp: iat.saturating_add(self.ttl.as_secs()),
        };
        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding).map_err(TokenError::Encode)
    }

    /// Check signature and expiry, returning the claims.
    ///
    /// # Errors
    /// Returns [`TokenError::Invalid`] for a malformed, tampered or expired token.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(TokenError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user() -> User {
        User {
            user_id: 42,
            username: "alice".to_string(),
            firstname: "Alice".to_string(),
            surname: "Liddell".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: String::new(),
            is_admin: true,
            cookie_token: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(b"test-secret", Duration::from_secs(72 * 60 * 60)).unwrap()
    }

    #[test]
    fn empty_secret_is_rejected() {
        assert!(matches!(
            TokenIssuer::new(b"", Duration::from_secs(60)),
            Err(TokenError::MissingSecret)
        ));
    }

    #[test]
    fn issued_token_carries_claims() {
        let issuer = issuer();
        let token = issuer.issue(&user()).unwrap();
        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.uid, 42);
        assert_eq!(claims.username, "alice");
        assert!(claims.admin);
        assert_eq!(claims.exp - claims.iat, 72 * 60 * 60);
    }

    #[test]
    fn token_signed_with_other_secret_is_invalid() {
        let other = TokenIssuer::new(b"other-secret", Duration::from_secs(60)).unwrap();
        let token = other.issue(&user()).unwrap();
        assert!(matches!(issuer().verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn expired_token_is_invalid() {
        let issuer = issuer();
        let now = get_current_timestamp();
        let claims = Claims {
            uid: 1,
            username: "alice".to_string(),
            admin: false,
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = issuer.sign(&claims).unwrap();
        assert!(matches!(issuer.verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn recently_expired_token_is_invalid() {
        let issuer = issuer();
        let now = get_current_timestamp();
        let claims = Claims {
            uid: 1,
            username: "alice".to_string(),
            admin: false,
            iat: now - 120,
            exp: now - 5,
        };
        let token = issuer.sign(&claims).unwrap();
        assert!(matches!(issuer.verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn garbage_is_invalid() {
        assert!(issuer().verify("not.a.jwt").is_err());
    }

    #[test]
    fn debug_hides_keys() {
        let rendered = format!("{:?}", issuer());
        assert!(!rendered.contains("test-secret"));
    }
}
