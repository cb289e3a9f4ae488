//! Auth configuration and the shared state handed to gates and handlers.
//!
//! Everything is passed in explicitly at startup; nothing here reads the
//! environment.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;

use super::password::PasswordHasher;
use super::session::AdminSessions;
use super::token::{TokenError, TokenIssuer};

const DEFAULT_TOKEN_TTL_SECONDS: u64 = 72 * 60 * 60;
const DEFAULT_ADMIN_SESSION_TTL_SECONDS: u64 = 24 * 60 * 60;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    jwt_secret: SecretString,
    admin_username: String,
    admin_password: SecretString,
    token_ttl_seconds: u64,
    admin_session_ttl_seconds: u64,
    bcrypt_cost: u32,
    cookie_secure: bool,
}

impl AuthConfig {
    #[must_use]
    pub fn new(
        jwt_secret: SecretString,
        admin_username: String,
        admin_password: SecretString,
    ) -> Self {
        Self {
            jwt_secret,
            admin_username,
            admin_password,
            token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
            admin_session_ttl_seconds: DEFAULT_ADMIN_SESSION_TTL_SECONDS,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            cookie_secure: true,
        }
    }

    #[must_use]
    pub fn with_token_ttl_seconds(mut self, seconds: u64) -> Self {
        self.token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_admin_session_ttl_seconds(mut self, seconds: u64) -> Self {
        self.admin_session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    #[must_use]
    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    #[must_use]
    pub fn token_ttl_seconds(&self) -> u64 {
        self.token_ttl_seconds
    }

    #[must_use]
    pub fn admin_session_ttl_seconds(&self) -> u64 {
        self.admin_session_ttl_seconds
    }

    #[must_use]
    pub fn bcrypt_cost(&self) -> u32 {
        self.bcrypt_cost
    }

    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure
    }

    /// Compare against the configured admin credentials in constant time.
    /// Both fields are always compared so timing does not reveal which one
    /// mismatched.
    #[must_use]
    pub fn is_admin_credentials(&self, username: &str, password: &str) -> bool {
        let user_ok = username
            .as_bytes()
            .ct_eq(self.admin_username.as_bytes());
        let pass_ok = password
            .as_bytes()
            .ct_eq(self.admin_password.expose_secret().as_bytes());
        bool::from(user_ok & pass_ok)
    }
}

#[derive(Debug)]
pub struct AuthState {
    config: AuthConfig,
    tokens: TokenIssuer,
    hasher: PasswordHasher,
    admin_sessions: AdminSessions,
}

impl AuthState {
    /// # Errors
    /// Returns [`TokenError::MissingSecret`] when the JWT secret is empty.
    pub fn new(config: AuthConfig) -> Result<Self, TokenError> {
        let tokens = TokenIssuer::new(
            config.jwt_secret.expose_secret().as_bytes(),
            Duration::from_secs(config.token_ttl_seconds()),
        )?;
        let hasher = PasswordHasher::new(config.bcrypt_cost());
        let admin_sessions =
            AdminSessions::new(Duration::from_secs(config.admin_session_ttl_seconds()));

        Ok(Self {
            config,
            tokens,
            hasher,
            admin_sessions,
        })
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    #[must_use]
    pub fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    #[must_use]
    pub fn admin_sessions(&self) -> &AdminSessions {
        &self.admin_sessions
    }
}
