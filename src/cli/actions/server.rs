use crate::{
    cli::telemetry,
    socialfeed::{self, auth::AuthConfig},
};
use anyhow::{Context, Result, anyhow};
use secrecy::{ExposeSecret, SecretString};
use std::path::PathBuf;
use tracing::debug;
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub db_username: Option<String>,
    pub db_password: Option<SecretString>,
    pub migrations_dir: PathBuf,
    pub cors_origin: String,
    pub jwt_secret: SecretString,
    pub admin_username: String,
    pub admin_password: SecretString,
    pub token_ttl_seconds: u64,
    pub admin_session_ttl_seconds: u64,
    pub bcrypt_cost: u32,
    pub cookie_secure: bool,
}

/// Replace the DSN credentials with the ones passed separately, if any.
fn connection_string(
    dsn: &str,
    username: Option<&str>,
    password: Option<&SecretString>,
) -> Result<String> {
    if username.is_none() && password.is_none() {
        return Ok(dsn.to_string());
    }

    let mut url = Url::parse(dsn).context("Invalid DSN")?;

    if let Some(username) = username {
        url.set_username(username)
            .map_err(|()| anyhow!("Error setting username"))?;
    }

    if let Some(password) = password {
        url.set_password(Some(password.expose_secret()))
            .map_err(|()| anyhow!("Error setting password"))?;
    }

    Ok(url.to_string())
}

/// Execute the server action.
/// # Errors
/// Returns an error if the DSN is unusable or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let dsn = connection_string(
        &args.dsn,
        args.db_username.as_deref(),
        args.db_password.as_ref(),
    )?;

    let auth_config = AuthConfig::new(
        args.jwt_secret,
        args.admin_username,
        args.admin_password,
    )
    .with_token_ttl_seconds(args.token_ttl_seconds)
    .with_admin_session_ttl_seconds(args.admin_session_ttl_seconds)
    .with_bcrypt_cost(args.bcrypt_cost)
    .with_cookie_secure(args.cookie_secure);

    debug!(
        port = args.port,
        migrations_dir = %args.migrations_dir.display(),
        "Starting server"
    );

    let result = socialfeed::new(
        args.port,
        dsn,
        auth_config,
        &args.cors_origin,
        args.migrations_dir,
    )
    .await;

    telemetry::shutdown_tracer();

    result
}
