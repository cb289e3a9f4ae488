//! Turn parsed CLI arguments into the action the binary runs.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::{ARG_CORS_ORIGIN, ARG_PORT, auth, database};
use anyhow::Result;
use std::path::PathBuf;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(1323);
    let cors_origin = matches
        .get_one::<String>(ARG_CORS_ORIGIN)
        .cloned()
        .unwrap_or_else(|| "http://localhost:3000".to_string());

    let db_opts = database::Options::parse(matches)?;
    let auth_opts = auth::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn: db_opts.dsn,
        db_username: db_opts.username,
        db_password: db_opts.password,
        migrations_dir: PathBuf::from(db_opts.migrations_dir),
        cors_origin,
        jwt_secret: auth_opts.jwt_secret,
        admin_username: auth_opts.admin_username,
        admin_password: auth_opts.admin_password,
        token_ttl_seconds: auth_opts.token_ttl_seconds,
        admin_session_ttl_seconds: auth_opts.admin_session_ttl_seconds,
        bcrypt_cost: auth_opts.bcrypt_cost,
        cookie_secure: !auth_opts.insecure_cookies,
    }))
}
