use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use secrecy::SecretString;

use crate::socialfeed::auth::password::{MAX_COST, MIN_COST};

pub const ARG_JWT_SECRET: &str = "jwt-secret";
pub const ARG_ADMIN_USERNAME: &str = "admin-username";
pub const ARG_ADMIN_PASSWORD: &str = "admin-password";
pub const ARG_TOKEN_TTL_SECONDS: &str = "token-ttl-seconds";
pub const ARG_ADMIN_SESSION_TTL_SECONDS: &str = "admin-session-ttl-seconds";
pub const ARG_BCRYPT_COST: &str = "bcrypt-cost";
pub const ARG_INSECURE_COOKIES: &str = "insecure-cookies";

pub fn with_args(command: Command) -> Command {
    let command = with_secret_args(command);
    with_session_args(command)
}

fn with_secret_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_JWT_SECRET)
                .long(ARG_JWT_SECRET)
                .help("HMAC secret used to sign bearer tokens")
                .env("SOCIALFEED_JWT_SECRET")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_ADMIN_USERNAME)
                .long(ARG_ADMIN_USERNAME)
                .help("Username accepted by the admin basic-auth gate")
                .env("SOCIALFEED_ADMIN_USERNAME")
                .required(true),
        )
        .arg(
            Arg::new(ARG_ADMIN_PASSWORD)
                .long(ARG_ADMIN_PASSWORD)
                .help("Password accepted by the admin basic-auth gate")
                .env("SOCIALFEED_ADMIN_PASSWORD")
                .hide_env_values(true)
                .required(true),
        )
}

fn with_session_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_TOKEN_TTL_SECONDS)
                .long(ARG_TOKEN_TTL_SECONDS)
                .help("Bearer token and session cookie lifetime in seconds")
                .env("SOCIALFEED_TOKEN_TTL_SECONDS")
                .default_value("259200")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_ADMIN_SESSION_TTL_SECONDS)
                .long(ARG_ADMIN_SESSION_TTL_SECONDS)
                .help("Lifetime of a cached admin session in seconds")
                .env("SOCIALFEED_ADMIN_SESSION_TTL_SECONDS")
                .default_value("86400")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new(ARG_BCRYPT_COST)
                .long(ARG_BCRYPT_COST)
                .help("bcrypt work factor for stored passwords")
                .env("SOCIALFEED_BCRYPT_COST")
                .default_value("12")
                .value_parser(clap::value_parser!(u32).range(i64::from(MIN_COST)..=i64::from(MAX_COST))),
        )
        .arg(
            Arg::new(ARG_INSECURE_COOKIES)
                .long(ARG_INSECURE_COOKIES)
                .help("Drop the Secure attribute from the session cookie (plain-http development)")
                .env("SOCIALFEED_INSECURE_COOKIES")
                .action(ArgAction::SetTrue),
        )
}

#[derive(Debug)]
pub struct Options {
    pub jwt_secret: SecretString,
    pub admin_username: String,
    pub admin_password: SecretString,
    pub token_ttl_seconds: u64,
    pub admin_session_ttl_seconds: u64,
    pub bcrypt_cost: u32,
    pub insecure_cookies: bool,
}

impl Options {
    /// # Errors
    /// Returns an error if a required secret is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let jwt_secret = matches
            .get_one::<String>(ARG_JWT_SECRET)
            .cloned()
            .context("missing required argument: --jwt-secret")?;
        let admin_username = matches
            .get_one::<String>(ARG_ADMIN_USERNAME)
            .cloned()
            .context("missing required argument: --admin-username")?;
        let admin_password = matches
            .get_one::<String>(ARG_ADMIN_PASSWORD)
            .cloned()
            .context("missing required argument: --admin-password")?;

        Ok(Self {
            jwt_secret: SecretString::from(jwt_secret),
            admin_username,
            admin_password: SecretString::from(admin_password),
            token_ttl_seconds: matches
                .get_one::<u64>(ARG_TOKEN_TTL_SECONDS)
                .copied()
                .unwrap_or(259_200),
            admin_session_ttl_seconds: matches
                .get_one::<u64>(ARG_ADMIN_SESSION_TTL_SECONDS)
                .copied()
                .unwrap_or(86_400),
            bcrypt_cost: matches
                .get_one::<u32>(ARG_BCRYPT_COST)
                .copied()
                .unwrap_or(12),
            insecure_cookies: matches.get_flag(ARG_INSECURE_COOKIES),
        })
    }
}
