use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_DSN: &str = "dsn";
pub const ARG_DB_USERNAME: &str = "db-username";
pub const ARG_DB_PASSWORD: &str = "db-password";
pub const ARG_MIGRATIONS_DIR: &str = "migrations-dir";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_DSN)
                .short('d')
                .long(ARG_DSN)
                .help("Database connection string")
                .long_help(
                    "Postgres connection string. Credentials given with --db-username/--db-password replace the ones in the DSN.",
                )
                .env("SOCIALFEED_DSN")
                .required(true),
        )
        .arg(
            Arg::new(ARG_DB_USERNAME)
                .long(ARG_DB_USERNAME)
                .help("Database username, overrides the DSN user")
                .env("SOCIALFEED_DB_USERNAME"),
        )
        .arg(
            Arg::new(ARG_DB_PASSWORD)
                .long(ARG_DB_PASSWORD)
                .help("Database password, overrides the DSN password")
                .env("SOCIALFEED_DB_PASSWORD")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_MIGRATIONS_DIR)
                .long(ARG_MIGRATIONS_DIR)
                .help("Directory holding the SQL files the admin API can run")
                .env("SOCIALFEED_MIGRATIONS_DIR")
                .default_value("./migrations"),
        )
}

#[derive(Debug)]
pub struct Options {
    pub dsn: String,
    pub username: Option<String>,
    pub password: Option<SecretString>,
    pub migrations_dir: String,
}

impl Options {
    /// # Errors
    /// Returns an error if the DSN is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let dsn = matches
            .get_one::<String>(ARG_DSN)
            .cloned()
            .context("missing required argument: --dsn")?;

        Ok(Self {
            dsn,
            username: matches.get_one::<String>(ARG_DB_USERNAME).cloned(),
            password: matches
                .get_one::<String>(ARG_DB_PASSWORD)
                .map(|password| SecretString::from(password.clone())),
            migrations_dir: matches
                .get_one::<String>(ARG_MIGRATIONS_DIR)
                .cloned()
                .unwrap_or_else(|| "./migrations".to_string()),
        })
    }
}
