pub mod auth;
pub mod database;
pub mod logging;

use clap::{
    Arg, ColorChoice, Command,
    builder::styling::{AnsiColor, Effects, Styles},
};

pub const ARG_PORT: &str = "port";
pub const ARG_CORS_ORIGIN: &str = "cors-origin";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("socialfeed")
        .about("Social feed API: users, posts and comments")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long(ARG_PORT)
                .help("Port to listen on")
                .default_value("1323")
                .env("SOCIALFEED_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_CORS_ORIGIN)
                .long(ARG_CORS_ORIGIN)
                .help("Frontend origin allowed to call the API with credentials")
                .default_value("http://localhost:3000")
                .env("SOCIALFEED_CORS_ORIGIN"),
        );

    let command = database::with_args(command);
    let command = auth::with_args(command);
    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: [&str; 8] = [
        "--dsn",
        "postgres://localhost:5432/socialfeed",
        "--jwt-secret",
        "s3cret",
        "--admin-username",
        "admin",
        "--admin-password",
        "hunter2",
    ];

    fn args(extra: &[&'static str]) -> Vec<&'static str> {
        let mut args = vec!["socialfeed"];
        args.extend(REQUIRED);
        args.extend(extra);
        args
    }

    fn clean_env<T>(f: impl FnOnce() -> T) -> T {
        temp_env::with_vars_unset(
            [
                "SOCIALFEED_PORT",
                "SOCIALFEED_DSN",
                "SOCIALFEED_JWT_SECRET",
                "SOCIALFEED_ADMIN_USERNAME",
                "SOCIALFEED_ADMIN_PASSWORD",
                "SOCIALFEED_BCRYPT_COST",
                "SOCIALFEED_CORS_ORIGIN",
                "SOCIALFEED_TOKEN_TTL_SECONDS",
                "SOCIALFEED_LOG_LEVEL",
            ],
            f,
        )
    }

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "socialfeed");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some("Social feed API: users, posts and comments".to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_defaults() {
        let matches = clean_env(|| new().get_matches_from(args(&[])));

        assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(1323));
        assert_eq!(
            matches.get_one::<String>(ARG_CORS_ORIGIN).map(String::as_str),
            Some("http://localhost:3000")
        );
        assert_eq!(
            matches
                .get_one::<u64>(auth::ARG_TOKEN_TTL_SECONDS)
                .copied(),
            Some(259_200)
        );
        assert_eq!(
            matches.get_one::<u32>(auth::ARG_BCRYPT_COST).copied(),
            Some(12)
        );
        assert_eq!(
            matches
                .get_one::<String>(database::ARG_MIGRATIONS_DIR)
                .map(String::as_str),
            Some("./migrations")
        );
    }

    #[test]
    fn test_missing_secret() {
        let result = clean_env(|| {
            new().try_get_matches_from(vec![
                "socialfeed",
                "--dsn",
                "postgres://localhost:5432/socialfeed",
                "--admin-username",
                "admin",
                "--admin-password",
                "hunter2",
            ])
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_bcrypt_cost_range() {
        let too_low = clean_env(|| new().try_get_matches_from(args(&["--bcrypt-cost", "3"])));
        assert!(too_low.is_err());

        let too_high = clean_env(|| new().try_get_matches_from(args(&["--bcrypt-cost", "32"])));
        assert!(too_high.is_err());

        let ok = clean_env(|| new().try_get_matches_from(args(&["--bcrypt-cost", "4"])));
        assert!(ok.is_ok());
    }

    #[test]
    fn test_env_values() {
        let matches = temp_env::with_vars(
            [
                ("SOCIALFEED_PORT", Some("8443")),
                ("SOCIALFEED_DSN", Some("postgres://db:5432/feed")),
                ("SOCIALFEED_JWT_SECRET", Some("from-env")),
                ("SOCIALFEED_ADMIN_USERNAME", Some("root")),
                ("SOCIALFEED_ADMIN_PASSWORD", Some("toor")),
                ("SOCIALFEED_BCRYPT_COST", Some("10")),
            ],
            || new().get_matches_from(vec!["socialfeed"]),
        );

        assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(8443));
        assert_eq!(
            matches
                .get_one::<String>(database::ARG_DSN)
                .map(String::as_str),
            Some("postgres://db:5432/feed")
        );
        assert_eq!(
            matches
                .get_one::<String>(auth::ARG_ADMIN_USERNAME)
                .map(String::as_str),
            Some("root")
        );
        assert_eq!(
            matches.get_one::<u32>(auth::ARG_BCRYPT_COST).copied(),
            Some(10)
        );
    }
}
