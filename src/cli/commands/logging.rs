use clap::{Arg, ArgAction, ArgMatches, Command, builder::ValueParser};

pub const ARG_VERBOSITY: &str = "verbosity";
pub const ARG_LOG_LEVEL: &str = "log-level";

/// Accept either a number (0-5) or a level name.
#[must_use]
pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_VERBOSITY)
                .short('v')
                .long("verbose")
                .help("Increase verbosity, repeat for more (-v WARN .. -vvvv TRACE)")
                .global(true)
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new(ARG_LOG_LEVEL)
                .long(ARG_LOG_LEVEL)
                .help("Log level: ERROR, WARN, INFO, DEBUG, TRACE or 0-5 (default: ERROR)")
                .env("SOCIALFEED_LOG_LEVEL")
                .global(true)
                .value_parser(validator_log_level()),
        )
}

/// Effective verbosity: the higher of the `-v` count and `--log-level`.
#[must_use]
pub fn verbosity(matches: &ArgMatches) -> u8 {
    let count = matches.get_one::<u8>(ARG_VERBOSITY).copied().unwrap_or(0);
    let level = matches.get_one::<u8>(ARG_LOG_LEVEL).copied().unwrap_or(0);
    count.max(level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_names_and_numbers() {
        let cmd = with_args(Command::new("t"));
        for (value, expected) in [("info", 2u8), ("DEBUG", 3), ("5", 5), ("0", 0)] {
            let matches = temp_env::with_var("SOCIALFEED_LOG_LEVEL", Some(value), || {
                cmd.clone().get_matches_from(vec!["t"])
            });
            assert_eq!(matches.get_one::<u8>(ARG_LOG_LEVEL).copied(), Some(expected));
            assert_eq!(verbosity(&matches), expected);
        }
    }

    #[test]
    fn verbose_flag_counts() {
        let matches = temp_env::with_var_unset("SOCIALFEED_LOG_LEVEL", || {
            with_args(Command::new("t")).get_matches_from(vec!["t", "-vvv"])
        });
        assert_eq!(matches.get_one::<u8>(ARG_VERBOSITY).copied(), Some(3));
        assert_eq!(verbosity(&matches), 3);
    }

    #[test]
    fn higher_of_flag_and_level_wins() {
        let matches = temp_env::with_var("SOCIALFEED_LOG_LEVEL", Some("debug"), || {
            with_args(Command::new("t")).get_matches_from(vec!["t", "-v"])
        });
        assert_eq!(verbosity(&matches), 3);

        let matches = temp_env::with_var("SOCIALFEED_LOG_LEVEL", Some("warn"), || {
            with_args(Command::new("t")).get_matches_from(vec!["t", "-vvvv"])
        });
        assert_eq!(verbosity(&matches), 4);
    }

    #[test]
    fn no_flags_means_errors_only() {
        let matches = temp_env::with_var_unset("SOCIALFEED_LOG_LEVEL", || {
            with_args(Command::new("t")).get_matches_from(vec!["t"])
        });
        assert_eq!(verbosity(&matches), 0);
    }

    #[test]
    fn invalid_log_level() {
        let result = temp_env::with_var("SOCIALFEED_LOG_LEVEL", Some("loud"), || {
            with_args(Command::new("t")).try_get_matches_from(vec!["t"])
        });
        assert!(result.is_err());
    }
}
