//! Command line argument definitions.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Timeframe Archivist - Archive the videos of a recorded event
#[derive(Parser, Debug)]
#[command(name = "timeframe-archivist")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Path to the events file
    #[arg(short, long, value_name = "EVENTS_FILE", default_value = "events.yml")]
    pub events: PathBuf,

    /// Path to a TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    pub config: Option<PathBuf>,
}

/// Log verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["timeframe-archivist"]);
        assert_eq!(cli.log_level, LogLevel::Info);
        assert_eq!(cli.events, PathBuf::from("events.yml"));
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_log_level_option() {
        let cli = Cli::parse_from(["timeframe-archivist", "--log-level", "debug", "-e", "my.yml"]);
        assert_eq!(cli.log_level.as_str(), "debug");
        assert_eq!(cli.events, PathBuf::from("my.yml"));
    }

    #[test]
    fn test_rejects_unknown_level() {
        assert!(Cli::try_parse_from(["timeframe-archivist", "--log-level", "loud"]).is_err());
    }
}
