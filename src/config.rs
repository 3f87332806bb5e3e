//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};

use clap::Parser;

use crate::state::{AppSettings, DEFAULT_STORAGE_KEY};

/// Upper bound for `--pomodoro-minutes`
pub const MAX_POMODORO_MINUTES: u64 = 24 * 60;

/// CLI argument parsing structure
#[derive(Parser, Debug, Clone)]
#[command(name = "pomotrack")]
#[command(about = "A Pomodoro timer and per-project time tracker served over a local HTTP API")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Directory holding persisted snapshots
    #[arg(long, default_value = ".pomotrack")]
    pub data_dir: PathBuf,

    /// Storage slot name for the project snapshot
    #[arg(long, default_value = DEFAULT_STORAGE_KEY)]
    pub storage_key: String,

    /// Pomodoro session length in minutes (at most one day)
    #[arg(long, default_value = "25", value_parser = clap::value_parser!(u64).range(1..=MAX_POMODORO_MINUTES))]
    pub pomodoro_minutes: u64,

    /// Clock period in milliseconds
    #[arg(long, default_value = "1000", value_parser = clap::value_parser!(u64).range(1..))]
    pub tick_ms: u64,

    /// Shell command to run when a Pomodoro session completes
    #[arg(long)]
    pub notify_command: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn pomodoro_seconds(&self) -> u64 {
        self.pomodoro_minutes.saturating_mul(60)
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Settings for building the application state
    pub fn app_settings(&self) -> AppSettings {
        AppSettings {
            port: self.port,
            host: self.host.clone(),
            pomodoro_seconds: self.pomodoro_seconds(),
            tick_period: self.tick_period(),
            storage_key: self.storage_key.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_a_standard_pomodoro() {
        let config = Config::try_parse_from(["pomotrack"]).expect("defaults parse");
        assert_eq!(config.pomodoro_seconds(), 1500);
        assert_eq!(config.tick_period(), Duration::from_secs(1));
        assert_eq!(config.storage_key, "pomodoro-projects");
        assert_eq!(config.address(), "127.0.0.1:20554");
        assert_eq!(config.log_level(), "info");
        assert_eq!(config.notify_command, None);
    }

    #[test]
    fn flags_override_defaults() {
        let config = Config::try_parse_from([
            "pomotrack",
            "-p",
            "9000",
            "--pomodoro-minutes",
            "50",
            "--tick-ms",
            "250",
            "--notify-command",
            "paplay done.oga",
            "-v",
        ])
        .expect("flags parse");

        let settings = config.app_settings();
        assert_eq!(settings.port, 9000);
        assert_eq!(settings.pomodoro_seconds, 3000);
        assert_eq!(settings.tick_period, Duration::from_millis(250));
        assert_eq!(config.notify_command.as_deref(), Some("paplay done.oga"));
        assert_eq!(config.log_level(), "debug");
    }

    #[test]
    fn zero_lengths_are_rejected() {
        assert!(Config::try_parse_from(["pomotrack", "--pomodoro-minutes", "0"]).is_err());
        assert!(Config::try_parse_from(["pomotrack", "--tick-ms", "0"]).is_err());
    }

    #[test]
    fn session_length_is_capped_at_a_day() {
        let config = Config::try_parse_from(["pomotrack", "--pomodoro-minutes", "1440"])
            .expect("one day parses");
        assert_eq!(config.pomodoro_seconds(), 86_400);

        for minutes in ["1441", "307445734561825861"] {
            assert!(Config::try_parse_from(["pomotrack", "--pomodoro-minutes", minutes]).is_err());
        }
    }
}
