//! Logging setup shared by the library's consumers
//!
//! Log lines always go to stderr so command output on stdout stays clean.
//! `RUST_LOG`, when set, overrides the configured level.
//!
//! # Examples
//!
//! ```no_run
//! use libsociaux::logging::{LogFormat, LoggingConfig};
//!
//! LoggingConfig::new(LogFormat::Json, "debug".to_string(), false).init();
//!
//! // Or read SOCIAUX_LOG_FORMAT / SOCIAUX_LOG_LEVEL
//! libsociaux::logging::init_default();
//! ```

use std::str::FromStr;
use tracing_subscriber::EnvFilter;

/// Level used when neither the config nor the environment names one
pub const DEFAULT_LEVEL: &str = "error";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Plain lines, no colors
    Text,
    /// One JSON object per line
    Json,
    /// Multi-line with colors
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            _ => Err(format!(
                "Invalid log format: '{}'. Valid options: text, json, pretty",
                s
            )),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
            LogFormat::Pretty => "pretty",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub level: String,
    /// Forces `debug` unless `RUST_LOG` says otherwise
    pub verbose: bool,
}

impl LoggingConfig {
    pub fn new(format: LogFormat, level: String, verbose: bool) -> Self {
        Self {
            format,
            level,
            verbose,
        }
    }

    /// Settings from `SOCIAUX_LOG_FORMAT` and `SOCIAUX_LOG_LEVEL`
    ///
    /// Unset or unparseable values fall back to text output at
    /// [`DEFAULT_LEVEL`].
    pub fn from_env(verbose: bool) -> Self {
        let format = std::env::var("SOCIAUX_LOG_FORMAT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(LogFormat::Text);

        let level = std::env::var("SOCIAUX_LOG_LEVEL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LEVEL.to_string());

        Self::new(format, level, verbose)
    }

    /// The directive string used when `RUST_LOG` is absent
    pub fn directive(&self) -> &str {
        if self.verbose {
            "debug"
        } else {
            &self.level
        }
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(self.directive()))
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))
    }

    /// Install the global subscriber
    ///
    /// Returns `false` when a subscriber was already installed, which leaves
    /// the existing one in place.
    pub fn init(&self) -> bool {
        let filter = self.filter();

        let result = match self.format {
            LogFormat::Json => tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .flatten_event(true)
                .with_current_span(true)
                .with_target(true)
                .try_init(),
            LogFormat::Pretty => tracing_subscriber::fmt()
                .pretty()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_line_number(true)
                .try_init(),
            LogFormat::Text => tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .with_target(false)
                .try_init(),
        };

        result.is_ok()
    }
}

/// Initialize logging from the environment
pub fn init_default() -> bool {
    LoggingConfig::from_env(false).init()
}
