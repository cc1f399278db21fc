//! CLI configuration parsed from environment variables.
//!
//! Settings can be overridden with command line flags, which take
//! precedence over the environment.

use std::env;
use std::str::FromStr;

use thiserror::Error;

/// Environment variable holding the log level.
pub(crate) const LOG_LEVEL_ENV: &str = "BDD_OUTLINE_LOG_LEVEL";

/// Invalid configuration value.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum ConfigError {
    /// The log level is not one of the known names.
    #[error("unknown log level '{0}', expected one of: trace, debug, info, warn, error")]
    UnknownLogLevel(String),
}

/// Log level matching the `tracing` levels.
///
/// Defaults to `Warn` so that diagnostics do not drown the command output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum LogLevel {
    /// Per-line parser decisions.
    Trace,
    /// Parse milestones.
    Debug,
    /// Command progress.
    Info,
    /// Replaced scenarios and other suspicious input.
    #[default]
    Warn,
    /// Failures only.
    Error,
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(ConfigError::UnknownLogLevel(s.to_string())),
        }
    }
}

impl LogLevel {
    /// Filter directive understood by `EnvFilter`.
    pub(crate) fn as_filter_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Configuration for one CLI invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct CliConfig {
    /// Log level.
    pub log_level: LogLevel,
}

impl CliConfig {
    /// Load configuration from `BDD_OUTLINE_LOG_LEVEL`, falling back to
    /// defaults for missing values.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when the variable holds an unknown level.
    pub(crate) fn from_env() -> Result<Self, ConfigError> {
        let log_level = match env::var(LOG_LEVEL_ENV) {
            Ok(val) => val.parse()?,
            Err(_) => LogLevel::default(),
        };
        Ok(Self { log_level })
    }

    /// Apply command line overrides.
    #[must_use]
    pub(crate) fn apply_overrides(mut self, log_level: Option<LogLevel>) -> Self {
        if let Some(level) = log_level {
            self.log_level = level;
        }
        self
    }
}
