//! Logging configuration and subscriber setup
//!
//! The library itself only emits `tracing` events. Applications that do not
//! install their own subscriber can call [`init_logging`] with the `log`
//! section of their [`SubscriberConfig`](crate::config::SubscriberConfig).

use serde::{Deserialize, Serialize};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Log level
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Convert to tracing level filter string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Log line layout
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Default `fmt` output with targets
    #[default]
    Full,
    /// Single-line compact output
    Compact,
}

/// Logging configuration
///
/// # Example
///
/// ```yaml
/// log:
///   level: debug
///   format: compact
///   filter: "msgscope::schema=trace"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    /// Global level, used when `filter` is absent or invalid
    pub level: LogLevel,

    pub format: LogFormat,

    /// Full `EnvFilter` directive string, overriding `level`
    pub filter: Option<String>,
}

impl LogConfig {
    /// Build the filter for this configuration.
    ///
    /// Invalid directives fall back to `level`, then to `info`.
    pub fn env_filter(&self) -> EnvFilter {
        self.filter
            .as_deref()
            .map(EnvFilter::try_new)
            .unwrap_or_else(|| EnvFilter::try_new(self.level.as_str()))
            .or_else(|_| EnvFilter::try_new(self.level.as_str()))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Install a global `tracing` subscriber for `config`.
///
/// Returns `false` if a global subscriber was already installed, in which
/// case nothing changes.
pub fn init_logging(config: &LogConfig) -> bool {
    let registry = tracing_subscriber::registry().with(config.env_filter());

    let result = match config.format {
        LogFormat::Full => registry.with(fmt::layer().with_target(true)).try_init(),
        LogFormat::Compact => registry.with(fmt::layer().compact()).try_init(),
    };

    result.is_ok()
}
