//! Subscriber configuration
//!
//! All keys are optional; missing keys take their defaults.
//!
//! ```yaml
//! topic: /battery_state
//! max_nesting_depth: 16
//! max_consecutive_errors: 5
//! init_timeout_ms: 2000
//! log:
//!   level: debug
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::logging::LogConfig;
use crate::schema::DEFAULT_MAX_NESTING_DEPTH;
use crate::{MsgscopeError, Result};

/// Configuration for one subscription.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SubscriberConfig {
    /// Channel label used in logs
    pub topic: String,

    /// Composite nesting levels allowed below the root message
    pub max_nesting_depth: usize,

    /// Consecutive provider errors before the driver gives up
    pub max_consecutive_errors: u32,

    /// How long [`Subscription::wait_initialized`](crate::Subscription::wait_initialized) waits
    pub init_timeout_ms: u64,

    pub log: LogConfig,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            topic: "unnamed".to_string(),
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            max_consecutive_errors: 10,
            init_timeout_ms: 5000,
            log: LogConfig::default(),
        }
    }
}

impl SubscriberConfig {
    /// Default configuration labelled with `topic`.
    pub fn for_topic(topic: impl Into<String>) -> Self {
        Self { topic: topic.into(), ..Self::default() }
    }

    /// Parse and validate YAML configuration.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|source| MsgscopeError::Config { path: path.to_path_buf(), source })?;
        Self::from_yaml_str(&yaml)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_nesting_depth == 0 {
            return Err(MsgscopeError::parse_error(
                "subscriber config",
                "max_nesting_depth must be at least 1",
            ));
        }
        if self.max_consecutive_errors == 0 {
            return Err(MsgscopeError::parse_error(
                "subscriber config",
                "max_consecutive_errors must be at least 1",
            ));
        }
        Ok(())
    }

    pub fn init_timeout(&self) -> Duration {
        Duration::from_millis(self.init_timeout_ms)
    }
}
