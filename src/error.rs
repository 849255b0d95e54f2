//! Error types for schema resolution and payload decoding.
//!
//! All errors implement `std::error::Error` and carry enough structured context
//! to tell a truncated payload apart from a pathological schema or a dead
//! transport.
//!
//! ## Error Categories
//!
//! - **Decode Errors**: a payload is shorter than its schema requires
//! - **Schema Errors**: nesting too deep (cyclic type definitions), excessive
//!   fan-out, empty definitions
//! - **Channel Errors**: decoding before initialization, closed queues, timeouts
//! - **Provider Errors**: failures reported by the transport collaborator
//! - **Config Errors**: unreadable or malformed configuration files
//!
//! Unknown composite types and malformed schema lines are *not* errors; they are
//! reported as diagnostics on the parsed definition and flattened schema.
//!
//! ## Scoping
//!
//! Schema errors only ever affect the initialization of one channel. Decode
//! errors only ever affect one payload: the cached schema is left untouched and
//! the next payload decodes normally.
//!
//! ```rust
//! use msgscope::MsgscopeError;
//!
//! let error = MsgscopeError::out_of_bounds("header.seq", 10, 4, 12);
//! assert!(!error.is_retryable());
//! for suggestion in error.recovery_suggestions() {
//!     println!("  - {}", suggestion);
//! }
//! ```

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for msgscope operations.
pub type Result<T, E = MsgscopeError> = std::result::Result<T, E>;

/// Main error type for schema resolution and decoding.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum MsgscopeError {
    #[error(
        "Payload too short decoding '{field}': need {needed} bytes at offset {offset:#x}, {available} available"
    )]
    OutOfBounds { field: String, offset: usize, needed: usize, available: usize },

    #[error("Type '{type_name}' nests deeper than {depth} levels (cyclic definition?)")]
    Recursion { type_name: String, depth: usize },

    #[error("Definition expands to more than {limit} fields and nested types")]
    ExpansionLimit { limit: usize },

    #[error("Parse error in {context}: {details}")]
    Parse { context: String, details: String },

    #[error("Channel '{channel}' has not been initialized with a message definition")]
    NotInitialized { channel: String },

    #[error("Channel closed: {reason}")]
    ChannelClosed { reason: String },

    #[error("Operation timed out after {duration:?}")]
    Timeout { duration: Duration },

    #[error("Config file error: {path}")]
    Config {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Provider failed: {reason}")]
    Provider {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl MsgscopeError {
    /// Returns whether this error is potentially recoverable through retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            MsgscopeError::Provider { .. } => true,
            MsgscopeError::Timeout { .. } => true,
            MsgscopeError::NotInitialized { .. } => true,
            MsgscopeError::OutOfBounds { .. } => false,
            MsgscopeError::Recursion { .. } => false,
            MsgscopeError::ExpansionLimit { .. } => false,
            MsgscopeError::Parse { .. } => false,
            MsgscopeError::ChannelClosed { .. } => false,
            MsgscopeError::Config { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            MsgscopeError::OutOfBounds { .. } => vec![
                "Check the publisher uses the same message definition",
                "Verify the payload was not truncated in transport",
                "Compare the md5sum of the payload with the initializing message",
            ],
            MsgscopeError::Recursion { .. } => vec![
                "Check the definition for self-referential types",
                "Raise max_nesting_depth if the nesting is legitimate",
            ],
            MsgscopeError::ExpansionLimit { .. } => vec![
                "Check the definition for types repeated at many nesting levels",
                "Lower max_nesting_depth to reject such definitions earlier",
            ],
            MsgscopeError::Parse { .. } => vec![
                "Check the configuration or definition text format",
                "Verify source data integrity",
            ],
            MsgscopeError::NotInitialized { .. } => vec![
                "Deliver a message carrying its definition first",
                "Use Channel::handle instead of Channel::decode",
            ],
            MsgscopeError::ChannelClosed { .. } => vec![
                "Keep the subscription alive while publishing",
                "Recreate the subscription",
            ],
            MsgscopeError::Timeout { .. } => vec![
                "Increase init_timeout_ms",
                "Verify the publisher is sending messages",
            ],
            MsgscopeError::Config { .. } => vec![
                "Check the config file exists and is readable",
                "Check file permissions",
            ],
            MsgscopeError::Provider { .. } => vec![
                "Check the transport connection",
                "Verify the topic is being published",
                "Restart the subscription",
            ],
        }
    }

    /// Helper constructor for out-of-bounds decode errors.
    pub fn out_of_bounds(
        field: impl Into<String>,
        offset: usize,
        needed: usize,
        available: usize,
    ) -> Self {
        MsgscopeError::OutOfBounds { field: field.into(), offset, needed, available }
    }

    /// Helper constructor for nesting depth errors.
    pub fn recursion(type_name: impl Into<String>, depth: usize) -> Self {
        MsgscopeError::Recursion { type_name: type_name.into(), depth }
    }

    /// Helper constructor for fan-out limit errors.
    pub fn expansion_limit(limit: usize) -> Self {
        MsgscopeError::ExpansionLimit { limit }
    }

    /// Helper constructor for parse errors.
    pub fn parse_error(context: impl Into<String>, details: impl Into<String>) -> Self {
        MsgscopeError::Parse { context: context.into(), details: details.into() }
    }

    /// Helper constructor for provider failures.
    pub fn provider_failed(reason: impl Into<String>) -> Self {
        MsgscopeError::Provider { reason: reason.into(), source: None }
    }

    /// Helper constructor for provider failures with source.
    pub fn provider_failed_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        MsgscopeError::Provider { reason: reason.into(), source: Some(source) }
    }

    /// Helper constructor for closed channels.
    pub fn channel_closed(reason: impl Into<String>) -> Self {
        MsgscopeError::ChannelClosed { reason: reason.into() }
    }

    /// Attach a field path to an out-of-bounds error raised by a leaf decoder.
    ///
    /// Leaf decoders only know the wire type they were reading; the record
    /// decoder knows which schema path was being decoded.
    pub fn with_field(self, path: &str) -> Self {
        match self {
            MsgscopeError::OutOfBounds { offset, needed, available, .. } => {
                MsgscopeError::OutOfBounds { field: path.to_string(), offset, needed, available }
            }
            other => other,
        }
    }
}

impl From<std::io::Error> for MsgscopeError {
    fn from(err: std::io::Error) -> Self {
        MsgscopeError::Config { path: PathBuf::from("<unknown>"), source: err }
    }
}

impl From<serde_yaml_ng::Error> for MsgscopeError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        MsgscopeError::Parse { context: "YAML configuration".to_string(), details: err.to_string() }
    }
}
