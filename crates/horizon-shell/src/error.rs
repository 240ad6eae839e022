//! Error types for the shell.

use thiserror::Error;

use crate::platform::{PlatformError, StoreError};

/// Errors produced by the window orchestrator.
#[derive(Debug, Error)]
pub enum ShellError {
    /// A window with this id is already opening or open.
    #[error("window {id} is already opening or open")]
    AlreadyOpen {
        /// The id of the window.
        id: String,
    },

    /// A persisted record could not be parsed.
    #[error("corrupt persisted state under {key}: {source}")]
    CorruptState {
        /// Persistence key of the record.
        key: String,
        /// The parse error.
        #[source]
        source: serde_json::Error,
    },

    /// The platform did not produce a window.
    #[error("failed to create window for {url}: {reason}")]
    WindowCreation {
        /// Content URL of the window.
        url: String,
        /// Description of the failure.
        reason: String,
    },

    /// Persistence failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Platform window failure.
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// Invalid TOML configuration.
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// Invalid JSON configuration.
    #[error("invalid configuration: {0}")]
    ConfigJson(#[source] serde_json::Error),

    /// The configured window id prefix does not produce a valid pattern.
    #[error("invalid window id pattern: {0}")]
    IdPattern(#[from] regex::Error),

    /// App state could not be serialized for persistence.
    #[error("failed to serialize app state: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// A specialized Result type for shell operations.
pub type Result<T> = std::result::Result<T, ShellError>;
