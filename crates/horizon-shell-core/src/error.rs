//! Error types for Horizon Shell core.

use thiserror::Error;

/// Timer-specific errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    /// No async runtime is available to drive the timers.
    #[error("no async runtime available for timers: {0}")]
    RuntimeUnavailable(String),
}

/// A specialized Result type for Horizon Shell core operations.
pub type Result<T> = std::result::Result<T, TimerError>;
