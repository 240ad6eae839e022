//! Logging facilities for Horizon Shell.
//!
//! Horizon Shell uses the `tracing` crate for instrumentation. Every event is
//! emitted with one of the [`targets`] below so embedders can filter by
//! subsystem. To see logs, install a subscriber in the host application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_shell::launch=debug,horizon_shell::watchdog=info")
//!     .init();
//! ```

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Serial task queue target.
    pub const TASK: &str = "horizon_shell_core::task";
    /// Signal/observer target.
    pub const SIGNAL: &str = "horizon_shell_core::signal";
    /// Timer host target.
    pub const TIMER: &str = "horizon_shell_core::timer";
    /// Window wrapper lifecycle target.
    pub const WINDOW: &str = "horizon_shell::window";
    /// Launch coordinator target.
    pub const LAUNCH: &str = "horizon_shell::launch";
    /// Persistence of geometry and app state.
    pub const PERSISTENCE: &str = "horizon_shell::persistence";
    /// Idle-shutdown watchdog target.
    pub const WATCHDOG: &str = "horizon_shell::watchdog";
    /// Process-level shell events.
    pub const SHELL: &str = "horizon_shell::shell";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// This is useful for tracking the duration of an operation.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "horizon_shell::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}
