//! Window-lifecycle orchestration for multi-window desktop shells.
//!
//! Horizon Shell decides, for every launch request, whether to open a new
//! top-level window, bring an existing one to the front, or reload a
//! single-instance window. It remembers where windows were and what they
//! showed across restarts, and terminates the host process once nothing
//! needs it any more.
//!
//! The platform (window creation, storage, desktops, the process itself) is
//! reached through the traits in [`platform`]. Everything the platform does
//! is treated as asynchronous; ordering comes from the per-owner
//! [`TaskQueue`](horizon_shell_core::TaskQueue)s of the core crate.
//!
//! # Components
//!
//! - [`window::WindowWrapper`]: one window's creation, placement, geometry
//!   persistence and teardown; singleton wrappers reload instead of
//!   duplicating
//! - [`launch::LaunchCoordinator`]: resolves launch requests against the open
//!   main windows
//! - [`ShutdownWatchdog`]: debounced idle termination
//! - [`Shell`]: host event handlers and the media-player singletons
//!
//! # Logging
//!
//! Events are emitted with `tracing` under the targets in
//! [`horizon_shell_core::logging::targets`].

mod config;
mod context;
mod error;
pub mod launch;
pub mod platform;
pub mod prelude;
mod shell;
mod watchdog;
pub mod window;

pub use config::{DEFAULT_SETTLE_DELAY_MS, ShellConfig};
pub use context::ShellContext;
pub use error::{Result, ShellError};
pub use shell::{AUTO_OPEN_ACTION, NEW_WINDOW_MENU_ITEM, PLAY_ACTION, Shell, WATCH_ACTION};
pub use watchdog::{ShutdownWatchdog, WatchdogVerdict};
