//! Convenient re-exports for common Horizon Shell types.
//!
//! ```ignore
//! use horizon_shell::prelude::*;
//! ```

pub use crate::config::ShellConfig;
pub use crate::context::ShellContext;
pub use crate::error::{Result, ShellError};
pub use crate::launch::{AppState, LaunchCoordinator, LaunchRequest, LaunchType};
pub use crate::platform::{
    BusySignal, ContentEnvironment, ContentWindow, DesktopService, HostProcess, LocalDesktop,
    MemoryStore, PersistenceService, PlatformServices, PlatformWindow, WindowService,
};
pub use crate::shell::Shell;
pub use crate::watchdog::{ShutdownWatchdog, WatchdogVerdict};
pub use crate::window::{
    Bounds, CreateOptions, LaunchOutcome, ScreenArea, WindowPhase, WindowWrapper, WrapperKind,
};

pub use horizon_shell_core::{Done, ManualTimers, Signal, TaskQueue, TimerHost};
