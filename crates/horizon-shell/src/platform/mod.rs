//! Services the shell consumes from the host platform.
//!
//! Every platform primitive is asynchronous from the shell's point of view:
//! results arrive through a boxed callback that may run before the call
//! returns or at any later time. Implementations must not hold internal
//! locks while invoking those callbacks, since the shell routinely calls
//! back into the same service from inside them.
//!
//! Window notifications (bounds changed, closed, restored) are delivered
//! through [`Signal`]s owned by the [`PlatformWindow`].

mod memory;

use std::sync::Arc;

use horizon_shell_core::{Signal, TimerHost};
use serde_json::Value;
use thiserror::Error;

use crate::launch::AppState;
use crate::window::{Bounds, CreateOptions, ScreenArea};

pub use memory::{LocalDesktop, MemoryStore};

/// Errors reported by platform window primitives.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlatformError {
    /// The window or its content is not ready to answer yet.
    #[error("window is not ready: {0}")]
    NotReady(String),
    /// The platform rejected the operation.
    #[error("platform operation failed: {0}")]
    Failed(String),
}

/// Errors reported by the persistence service.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store cannot be reached.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Completion of a window creation request.
pub type CreateCallback = Box<dyn FnOnce(Result<Arc<dyn PlatformWindow>, PlatformError>) + Send>;

/// Completion of a persistence read.
pub type StoreCallback<T> = Box<dyn FnOnce(Result<T, StoreError>) + Send>;

/// Creates top-level windows.
pub trait WindowService: Send + Sync {
    /// Create a window showing `url`.
    ///
    /// The callback receives the live window once the platform has created
    /// it, or the reason it could not.
    fn create(&self, url: &str, options: &CreateOptions, callback: CreateCallback);

    /// Size of the screen area available to windows.
    fn available_area(&self) -> ScreenArea;
}

/// A live top-level window.
pub trait PlatformWindow: Send + Sync {
    /// Current outer bounds.
    fn bounds(&self) -> Bounds;

    /// Move the top-left corner, keeping the size.
    fn move_to(&self, left: i32, top: i32);

    fn is_maximized(&self) -> bool;

    fn is_minimized(&self) -> bool;

    /// Leave the maximized or minimized state. `restored` is emitted once
    /// the platform has done so.
    fn restore(&self);

    /// Bring the window to the front, restoring it if minimized.
    fn focus(&self);

    /// Replace the window icon with the image at `path`.
    fn set_icon(&self, path: &str);

    /// The content page hosted in this window.
    fn content(&self) -> Arc<dyn ContentWindow>;

    /// Emitted with the new bounds after every move or resize.
    fn bounds_changed(&self) -> &Signal<Bounds>;

    /// Emitted once, after the window has been closed.
    fn closed(&self) -> &Signal<()>;

    /// Emitted after a `restore` request completes.
    fn restored(&self) -> &Signal<()>;
}

/// Values injected into a content page before it starts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentEnvironment {
    /// Id the window is registered under.
    pub app_id: Option<String>,
    /// State the content starts from.
    pub app_state: Option<AppState>,
    /// Whether this launch restores a window from a previous session.
    pub reopen: bool,
    /// Content URL the window was created with.
    pub initial_url: Option<String>,
}

/// A key/value pair a content page wants persisted when its window closes.
#[derive(Debug, Clone, PartialEq)]
pub struct ExitEntry {
    pub key: String,
    pub value: Value,
}

impl ExitEntry {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// The contract between the shell and a window's content page.
///
/// Only the environment accessors and the focus query are mandatory; the
/// remaining hooks default to "not supported".
pub trait ContentWindow: Send + Sync {
    /// The values last injected with [`set_environment`](Self::set_environment).
    fn environment(&self) -> ContentEnvironment;

    fn set_environment(&self, environment: ContentEnvironment);

    /// Reload the page so it picks up a new environment.
    ///
    /// Returns `false` if the content cannot reload.
    fn reload(&self) -> bool {
        false
    }

    /// Called after the window has closed, before its state is discarded.
    fn unload(&self) {}

    /// Values to persist once the window has closed.
    fn save_on_exit(&self) -> Vec<ExitEntry> {
        Vec::new()
    }

    /// Whether the content currently has input focus.
    ///
    /// # Errors
    ///
    /// The query may fail while the page is still loading or already gone.
    fn is_focused(&self) -> Result<bool, PlatformError>;

    /// Whether the page is in the middle of closing.
    ///
    /// A registered window whose content is closing delays termination
    /// instead of blocking it.
    fn is_closing(&self) -> bool {
        false
    }
}

/// Small JSON key/value store shared by all windows.
pub trait PersistenceService: Send + Sync {
    /// Read one key. `Ok(None)` means the key is absent.
    fn get(&self, key: &str, callback: StoreCallback<Option<Value>>);

    /// Read every stored pair.
    fn get_all(&self, callback: StoreCallback<Vec<(String, Value)>>);

    /// Write a key. Writes are fire-and-forget.
    fn set(&self, key: &str, value: Value);

    /// Delete a key if present.
    fn remove(&self, key: &str);
}

/// Whether some background subsystem (file operations, sync) still needs the
/// process alive.
pub trait BusySignal: Send + Sync {
    fn is_busy(&self) -> bool;
}

impl<F> BusySignal for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn is_busy(&self) -> bool {
        self()
    }
}

/// Multi-profile desktops.
pub trait DesktopService: Send + Sync {
    /// The profile currently signed in on the active desktop.
    fn current_profile(&self, callback: Box<dyn FnOnce(String) + Send>);

    /// Move `window` to the desktop of `profile_id`, then call back.
    fn visit_desktop(
        &self,
        window: &Arc<dyn PlatformWindow>,
        profile_id: &str,
        callback: Box<dyn FnOnce() + Send>,
    );
}

/// State of one page hosted by the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewStatus {
    /// The page is in the middle of closing.
    pub closing: bool,
    /// The shell's own background page. It lives as long as the process and
    /// never keeps it alive.
    pub background: bool,
}

impl ViewStatus {
    /// An ordinary page that is open.
    pub fn page() -> Self {
        Self::default()
    }

    /// An ordinary page that is closing.
    pub fn closing_page() -> Self {
        Self {
            closing: true,
            ..Self::default()
        }
    }

    /// The page the shell itself runs in.
    pub fn shell_page() -> Self {
        Self {
            background: true,
            ..Self::default()
        }
    }
}

/// The host process itself.
pub trait HostProcess: Send + Sync {
    /// Every page the process currently hosts, including the shell's own
    /// background page, which is flagged `background`.
    fn views(&self) -> Vec<ViewStatus>;

    /// End the process.
    fn terminate(&self);
}

/// The set of platform services a shell runs against.
#[derive(Clone)]
pub struct PlatformServices {
    pub windows: Arc<dyn WindowService>,
    pub store: Arc<dyn PersistenceService>,
    pub desktop: Arc<dyn DesktopService>,
    pub host: Arc<dyn HostProcess>,
    pub busy: Arc<dyn BusySignal>,
    pub timers: Arc<dyn TimerHost>,
}

impl std::fmt::Debug for PlatformServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformServices").finish_non_exhaustive()
    }
}

/// Show `window` on the desktop of `profile_id` (or of the current profile)
/// and focus it there.
pub fn focus_on_desktop(
    desktop: &Arc<dyn DesktopService>,
    window: Arc<dyn PlatformWindow>,
    profile_id: Option<String>,
) {
    let service = Arc::clone(desktop);
    let visit = move |profile: String| {
        let target = Arc::clone(&window);
        service.visit_desktop(&target, &profile, Box::new(move || window.focus()));
    };
    match profile_id {
        Some(profile) => visit(profile),
        None => desktop.current_profile(Box::new(visit)),
    }
}
