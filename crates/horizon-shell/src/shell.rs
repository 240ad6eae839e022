//! The process-level entry point.
//!
//! [`Shell`] reacts to host events (launched, restarted, a file task
//! executed, a context-menu item clicked) by turning them into launch
//! requests for main windows or for the media-player singletons.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::json;

use horizon_shell_core::logging::targets;
use horizon_shell_core::{Done, TaskQueue};

use crate::config::ShellConfig;
use crate::context::ShellContext;
use crate::error::{Result, ShellError};
use crate::launch::{AppState, LaunchCoordinator, LaunchRequest, LaunchType};
use crate::platform::{PlatformServices, focus_on_desktop};
use crate::watchdog::WatchdogVerdict;
use crate::window::{CreateOptions, LaunchOutcome, WindowWrapper};

/// Task action that plays the given files in the audio player.
pub const PLAY_ACTION: &str = "play";
/// Task action that shows the given file in the video player.
pub const WATCH_ACTION: &str = "watch";
/// Task action issued by the system when removable media is mounted.
pub const AUTO_OPEN_ACTION: &str = "auto-open";
/// Context-menu item that opens another main window.
pub const NEW_WINDOW_MENU_ITEM: &str = "new-window";

type ReadyCallback = Box<dyn FnOnce() + Send>;

struct ShellInner {
    coordinator: LaunchCoordinator,
    audio_player: WindowWrapper,
    video_player: WindowWrapper,
    /// Serializes audio player launches and reopens.
    media_queue: TaskQueue,
    /// Callbacks waiting for initialization; `None` once initialized.
    ready_callbacks: Mutex<Option<Vec<ReadyCallback>>>,
}

/// A running shell.
///
/// Cloning yields another handle to the same shell.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use horizon_shell::prelude::*;
/// # use horizon_shell::platform::{HostProcess, ViewStatus, WindowService, CreateCallback, PlatformError};
/// # struct Host;
/// # impl HostProcess for Host {
/// #     fn views(&self) -> Vec<ViewStatus> { Vec::new() }
/// #     fn terminate(&self) {}
/// # }
/// # struct NoWindows;
/// # impl WindowService for NoWindows {
/// #     fn create(&self, _url: &str, _options: &CreateOptions, callback: CreateCallback) {
/// #         callback(Err(PlatformError::Failed("headless".into())));
/// #     }
/// #     fn available_area(&self) -> ScreenArea { ScreenArea::default() }
/// # }
///
/// let services = PlatformServices {
///     windows: Arc::new(NoWindows),
///     store: Arc::new(MemoryStore::new()),
///     desktop: Arc::new(LocalDesktop::default()),
///     host: Arc::new(Host),
///     busy: Arc::new(|| false),
///     timers: Arc::new(ManualTimers::new()),
/// };
/// let shell = Shell::new(services, ShellConfig::default()).unwrap();
///
/// shell.ready(|| println!("ready"));
/// shell.initialize(|done| done.call());
/// assert!(shell.is_ready());
/// ```
#[derive(Clone)]
pub struct Shell {
    inner: Arc<ShellInner>,
}

impl Shell {
    /// Create a shell on top of the given platform services.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::IdPattern`] if the configured window id prefix
    /// is unusable.
    pub fn new(services: PlatformServices, config: ShellConfig) -> Result<Self> {
        let context = ShellContext::new(services, config);
        let config = context.config();
        let audio_player = WindowWrapper::singleton(
            context.clone(),
            config.audio_player_url.clone(),
            CreateOptions::audio_player(),
        );
        let video_player = WindowWrapper::singleton(
            context.clone(),
            config.video_player_url.clone(),
            CreateOptions::video_player(),
        );
        let coordinator = LaunchCoordinator::new(context)?;
        Ok(Self {
            inner: Arc::new(ShellInner {
                coordinator,
                audio_player,
                video_player,
                media_queue: TaskQueue::new(),
                ready_callbacks: Mutex::new(Some(Vec::new())),
            }),
        })
    }

    pub fn context(&self) -> &ShellContext {
        self.inner.coordinator.context()
    }

    pub fn coordinator(&self) -> &LaunchCoordinator {
        &self.inner.coordinator
    }

    pub fn audio_player(&self) -> &WindowWrapper {
        &self.inner.audio_player
    }

    pub fn video_player(&self) -> &WindowWrapper {
        &self.inner.video_player
    }

    /// Run the initialization step, then every callback registered with
    /// [`ready`](Self::ready).
    ///
    /// The step runs on the process-wide queue, so launch requests issued
    /// meanwhile are resolved only after it has finished.
    pub fn initialize<F>(&self, step: F)
    where
        F: FnOnce(Done) + Send + 'static,
    {
        let queue = self.inner.coordinator.queue();
        queue.run(step);
        let inner = Arc::clone(&self.inner);
        queue.run(move |done| {
            let callbacks = inner.ready_callbacks.lock().take().unwrap_or_default();
            tracing::info!(target: targets::SHELL, pending = callbacks.len(), "shell initialized");
            for callback in callbacks {
                callback();
            }
            done.call();
        });
    }

    /// Run `callback` once initialization has finished; immediately if it
    /// already has.
    pub fn ready<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let deferred = {
            let mut pending = self.inner.ready_callbacks.lock();
            match pending.as_mut() {
                Some(callbacks) => {
                    callbacks.push(Box::new(callback));
                    None
                }
                None => Some(callback),
            }
        };
        if let Some(callback) = deferred {
            callback();
        }
    }

    pub fn is_ready(&self) -> bool {
        self.inner.ready_callbacks.lock().is_none()
    }

    /// Resolve a main-window launch request.
    pub fn launch_window<F>(&self, request: LaunchRequest, callback: F)
    where
        F: FnOnce(Result<String>) + Send + 'static,
    {
        self.inner.coordinator.launch_window(request, callback);
    }

    /// The application was started by the user.
    ///
    /// On a fresh start (no main window numbered yet) the state of main
    /// windows from an earlier session is discarded. Then any main window is
    /// focused, or a new one opened.
    pub fn on_launched(&self) {
        tracing::info!(target: targets::SHELL, "launched");
        let context = self.context();
        if context.registry().next_window_id() == 0 {
            let coordinator = self.inner.coordinator.clone();
            let store = Arc::clone(&context.services().store);
            context.services().store.get_all(Box::new(move |result| match result {
                Ok(pairs) => {
                    for (key, _) in pairs {
                        if coordinator.is_main_window_id(&key) {
                            tracing::debug!(target: targets::PERSISTENCE, key = %key, "removing stale window state");
                            store.remove(&key);
                        }
                    }
                }
                Err(err) => {
                    tracing::warn!(target: targets::PERSISTENCE, %err, "could not list stored state");
                }
            }));
        }
        self.launch_window(
            LaunchRequest::new().with_launch_type(LaunchType::FocusAnyOrCreate),
            log_launch_result,
        );
    }

    /// The application was restarted by the system (update or crash).
    ///
    /// Every main window with persisted state is relaunched under its old
    /// number, then both media players are reopened.
    pub fn on_restarted(&self) {
        tracing::info!(target: targets::SHELL, "restarted");
        let context = self.context();
        let coordinator = self.inner.coordinator.clone();
        context.services().store.get_all(Box::new(move |result| {
            let pairs = match result {
                Ok(pairs) => pairs,
                Err(err) => {
                    tracing::warn!(target: targets::PERSISTENCE, %err, "could not list stored state");
                    return;
                }
            };
            for (key, value) in pairs {
                let Some(number) = coordinator.parse_window_number(&key) else {
                    continue;
                };
                match AppState::from_persisted(&value) {
                    Ok(app_state) => {
                        let mut request = LaunchRequest::new().with_id(number);
                        request.app_state = app_state;
                        coordinator.launch_window(request, log_launch_result);
                    }
                    Err(source) => {
                        let err = ShellError::CorruptState { key, source };
                        tracing::error!(target: targets::PERSISTENCE, %err, "not restoring window");
                    }
                }
            }
        }));

        let player = self.inner.audio_player.clone();
        let icon = context.config().audio_player_icon.clone();
        self.inner.media_queue.run(move |done| {
            let target = player.clone();
            player.reopen(move |outcome| {
                if target.platform_window().is_some() {
                    target.set_icon(&icon);
                }
                tracing::debug!(target: targets::SHELL, ?outcome, "audio player reopened");
                done.call();
            });
        });
        self.inner.video_player.reopen(|outcome| {
            tracing::debug!(target: targets::SHELL, ?outcome, "video player reopened");
        });
    }

    /// A file task was executed on `entries`.
    pub fn on_execute(&self, action: &str, entries: &[String]) {
        tracing::debug!(target: targets::SHELL, action, entries = entries.len(), "task executed");
        match action {
            PLAY_ACTION => {
                let playlist = AppState::new()
                    .with_field("items", entries.to_vec())
                    .with_field("position", 0);
                self.launch_audio_player(playlist, None);
            }
            WATCH_ACTION => match entries.first() {
                Some(url) => self.launch_video_player(url, None),
                None => tracing::warn!(target: targets::SHELL, "watch task without entries"),
            },
            _ => {
                if action == AUTO_OPEN_ACTION && !self.context().config().auto_open_enabled {
                    tracing::debug!(target: targets::SHELL, "auto-open disabled");
                    return;
                }
                let Some(first) = entries.first() else {
                    tracing::warn!(target: targets::SHELL, action, "task without entries");
                    return;
                };
                let app_state = AppState::new()
                    .with_field("params", json!({ "action": action }))
                    .with_selection(first.clone());
                let launch_type = if action == AUTO_OPEN_ACTION {
                    LaunchType::FocusAnyOrCreate
                } else {
                    LaunchType::FocusSameOrCreate
                };
                self.launch_window(
                    LaunchRequest::new()
                        .with_app_state(app_state)
                        .with_launch_type(launch_type),
                    log_launch_result,
                );
            }
        }
    }

    /// A context-menu item was clicked.
    ///
    /// "new-window" opens a main window on the directory of the focused main
    /// window, or an empty one if no main window has focus.
    pub fn on_context_menu_clicked(&self, item_id: &str) {
        if item_id != NEW_WINDOW_MENU_ITEM {
            tracing::debug!(target: targets::SHELL, item_id, "ignoring menu item");
            return;
        }

        let focused = self
            .context()
            .registry()
            .entries()
            .into_iter()
            .filter(|entry| self.inner.coordinator.is_main_window_id(&entry.id))
            .find(|entry| matches!(entry.window.content().is_focused(), Ok(true)));

        let mut request = LaunchRequest::new();
        if let Some(entry) = focused {
            let directory = entry
                .window
                .content()
                .environment()
                .app_state
                .and_then(|state| state.current_directory_url);
            if let Some(directory) = directory {
                request = request.with_app_state(AppState::new().with_current_directory(directory));
            }
        }
        self.launch_window(request, log_launch_result);
    }

    /// Background sync finished; the process may have become idle.
    pub fn on_sync_completed(&self) -> WatchdogVerdict {
        self.context().watchdog().evaluate()
    }

    /// Show the audio player with a playlist, reloading it if already open.
    pub fn launch_audio_player(&self, playlist: AppState, displayed_id: Option<String>) {
        let player = self.inner.audio_player.clone();
        let desktop = Arc::clone(&self.context().services().desktop);
        let icon = self.context().config().audio_player_icon.clone();
        self.inner.media_queue.run(move |done| {
            let target = player.clone();
            player.launch(playlist, false, move |outcome| {
                if matches!(outcome, LaunchOutcome::Created | LaunchOutcome::Reloaded) {
                    target.set_icon(&icon);
                    if let Some(window) = target.platform_window() {
                        focus_on_desktop(&desktop, window, displayed_id);
                    }
                }
                done.call();
            });
        });
    }

    /// Show the video player on `url`, reloading it if already open.
    pub fn launch_video_player(&self, url: &str, displayed_id: Option<String>) {
        let player = self.inner.video_player.clone();
        let target = player.clone();
        let desktop = Arc::clone(&self.context().services().desktop);
        player.launch(AppState::new().with_field("url", url), false, move |outcome| {
            if matches!(outcome, LaunchOutcome::Created | LaunchOutcome::Reloaded)
                && let Some(window) = target.platform_window()
            {
                focus_on_desktop(&desktop, window, displayed_id);
            }
        });
    }

    /// Persist the app state of window `id` so it can be restored after a
    /// restart.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::Serialize`] if the state cannot be encoded.
    pub fn save_app_state(&self, id: &str, app_state: &AppState) -> Result<()> {
        let record = app_state.to_persisted().map_err(ShellError::Serialize)?;
        self.context().services().store.set(id, record);
        Ok(())
    }
}

impl std::fmt::Debug for Shell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shell")
            .field("coordinator", &self.inner.coordinator)
            .field("audio_player", &self.inner.audio_player)
            .field("video_player", &self.inner.video_player)
            .field("ready", &self.is_ready())
            .finish()
    }
}

fn log_launch_result(result: Result<String>) {
    match result {
        Ok(id) => tracing::debug!(target: targets::SHELL, id = %id, "launch resolved"),
        Err(err) => tracing::error!(target: targets::SHELL, %err, "launch failed"),
    }
}
