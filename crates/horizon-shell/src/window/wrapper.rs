//! Window wrapper: the lifecycle of one logical window.
//!
//! A [`WindowWrapper`] owns at most one live platform window at a time and
//! moves through `Closed -> Opening -> Open -> Closed`. Launching runs four
//! steps on the wrapper's own [`TaskQueue`]:
//!
//! 1. restore the first maximized sibling (same content URL), waiting for its
//!    `restored` notification;
//! 2. read the persisted geometry of the content URL;
//! 3. create the platform window, using that geometry as its bounds;
//! 4. shift it off any sibling's corner, hand the content its environment,
//!    connect the bounds and close listeners and register it.
//!
//! A singleton wrapper is keyed by its content URL. Launching it while it is
//! opening or open reloads the existing window instead of creating another.

use std::sync::Arc;

use parking_lot::Mutex;

use horizon_shell_core::logging::targets;
use horizon_shell_core::{ConnectionId, Done, TaskQueue};

use crate::context::ShellContext;
use crate::error::ShellError;
use crate::launch::AppState;
use crate::platform::{ContentEnvironment, PlatformWindow};

use super::geometry::Bounds;
use super::options::CreateOptions;
use super::placement::avoid_overlap;
use super::registry::RegisteredWindow;

/// Launch policy of a wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WrapperKind {
    /// A second launch while open is an error.
    Ordinary,
    /// A second launch while open reloads the window.
    Singleton,
}

/// Lifecycle phase of a wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WindowPhase {
    #[default]
    Closed,
    /// A launch is queued or in progress.
    Opening,
    Open,
}

/// How a launch request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaunchOutcome {
    /// A new platform window was created and registered.
    Created,
    /// The existing singleton window was reloaded with new state.
    Reloaded,
    /// The wrapper was already opening or open; nothing happened.
    AlreadyOpen,
    /// There was no persisted state to reopen from.
    Skipped,
    /// The platform did not produce a window.
    Failed,
}

type LaunchCallback = Box<dyn FnOnce(LaunchOutcome) + Send>;

#[derive(Default)]
struct WrapperState {
    phase: WindowPhase,
    window: Option<Arc<dyn PlatformWindow>>,
    app_state: AppState,
    reopen: bool,
    /// Bounds listener on the live window. The close listener is one-shot.
    bounds_listener: Option<ConnectionId>,
}

struct WrapperInner {
    id: String,
    url: String,
    kind: WrapperKind,
    options: CreateOptions,
    context: ShellContext,
    queue: TaskQueue,
    state: Mutex<WrapperState>,
}

/// Lifecycle manager of one logical window.
///
/// Cloning yields another handle to the same wrapper.
#[derive(Clone)]
pub struct WindowWrapper {
    inner: Arc<WrapperInner>,
}

impl WindowWrapper {
    /// Create an ordinary wrapper for `url` registered under `id`.
    pub fn new(
        context: ShellContext,
        url: impl Into<String>,
        id: impl Into<String>,
        options: CreateOptions,
    ) -> Self {
        Self::with_kind(context, url.into(), id.into(), options, WrapperKind::Ordinary)
    }

    /// Create a singleton wrapper for `url`. Its id is the URL.
    pub fn singleton(context: ShellContext, url: impl Into<String>, options: CreateOptions) -> Self {
        let url = url.into();
        Self::with_kind(context, url.clone(), url, options, WrapperKind::Singleton)
    }

    fn with_kind(
        context: ShellContext,
        url: String,
        id: String,
        options: CreateOptions,
        kind: WrapperKind,
    ) -> Self {
        Self {
            inner: Arc::new(WrapperInner {
                id,
                url,
                kind,
                options,
                context,
                queue: TaskQueue::new(),
                state: Mutex::new(WrapperState::default()),
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn url(&self) -> &str {
        &self.inner.url
    }

    pub fn kind(&self) -> WrapperKind {
        self.inner.kind
    }

    pub fn phase(&self) -> WindowPhase {
        self.inner.state.lock().phase
    }

    /// The live platform window, if one exists.
    pub fn platform_window(&self) -> Option<Arc<dyn PlatformWindow>> {
        self.inner.state.lock().window.clone()
    }

    /// The app state of the latest launch or reload.
    pub fn app_state(&self) -> AppState {
        self.inner.state.lock().app_state.clone()
    }

    /// The wrapper's step queue.
    pub fn queue(&self) -> &TaskQueue {
        &self.inner.queue
    }

    /// Open the window with `app_state`.
    ///
    /// `reopen` tells the content it is being restored from a previous
    /// session. The callback runs once the launch has been resolved; for a
    /// new window that is after registration.
    ///
    /// An ordinary wrapper that is already opening or open logs an error and
    /// reports [`LaunchOutcome::AlreadyOpen`]. A singleton reloads instead.
    pub fn launch<F>(&self, app_state: AppState, reopen: bool, callback: F)
    where
        F: FnOnce(LaunchOutcome) + Send + 'static,
    {
        WrapperInner::launch(&self.inner, app_state, reopen, Box::new(callback));
    }

    /// Launch again from the app state persisted under this wrapper's id.
    ///
    /// Missing state reports [`LaunchOutcome::Skipped`]; so does state that
    /// cannot be parsed, which is also logged.
    pub fn reopen<F>(&self, callback: F)
    where
        F: FnOnce(LaunchOutcome) + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        let key = self.inner.id.clone();
        self.inner.context.services().store.get(
            &self.inner.id,
            Box::new(move |result| {
                let value = match result {
                    Ok(Some(value)) => value,
                    Ok(None) => {
                        tracing::debug!(target: targets::PERSISTENCE, key = %key, "nothing to reopen");
                        callback(LaunchOutcome::Skipped);
                        return;
                    }
                    Err(err) => {
                        tracing::warn!(target: targets::PERSISTENCE, key = %key, %err, "could not read launch data");
                        callback(LaunchOutcome::Skipped);
                        return;
                    }
                };
                match AppState::from_persisted(&value) {
                    Ok(Some(app_state)) => {
                        WrapperInner::launch(&inner, app_state, true, Box::new(callback));
                    }
                    Ok(None) => callback(LaunchOutcome::Skipped),
                    Err(source) => {
                        let err = ShellError::CorruptState { key, source };
                        tracing::error!(target: targets::PERSISTENCE, %err, "discarding launch data");
                        callback(LaunchOutcome::Skipped);
                    }
                }
            }),
        );
    }

    /// Set the icon of the live window.
    pub fn set_icon(&self, path: &str) {
        match self.platform_window() {
            Some(window) => window.set_icon(path),
            None => tracing::warn!(
                target: targets::WINDOW,
                id = %self.inner.id,
                path,
                "cannot set icon before the window is created"
            ),
        }
    }
}

impl std::fmt::Debug for WindowWrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("WindowWrapper")
            .field("id", &self.inner.id)
            .field("url", &self.inner.url)
            .field("kind", &self.inner.kind)
            .field("phase", &state.phase)
            .finish()
    }
}

impl WrapperInner {
    fn launch(this: &Arc<Self>, app_state: AppState, reopen: bool, callback: LaunchCallback) {
        let begun = {
            let mut state = this.state.lock();
            if state.phase == WindowPhase::Closed {
                state.phase = WindowPhase::Opening;
                state.app_state = app_state.clone();
                state.reopen = reopen;
                true
            } else {
                false
            }
        };

        if begun {
            Self::enqueue_open(this, callback);
            return;
        }

        match this.kind {
            WrapperKind::Ordinary => {
                let err = ShellError::AlreadyOpen { id: this.id.clone() };
                tracing::error!(target: targets::WINDOW, %err, "duplicate launch ignored");
                callback(LaunchOutcome::AlreadyOpen);
            }
            WrapperKind::Singleton => Self::enqueue_reload(this, app_state, reopen, callback),
        }
    }

    fn enqueue_open(this: &Arc<Self>, callback: LaunchCallback) {
        tracing::debug!(target: targets::WINDOW, id = %this.id, url = %this.url, "launching window");

        let siblings = this.context.registry().similar_windows(&this.url);
        let hint: Arc<Mutex<Option<Bounds>>> = Arc::new(Mutex::new(None));

        {
            let siblings = siblings.clone();
            this.queue.run(move |done| restore_maximized_sibling(&siblings, done));
        }
        {
            let inner = Arc::clone(this);
            let hint = Arc::clone(&hint);
            this.queue.run(move |done| inner.load_geometry(hint, done));
        }
        {
            let inner = Arc::clone(this);
            let hint = Arc::clone(&hint);
            this.queue.run(move |done| inner.create_window(hint, done));
        }
        {
            let inner = Arc::clone(this);
            this.queue.run(move |done| {
                Self::finish_open(&inner, &siblings, callback);
                done.call();
            });
        }
    }

    fn load_geometry(&self, hint: Arc<Mutex<Option<Bounds>>>, done: Done) {
        let key = self.context.config().geometry_key(&self.url);
        let record_key = key.clone();
        self.context.services().store.get(
            &record_key,
            Box::new(move |result| {
                match result {
                    Ok(Some(record)) => match serde_json::from_value::<Bounds>(record) {
                        Ok(bounds) => *hint.lock() = Some(bounds),
                        Err(err) => {
                            tracing::debug!(target: targets::PERSISTENCE, key = %key, %err, "ignoring unreadable geometry");
                        }
                    },
                    Ok(None) => {}
                    Err(err) => {
                        tracing::debug!(target: targets::PERSISTENCE, key = %key, %err, "geometry unavailable");
                    }
                }
                done.call();
            }),
        );
    }

    fn create_window(self: Arc<Self>, hint: Arc<Mutex<Option<Bounds>>>, done: Done) {
        let hint = *hint.lock();
        let options = match hint {
            Some(bounds) => self.options.clone().with_bounds(bounds),
            None => self.options.clone(),
        };
        let inner = Arc::clone(&self);
        self.context.services().windows.create(
            &self.url,
            &options,
            Box::new(move |result| {
                match result {
                    Ok(window) => inner.state.lock().window = Some(window),
                    Err(err) => {
                        let err = ShellError::WindowCreation {
                            url: inner.url.clone(),
                            reason: err.to_string(),
                        };
                        tracing::error!(target: targets::WINDOW, id = %inner.id, %err, "window creation failed");
                    }
                }
                done.call();
            }),
        );
    }

    fn finish_open(this: &Arc<Self>, siblings: &[Arc<dyn PlatformWindow>], callback: LaunchCallback) {
        let window = this.state.lock().window.clone();
        let Some(window) = window else {
            this.state.lock().phase = WindowPhase::Closed;
            callback(LaunchOutcome::Failed);
            return;
        };

        let occupied: Vec<Bounds> = siblings.iter().map(|sibling| sibling.bounds()).collect();
        let area = this.context.services().windows.available_area();
        let placed = avoid_overlap(
            window.bounds(),
            &occupied,
            area,
            this.context.config().shift_distance,
        );
        window.move_to(placed.left, placed.top);

        let (app_state, reopen) = {
            let state = this.state.lock();
            (state.app_state.clone(), state.reopen)
        };
        window.content().set_environment(ContentEnvironment {
            app_id: Some(this.id.clone()),
            app_state: Some(app_state),
            reopen,
            initial_url: Some(this.url.clone()),
        });

        let weak = Arc::downgrade(this);
        let bounds_listener = window.bounds_changed().connect(move |bounds| {
            if let Some(inner) = weak.upgrade() {
                inner.save_geometry(*bounds);
            }
        });
        let closing = Arc::clone(this);
        window.closed().connect_once(move |_| Self::handle_closed(&closing));
        this.state.lock().bounds_listener = Some(bounds_listener);

        this.context.registry().insert(RegisteredWindow {
            id: this.id.clone(),
            url: this.url.clone(),
            window,
        });
        tracing::info!(
            target: targets::WINDOW,
            id = %this.id,
            left = placed.left,
            top = placed.top,
            "window opened"
        );

        callback(LaunchOutcome::Created);
        let mut state = this.state.lock();
        // The callback may already have seen the window close.
        if state.window.is_some() {
            state.phase = WindowPhase::Open;
        }
    }

    fn enqueue_reload(this: &Arc<Self>, app_state: AppState, reopen: bool, callback: LaunchCallback) {
        let inner = Arc::clone(this);
        this.queue.run(move |done| {
            let window = inner.state.lock().window.clone();
            match window {
                Some(window) => {
                    {
                        let mut state = inner.state.lock();
                        state.app_state = app_state.clone();
                        state.reopen = reopen;
                    }
                    let content = window.content();
                    let mut environment = content.environment();
                    environment.app_state = Some(app_state);
                    environment.reopen = reopen;
                    content.set_environment(environment);
                    if !content.reload() {
                        tracing::warn!(target: targets::WINDOW, id = %inner.id, "content does not support reload");
                    }
                    tracing::debug!(target: targets::WINDOW, id = %inner.id, "singleton reloaded");
                    callback(LaunchOutcome::Reloaded);
                }
                None => {
                    // Closed, or creation failed, after the reload was queued.
                    tracing::debug!(target: targets::WINDOW, id = %inner.id, "singleton gone, launching again");
                    Self::launch(&inner, app_state, reopen, callback);
                }
            }
            done.call();
        });
    }

    fn save_geometry(&self, bounds: Bounds) {
        let key = self.context.config().geometry_key(&self.url);
        match serde_json::to_value(bounds) {
            Ok(record) => self.context.services().store.set(&key, record),
            Err(err) => {
                tracing::warn!(target: targets::PERSISTENCE, key = %key, %err, "could not encode geometry");
            }
        }
    }

    fn handle_closed(this: &Arc<Self>) {
        let (window, bounds_listener) = {
            let mut state = this.state.lock();
            (state.window.take(), state.bounds_listener.take())
        };
        let Some(window) = window else {
            return;
        };
        if let Some(listener) = bounds_listener {
            window.bounds_changed().disconnect(listener);
        }

        let content = window.content();
        content.unload();
        let store = &this.context.services().store;
        for entry in content.save_on_exit() {
            store.set(&entry.key, entry.value);
        }
        store.remove(&this.id);
        this.context.registry().remove(&this.id);
        this.state.lock().phase = WindowPhase::Closed;
        tracing::info!(target: targets::WINDOW, id = %this.id, "window closed");

        this.context.watchdog().evaluate();
    }
}

/// Restore the first maximized sibling and finish once it reports restored.
fn restore_maximized_sibling(siblings: &[Arc<dyn PlatformWindow>], done: Done) {
    match siblings.iter().find(|sibling| sibling.is_maximized()) {
        Some(sibling) => {
            tracing::debug!(target: targets::WINDOW, "restoring maximized sibling");
            sibling.restored().connect_once(move |_| done.call());
            sibling.restore();
        }
        None => done.call(),
    }
}
