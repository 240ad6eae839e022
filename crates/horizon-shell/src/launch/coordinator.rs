//! Resolution of main-window launch requests.
//!
//! Requests are resolved one at a time on the process-wide queue against a
//! snapshot of the main windows in the registry. A request either focuses an
//! existing window or opens a new one; in both cases the callback receives
//! the id of the window that ends up in front.

use std::sync::Arc;

use regex::Regex;

use horizon_shell_core::logging::targets;
use horizon_shell_core::{Done, PerfSpan, TaskQueue};

use crate::context::ShellContext;
use crate::error::{Result, ShellError};
use crate::platform::focus_on_desktop;
use crate::window::{CreateOptions, LaunchOutcome, RegisteredWindow, WindowWrapper};

use super::request::{LaunchRequest, LaunchType};

type WindowIdCallback = Box<dyn FnOnce(Result<String>) + Send>;

struct CoordinatorInner {
    context: ShellContext,
    queue: TaskQueue,
    id_pattern: Regex,
    main_options: CreateOptions,
}

/// Launches main windows.
///
/// Cloning yields another handle to the same coordinator and queue.
#[derive(Clone)]
pub struct LaunchCoordinator {
    inner: Arc<CoordinatorInner>,
}

impl LaunchCoordinator {
    /// Create a coordinator.
    ///
    /// Main windows get the default main-window options for the screen area
    /// available right now.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::IdPattern`] if the configured id prefix cannot
    /// be turned into a pattern.
    pub fn new(context: ShellContext) -> Result<Self> {
        let main_options = CreateOptions::main_window(context.services().windows.available_area());
        Self::with_options(context, main_options)
    }

    /// Create a coordinator with explicit main-window options.
    pub fn with_options(context: ShellContext, main_options: CreateOptions) -> Result<Self> {
        let pattern = format!("^{}(\\d*)$", regex::escape(&context.config().window_id_prefix));
        let id_pattern = Regex::new(&pattern)?;
        Ok(Self {
            inner: Arc::new(CoordinatorInner {
                context,
                queue: TaskQueue::new(),
                id_pattern,
                main_options,
            }),
        })
    }

    pub fn context(&self) -> &ShellContext {
        &self.inner.context
    }

    /// The process-wide queue launch requests are resolved on.
    pub fn queue(&self) -> &TaskQueue {
        &self.inner.queue
    }

    /// Whether `id` names a main window.
    pub fn is_main_window_id(&self, id: &str) -> bool {
        self.inner.id_pattern.is_match(id)
    }

    /// The window number encoded in a main-window id.
    ///
    /// A bare prefix is number zero.
    pub fn parse_window_number(&self, id: &str) -> Option<u32> {
        let captures = self.inner.id_pattern.captures(id)?;
        let digits = captures.get(1).map_or("", |m| m.as_str());
        if digits.is_empty() {
            Some(0)
        } else {
            digits.parse().ok()
        }
    }

    /// Resolve a launch request.
    ///
    /// The callback receives the id of the focused or newly opened window,
    /// or [`ShellError::WindowCreation`] if a new window could not be
    /// created.
    pub fn launch_window<F>(&self, request: LaunchRequest, callback: F)
    where
        F: FnOnce(Result<String>) + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        self.inner
            .queue
            .run(move |done| inner.resolve(request, Box::new(callback), done));
    }
}

impl std::fmt::Debug for LaunchCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LaunchCoordinator")
            .field("id_pattern", &self.inner.id_pattern.as_str())
            .field("queue", &self.inner.queue)
            .finish()
    }
}

impl CoordinatorInner {
    fn resolve(&self, request: LaunchRequest, callback: WindowIdCallback, done: Done) {
        let _span = PerfSpan::new("launch_window");
        let profile = request.displayed_id();
        let candidates: Vec<RegisteredWindow> = self
            .context
            .registry()
            .entries()
            .into_iter()
            .filter(|entry| self.id_pattern.is_match(&entry.id))
            .collect();

        tracing::debug!(
            target: targets::LAUNCH,
            launch_type = ?request.launch_type,
            candidates = candidates.len(),
            "resolving launch request"
        );

        if request.launch_type.reuses_same_target()
            && let Some(requested) = &request.app_state
        {
            let same = candidates.iter().find(|entry| {
                entry
                    .window
                    .content()
                    .environment()
                    .app_state
                    .is_some_and(|shown| shown.is_same_target(requested))
            });
            if let Some(entry) = same {
                tracing::debug!(target: targets::LAUNCH, id = %entry.id, "focusing window with same target");
                self.focus(entry, profile, callback);
                done.call();
                return;
            }
        }

        if request.launch_type == LaunchType::FocusAnyOrCreate {
            for entry in &candidates {
                match entry.window.content().is_focused() {
                    Ok(true) => {
                        tracing::debug!(target: targets::LAUNCH, id = %entry.id, "window already focused");
                        callback(Ok(entry.id.clone()));
                        done.call();
                        return;
                    }
                    Ok(false) => {}
                    Err(err) => {
                        tracing::error!(target: targets::LAUNCH, id = %entry.id, %err, "focus query failed");
                    }
                }
            }

            let fallback = candidates
                .iter()
                .find(|entry| !entry.window.is_minimized())
                .or_else(|| candidates.first());
            if let Some(entry) = fallback {
                tracing::debug!(target: targets::LAUNCH, id = %entry.id, "focusing existing window");
                self.focus(entry, profile, callback);
                done.call();
                return;
            }
        }

        self.open_new(request, profile, callback, done);
    }

    fn focus(&self, entry: &RegisteredWindow, profile: Option<String>, callback: WindowIdCallback) {
        focus_on_desktop(
            &self.context.services().desktop,
            Arc::clone(&entry.window),
            profile,
        );
        callback(Ok(entry.id.clone()));
    }

    fn open_new(&self, request: LaunchRequest, profile: Option<String>, callback: WindowIdCallback, done: Done) {
        let config = self.context.config();
        let number = self.context.registry().allocate_window_id(request.id);
        let app_id = config.main_window_id(number);
        let url = config.main_window_url.clone();
        let wrapper = WindowWrapper::new(
            self.context.clone(),
            url.clone(),
            app_id.clone(),
            self.main_options.clone(),
        );
        tracing::debug!(target: targets::LAUNCH, id = %app_id, "opening new window");

        let desktop = Arc::clone(&self.context.services().desktop);
        let opened = wrapper.clone();
        wrapper.launch(request.app_state.unwrap_or_default(), false, move |outcome| {
            match (outcome, opened.platform_window()) {
                (LaunchOutcome::Created, Some(window)) => {
                    focus_on_desktop(&desktop, window, profile);
                    callback(Ok(app_id));
                }
                (outcome, _) => callback(Err(ShellError::WindowCreation {
                    url,
                    reason: format!("launch ended with {outcome:?}"),
                })),
            }
            done.call();
        });
    }
}
