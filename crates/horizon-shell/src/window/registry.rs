//! Registry of open windows.
//!
//! The registry maps window ids to the live windows that finished launching
//! and have not been reported closed. It also owns the sequential counter
//! main-window numbers are drawn from.

use std::sync::Arc;

use parking_lot::RwLock;

use horizon_shell_core::logging::targets;

use crate::platform::PlatformWindow;

/// A window known to the registry.
#[derive(Clone)]
pub struct RegisteredWindow {
    /// Id the window was launched under.
    pub id: String,
    /// Content URL the window was created with.
    pub url: String,
    /// The live platform window.
    pub window: Arc<dyn PlatformWindow>,
}

impl std::fmt::Debug for RegisteredWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredWindow")
            .field("id", &self.id)
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
struct RegistryState {
    /// Registered windows, oldest first.
    windows: Vec<RegisteredWindow>,
    /// Next main-window number to hand out.
    next_window_id: u32,
}

/// Registry of open windows, in registration order.
///
/// # Example
///
/// ```
/// use horizon_shell::window::WindowRegistry;
///
/// let registry = WindowRegistry::new();
/// assert_eq!(registry.allocate_window_id(None), 0);
/// assert_eq!(registry.allocate_window_id(Some(5)), 5);
/// assert_eq!(registry.allocate_window_id(None), 6);
/// ```
#[derive(Default)]
pub struct WindowRegistry {
    state: RwLock<RegistryState>,
}

impl WindowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a window. An existing entry with the same id is replaced in
    /// place.
    pub fn insert(&self, entry: RegisteredWindow) {
        let mut state = self.state.write();
        tracing::debug!(target: targets::WINDOW, id = %entry.id, url = %entry.url, "window registered");
        match state.windows.iter_mut().find(|existing| existing.id == entry.id) {
            Some(existing) => *existing = entry,
            None => state.windows.push(entry),
        }
    }

    /// Unregister a window.
    ///
    /// Removing the last window resets the id counter, so the next main window
    /// is numbered from zero again.
    pub fn remove(&self, id: &str) -> Option<RegisteredWindow> {
        let mut state = self.state.write();
        let index = state.windows.iter().position(|entry| entry.id == id)?;
        let entry = state.windows.remove(index);
        if state.windows.is_empty() {
            state.next_window_id = 0;
        }
        tracing::debug!(
            target: targets::WINDOW,
            id,
            remaining = state.windows.len(),
            "window unregistered"
        );
        Some(entry)
    }

    pub fn get(&self, id: &str) -> Option<RegisteredWindow> {
        self.state
            .read()
            .windows
            .iter()
            .find(|entry| entry.id == id)
            .cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.state.read().windows.iter().any(|entry| entry.id == id)
    }

    pub fn len(&self) -> usize {
        self.state.read().windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().windows.is_empty()
    }

    /// Registered ids, oldest first.
    pub fn ids(&self) -> Vec<String> {
        self.state
            .read()
            .windows
            .iter()
            .map(|entry| entry.id.clone())
            .collect()
    }

    /// A snapshot of every registered window, oldest first.
    pub fn entries(&self) -> Vec<RegisteredWindow> {
        self.state.read().windows.clone()
    }

    /// Windows showing the same content URL, oldest first.
    pub fn similar_windows(&self, url: &str) -> Vec<Arc<dyn PlatformWindow>> {
        self.state
            .read()
            .windows
            .iter()
            .filter(|entry| entry.url == url)
            .map(|entry| Arc::clone(&entry.window))
            .collect()
    }

    /// The number the next main window without an explicit id will get.
    pub fn next_window_id(&self) -> u32 {
        self.state.read().next_window_id
    }

    /// Hand out a main-window number.
    ///
    /// An explicit nonzero `requested` number is used as is; zero takes the
    /// next number like no request at all. The counter never moves backwards
    /// while windows are open.
    pub fn allocate_window_id(&self, requested: Option<u32>) -> u32 {
        let mut state = self.state.write();
        let id = requested
            .filter(|&id| id != 0)
            .unwrap_or(state.next_window_id);
        state.next_window_id = state.next_window_id.max(id.saturating_add(1));
        id
    }
}

impl std::fmt::Debug for WindowRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("WindowRegistry")
            .field("windows", &state.windows)
            .field("next_window_id", &state.next_window_id)
            .finish()
    }
}
