//! Launch requests.

use serde::{Deserialize, Serialize};

use super::app_state::AppState;

/// How a launch request is resolved against the windows already open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LaunchType {
    /// Always open a new window.
    #[default]
    AlwaysCreate,
    /// Focus a window showing the same directory (and selection, if one is
    /// requested), otherwise open a new one.
    FocusSameOrCreate,
    /// Like `FocusSameOrCreate`, but fall back to any existing main window
    /// before opening a new one.
    FocusAnyOrCreate,
}

impl LaunchType {
    /// Whether a window showing the requested directory may be reused.
    pub fn reuses_same_target(self) -> bool {
        matches!(self, Self::FocusSameOrCreate | Self::FocusAnyOrCreate)
    }
}

/// A request to show a main window.
///
/// # Example
///
/// ```
/// use horizon_shell::launch::{AppState, LaunchRequest, LaunchType};
///
/// let request = LaunchRequest::new()
///     .with_app_state(AppState::new().with_current_directory("dir"))
///     .with_launch_type(LaunchType::FocusSameOrCreate);
/// assert_eq!(request.id, None);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaunchRequest {
    /// State for the window's content; a new window starts empty without it.
    pub app_state: Option<AppState>,
    /// Window number to reuse, as when relaunching a window after a restart.
    pub id: Option<u32>,
    /// Resolution policy.
    pub launch_type: LaunchType,
}

impl LaunchRequest {
    /// A request that always opens a new, empty window.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_app_state(mut self, app_state: AppState) -> Self {
        self.app_state = Some(app_state);
        self
    }

    pub fn with_id(mut self, id: u32) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_launch_type(mut self, launch_type: LaunchType) -> Self {
        self.launch_type = launch_type;
        self
    }

    /// The profile the resulting window should be shown on, if the request
    /// names one.
    pub fn displayed_id(&self) -> Option<String> {
        self.app_state
            .as_ref()
            .and_then(|state| state.displayed_id.clone())
    }
}
