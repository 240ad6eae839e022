//! Application state handed to a window's content.
//!
//! The shell only interprets three fields; everything else a content page
//! stores (playlists, task parameters, view settings) is carried along
//! untouched.
//!
//! Persisted app state is a JSON string holding the serialized object, keyed
//! by the window id. Older records written as a bare object are accepted too.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// State a window's content starts from and persists while it runs.
///
/// # Example
///
/// ```
/// use horizon_shell::launch::AppState;
///
/// let state = AppState::new()
///     .with_current_directory("filesystem:/Downloads")
///     .with_field("position", 3);
///
/// let json = serde_json::to_value(&state).unwrap();
/// assert_eq!(json["currentDirectoryURL"], "filesystem:/Downloads");
/// assert_eq!(json["position"], 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    /// Directory shown by a file-manager window.
    #[serde(
        rename = "currentDirectoryURL",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub current_directory_url: Option<String>,
    /// Entry selected in that directory.
    #[serde(
        rename = "selectionURL",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub selection_url: Option<String>,
    /// Profile whose desktop the window should be shown on.
    #[serde(rename = "displayedId", default, skip_serializing_if = "Option::is_none")]
    pub displayed_id: Option<String>,
    /// Every other field, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AppState {
    /// An empty state.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_current_directory(mut self, url: impl Into<String>) -> Self {
        self.current_directory_url = Some(url.into());
        self
    }

    pub fn with_selection(mut self, url: impl Into<String>) -> Self {
        self.selection_url = Some(url.into());
        self
    }

    pub fn with_displayed_id(mut self, profile_id: impl Into<String>) -> Self {
        self.displayed_id = Some(profile_id.into());
        self
    }

    /// Set a field the shell does not interpret.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Look up a field the shell does not interpret.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Whether a window currently showing `self` satisfies a launch request
    /// for `requested`.
    ///
    /// The directories must be equal (both absent counts as equal). When the
    /// request names a selection, the selections must be equal as well.
    pub fn is_same_target(&self, requested: &AppState) -> bool {
        if self.current_directory_url != requested.current_directory_url {
            return false;
        }
        match &requested.selection_url {
            Some(selection) => self.selection_url.as_deref() == Some(selection.as_str()),
            None => true,
        }
    }

    /// Parse a persisted record.
    ///
    /// `null` and the empty string mean there is nothing to restore.
    ///
    /// # Errors
    ///
    /// Returns the parse error if the record is neither a JSON string holding
    /// an object nor an object.
    pub fn from_persisted(value: &Value) -> Result<Option<Self>, serde_json::Error> {
        match value {
            Value::Null => Ok(None),
            Value::String(text) if text.is_empty() => Ok(None),
            Value::String(text) => serde_json::from_str(text).map(Some),
            other => Self::deserialize(other).map(Some),
        }
    }

    /// Serialize into the persisted record form (a JSON string).
    ///
    /// # Errors
    ///
    /// Returns the serialization error, which only happens if an extra field
    /// holds a value JSON cannot represent.
    pub fn to_persisted(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_string(self).map(Value::String)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_fields_are_preserved() {
        let raw = json!({
            "currentDirectoryURL": "dir",
            "params": {"action": "open"},
            "items": ["a", "b"],
        });
        let state: AppState = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(state.current_directory_url.as_deref(), Some("dir"));
        assert_eq!(state.field("params"), Some(&json!({"action": "open"})));
        assert_eq!(serde_json::to_value(&state).unwrap(), raw);
    }

    #[test]
    fn test_same_target_requires_equal_directory() {
        let open = AppState::new().with_current_directory("a").with_selection("a/x");
        assert!(open.is_same_target(&AppState::new().with_current_directory("a")));
        assert!(!open.is_same_target(&AppState::new().with_current_directory("b")));
        assert!(!open.is_same_target(&AppState::new()));
        assert!(AppState::new().is_same_target(&AppState::new()));
    }

    #[test]
    fn test_same_target_checks_requested_selection() {
        let open = AppState::new().with_current_directory("a").with_selection("a/x");
        let same = AppState::new().with_current_directory("a").with_selection("a/x");
        let other = AppState::new().with_current_directory("a").with_selection("a/y");
        assert!(open.is_same_target(&same));
        assert!(!open.is_same_target(&other));

        let unselected = AppState::new().with_current_directory("a");
        assert!(!unselected.is_same_target(&same));
    }

    #[test]
    fn test_persisted_round_trip() {
        let state = AppState::new()
            .with_current_directory("dir")
            .with_field("position", 2);
        let record = state.to_persisted().unwrap();
        assert!(record.is_string());
        assert_eq!(AppState::from_persisted(&record).unwrap(), Some(state));
    }

    #[test]
    fn test_persisted_object_is_accepted() {
        let record = json!({"selectionURL": "s"});
        let state = AppState::from_persisted(&record).unwrap().unwrap();
        assert_eq!(state.selection_url.as_deref(), Some("s"));
    }

    #[test]
    fn test_persisted_absent_and_corrupt() {
        assert_eq!(AppState::from_persisted(&Value::Null).unwrap(), None);
        assert_eq!(AppState::from_persisted(&json!("")).unwrap(), None);
        assert!(AppState::from_persisted(&json!("{bad json")).is_err());
        assert!(AppState::from_persisted(&json!("42")).is_err());
        assert!(AppState::from_persisted(&json!(7)).is_err());
    }
}
