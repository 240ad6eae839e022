//! In-process implementations of the storage and desktop services.
//!
//! Both answer synchronously, from inside the call. They back headless
//! embedders and the test suite.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use horizon_shell_core::logging::targets;

use super::{DesktopService, PersistenceService, PlatformWindow, StoreCallback};

/// A [`PersistenceService`] holding everything in memory.
///
/// `get_all` returns pairs in key order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a key without going through a callback.
    pub fn value(&self, key: &str) -> Option<Value> {
        self.entries.read().get(key).cloned()
    }

    /// All stored keys in order.
    pub fn keys(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl PersistenceService for MemoryStore {
    fn get(&self, key: &str, callback: StoreCallback<Option<Value>>) {
        let value = self.value(key);
        callback(Ok(value));
    }

    fn get_all(&self, callback: StoreCallback<Vec<(String, Value)>>) {
        let pairs: Vec<(String, Value)> = self
            .entries
            .read()
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        callback(Ok(pairs));
    }

    fn set(&self, key: &str, value: Value) {
        tracing::trace!(target: targets::PERSISTENCE, key, "store set");
        self.entries.write().insert(key.to_owned(), value);
    }

    fn remove(&self, key: &str) {
        tracing::trace!(target: targets::PERSISTENCE, key, "store remove");
        self.entries.write().remove(key);
    }
}

/// A [`DesktopService`] with a single profile and a single desktop.
///
/// Visiting a desktop is a no-op that completes immediately.
#[derive(Debug, Clone)]
pub struct LocalDesktop {
    profile: String,
}

impl LocalDesktop {
    pub fn new(profile: impl Into<String>) -> Self {
        Self {
            profile: profile.into(),
        }
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }
}

impl Default for LocalDesktop {
    fn default() -> Self {
        Self::new("default")
    }
}

impl DesktopService for LocalDesktop {
    fn current_profile(&self, callback: Box<dyn FnOnce(String) + Send>) {
        callback(self.profile.clone());
    }

    fn visit_desktop(
        &self,
        _window: &Arc<dyn PlatformWindow>,
        _profile_id: &str,
        callback: Box<dyn FnOnce() + Send>,
    ) {
        callback();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;

    #[test]
    fn test_get_set_remove() {
        let store = MemoryStore::new();
        store.set("a", json!(1));

        let seen = Arc::new(Mutex::new(None));
        let slot = seen.clone();
        store.get("a", Box::new(move |result| *slot.lock() = Some(result)));
        assert_eq!(seen.lock().take(), Some(Ok(Some(json!(1)))));

        store.remove("a");
        let slot = seen.clone();
        store.get("a", Box::new(move |result| *slot.lock() = Some(result)));
        assert_eq!(seen.lock().take(), Some(Ok(None)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_callback_may_write_back() {
        let store = Arc::new(MemoryStore::new());
        store.set("files#0", json!("{}"));
        store.set("other", json!(true));

        let inner = store.clone();
        store.get_all(Box::new(move |result| {
            for (key, _) in result.unwrap_or_default() {
                if key.starts_with("files#") {
                    inner.remove(&key);
                }
            }
        }));

        assert_eq!(store.keys(), vec!["other".to_owned()]);
    }

    #[test]
    fn test_local_desktop_reports_profile() {
        let desktop = LocalDesktop::new("alice");
        let seen = Arc::new(Mutex::new(String::new()));
        let slot = seen.clone();
        desktop.current_profile(Box::new(move |profile| *slot.lock() = profile));
        assert_eq!(*seen.lock(), "alice");
    }
}
