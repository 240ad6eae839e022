//! Window geometry persistence.
//!
//! The last observed bounds of a window are stored under a key derived from
//! its content URL, so the next window opened at that URL starts where the
//! previous one was. Records are overwritten on every bounds change and never
//! deleted; a stale record is only a placement hint.
//!
//! ```
//! use horizon_shell::window::{Bounds, geometry_key};
//!
//! let bounds = Bounds::new(10, 20, 640, 480);
//! let record = serde_json::to_value(bounds).unwrap();
//! assert_eq!(record["left"], 10);
//! assert_eq!(geometry_key("main.html"), "windowGeometry:main.html");
//! ```

use serde::{Deserialize, Serialize};

/// Namespace of the persisted geometry records.
pub const GEOMETRY_KEY_PREFIX: &str = "windowGeometry";

/// Build the persistence key of the geometry record for a content URL.
pub fn geometry_key(url: &str) -> String {
    format!("{GEOMETRY_KEY_PREFIX}:{url}")
}

/// Outer bounds of a window in screen pixels.
///
/// Serialized as `{left, top, width, height}`, which is also the layout of
/// the persisted geometry record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Bounds {
    /// X position of the left edge.
    pub left: i32,
    /// Y position of the top edge.
    pub top: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl Bounds {
    /// Create new bounds.
    pub fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// The top-left corner as `(left, top)`.
    pub fn top_left(&self) -> (i32, i32) {
        (self.left, self.top)
    }

    /// The same size moved to a new top-left corner.
    pub fn moved_to(self, left: i32, top: i32) -> Self {
        Self { left, top, ..self }
    }
}

/// Size of the screen area available to windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScreenArea {
    /// Available width in pixels.
    pub width: i32,
    /// Available height in pixels.
    pub height: i32,
}

impl ScreenArea {
    /// Create a new screen area.
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

impl Default for ScreenArea {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}
