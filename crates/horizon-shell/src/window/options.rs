//! Window creation options.
//!
//! [`CreateOptions`] is the template a wrapper hands to the platform window
//! service. The wrapper clones it for every launch and only ever overrides the
//! bounds, with the geometry hint read from persistence.

use serde::{Deserialize, Serialize};

use super::geometry::{Bounds, ScreenArea};

/// Minimum width of a main window.
pub const MAIN_WINDOW_MIN_WIDTH: u32 = 320;
/// Minimum height of a main window.
pub const MAIN_WINDOW_MIN_HEIGHT: u32 = 240;

/// Audio player panel width. The panel is not resizable below this.
pub const AUDIO_PLAYER_WIDTH: u32 = 292;
/// Audio player panel height.
pub const AUDIO_PLAYER_HEIGHT: u32 = 117;

/// Window frame decoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FrameStyle {
    /// Platform title bar and borders.
    #[default]
    Chrome,
    /// No frame; the content draws its own chrome.
    None,
}

/// Kind of top-level window to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WindowKind {
    /// Regular application window.
    #[default]
    Shell,
    /// Small floating panel (media players).
    Panel,
}

/// Options passed to the platform when a window is created.
///
/// # Example
///
/// ```
/// use horizon_shell::window::{Bounds, CreateOptions, FrameStyle};
///
/// let options = CreateOptions::new()
///     .with_frame(FrameStyle::None)
///     .with_min_size(320, 240)
///     .with_bounds(Bounds::new(0, 0, 800, 600));
///
/// assert_eq!(options.min_size(), (Some(320), Some(240)));
/// assert!(!options.is_hidden());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateOptions {
    /// Initial outer bounds.
    #[serde(skip_serializing_if = "Option::is_none")]
    bounds: Option<Bounds>,
    /// Initial size when no bounds are given.
    #[serde(skip_serializing_if = "Option::is_none")]
    width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_height: Option<u32>,
    frame: FrameStyle,
    #[serde(rename = "type")]
    kind: WindowKind,
    /// Created hidden; the content shows itself once painted.
    hidden: bool,
    transparent_background: bool,
}

impl CreateOptions {
    /// Options for a visible, framed shell window with no size hints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Default options of a main window on a screen of the given size.
    ///
    /// The window is inset by 10% of the available area on each axis and
    /// covers 80% of it. It is frameless, hidden until its content is ready,
    /// and has a transparent background.
    pub fn main_window(area: ScreenArea) -> Self {
        let scale = |value: i32, factor: f64| (f64::from(value) * factor).round() as i32;
        Self::new()
            .with_bounds(Bounds::new(
                scale(area.width, 0.1),
                scale(area.height, 0.1),
                scale(area.width, 0.8),
                scale(area.height, 0.8),
            ))
            .with_min_size(MAIN_WINDOW_MIN_WIDTH, MAIN_WINDOW_MIN_HEIGHT)
            .with_frame(FrameStyle::None)
            .with_hidden(true)
            .with_transparent_background(true)
    }

    /// Default options of the audio player panel.
    pub fn audio_player() -> Self {
        Self::new()
            .with_kind(WindowKind::Panel)
            .with_hidden(true)
            .with_min_size(AUDIO_PLAYER_WIDTH, AUDIO_PLAYER_HEIGHT)
            .with_size(AUDIO_PLAYER_WIDTH, AUDIO_PLAYER_HEIGHT)
    }

    /// Default options of the video player window.
    pub fn video_player() -> Self {
        Self::new().with_hidden(true)
    }

    /// Set the initial outer bounds.
    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Set the initial size used when no bounds are given.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Set the minimum size.
    pub fn with_min_size(mut self, width: u32, height: u32) -> Self {
        self.min_width = Some(width);
        self.min_height = Some(height);
        self
    }

    /// Set the frame style.
    pub fn with_frame(mut self, frame: FrameStyle) -> Self {
        self.frame = frame;
        self
    }

    /// Set the window kind.
    pub fn with_kind(mut self, kind: WindowKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set whether the window is created hidden.
    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Set whether the window background is transparent.
    pub fn with_transparent_background(mut self, transparent: bool) -> Self {
        self.transparent_background = transparent;
        self
    }

    /// Initial outer bounds, if any.
    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    /// Initial size as `(width, height)`.
    pub fn size(&self) -> (Option<u32>, Option<u32>) {
        (self.width, self.height)
    }

    /// Minimum size as `(width, height)`.
    pub fn min_size(&self) -> (Option<u32>, Option<u32>) {
        (self.min_width, self.min_height)
    }

    pub fn frame(&self) -> FrameStyle {
        self.frame
    }

    pub fn kind(&self) -> WindowKind {
        self.kind
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn has_transparent_background(&self) -> bool {
        self.transparent_background
    }
}
