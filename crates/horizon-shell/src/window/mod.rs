//! Window lifecycle management.
//!
//! # Window Wrappers
//!
//! A [`WindowWrapper`] opens one logical window and tracks it until the
//! platform reports it closed:
//!
//! ```ignore
//! use horizon_shell::window::{CreateOptions, WindowWrapper};
//!
//! let wrapper = WindowWrapper::new(context.clone(), "main.html", "files#0", options);
//! wrapper.launch(AppState::new(), false, |outcome| {
//!     println!("launch finished: {outcome:?}");
//! });
//! ```
//!
//! Singleton wrappers (one window per content URL) reload instead of
//! opening a second window:
//!
//! ```ignore
//! let player = WindowWrapper::singleton(context, "audio_player.html", CreateOptions::audio_player());
//! player.launch(playlist, false, |_| {});
//! player.launch(other_playlist, false, |_| {}); // reloads
//! ```
//!
//! # Registry
//!
//! Every open window is recorded in the [`WindowRegistry`] shared through the
//! [`ShellContext`](crate::ShellContext).

mod geometry;
mod options;
mod placement;
mod registry;
mod wrapper;

pub use geometry::{Bounds, GEOMETRY_KEY_PREFIX, ScreenArea, geometry_key};
pub use options::{
    AUDIO_PLAYER_HEIGHT, AUDIO_PLAYER_WIDTH, CreateOptions, FrameStyle, MAIN_WINDOW_MIN_HEIGHT,
    MAIN_WINDOW_MIN_WIDTH, WindowKind,
};
pub use placement::{SHIFT_DISTANCE, avoid_overlap};
pub use registry::{RegisteredWindow, WindowRegistry};
pub use wrapper::{LaunchOutcome, WindowPhase, WindowWrapper, WrapperKind};
