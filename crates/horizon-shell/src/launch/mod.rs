//! Launch requests and their resolution.
//!
//! A [`LaunchRequest`] names the state a main window should show and how
//! strongly an existing window should be preferred over a new one. The
//! [`LaunchCoordinator`] resolves requests one at a time:
//!
//! ```ignore
//! use horizon_shell::launch::{AppState, LaunchRequest, LaunchType};
//!
//! let request = LaunchRequest::new()
//!     .with_app_state(AppState::new().with_current_directory("filesystem:/Downloads"))
//!     .with_launch_type(LaunchType::FocusSameOrCreate);
//!
//! coordinator.launch_window(request, |result| match result {
//!     Ok(id) => println!("showing {id}"),
//!     Err(err) => eprintln!("{err}"),
//! });
//! ```

mod app_state;
mod coordinator;
mod request;

pub use app_state::AppState;
pub use coordinator::LaunchCoordinator;
pub use request::{LaunchRequest, LaunchType};
