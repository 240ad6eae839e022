//! Core systems for Horizon Shell.
//!
//! This crate provides the primitives the window orchestrator is built on:
//!
//! - **Task Queue**: Per-owner FIFO that serializes asynchronous steps
//! - **Signals**: Observer connections for platform notifications
//! - **Timers**: One-shot timer hosts with a virtual clock for deterministic tests
//! - **Logging**: Target names and span helpers for `tracing`
//!
//! # Task Queue Example
//!
//! ```
//! use horizon_shell_core::TaskQueue;
//!
//! let queue = TaskQueue::new();
//!
//! // Each step receives a continuation it must call exactly once.
//! queue.run(|done| {
//!     println!("first step");
//!     done.call();
//! });
//!
//! // Queued behind the first step, never interleaved with it.
//! queue.run(|done| {
//!     println!("second step");
//!     done.call();
//! });
//!
//! assert!(!queue.is_busy());
//! ```
//!
//! # Signal Example
//!
//! ```
//! use horizon_shell_core::Signal;
//!
//! let closed = Signal::<()>::new();
//! let id = closed.connect(|_| println!("window closed"));
//! closed.emit(());
//! closed.disconnect(id);
//! ```

mod error;
pub mod logging;
pub mod signal;
mod task;
pub mod timer;

pub use error::{Result, TimerError};
pub use logging::PerfSpan;
pub use signal::{ConnectionId, Signal};
pub use task::{Done, TaskId, TaskQueue};
pub use timer::{ManualTimers, TimerCallback, TimerHost, TimerId};

#[cfg(feature = "tokio")]
pub use timer::TokioTimers;
