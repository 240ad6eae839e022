//! Timer system for Horizon Shell.
//!
//! The orchestrator never sleeps; it asks a [`TimerHost`] to call it back
//! later and reads the current time from the same host. Two hosts are
//! provided:
//!
//! - [`ManualTimers`]: a virtual clock advanced explicitly. Embedders with
//!   their own event loop call [`ManualTimers::advance`] or
//!   [`ManualTimers::process_expired`]; tests use it for deterministic timing.
//! - `TokioTimers` (feature `tokio`): timers backed by `tokio::time`.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a timer.
    pub struct TimerId;
}

/// A boxed one-shot timer callback.
pub type TimerCallback = Box<dyn FnOnce() + Send + 'static>;

/// A source of time and one-shot timers.
pub trait TimerHost: Send + Sync {
    /// The current time as seen by this host.
    fn now(&self) -> Instant;

    /// Call `callback` once, after `delay` has elapsed.
    fn start_one_shot(&self, delay: Duration, callback: TimerCallback) -> TimerId;
}

/// An entry in the timer queue (min-heap by fire time, FIFO among equals).
#[derive(Debug, Clone, Copy)]
struct TimerQueueEntry {
    id: TimerId,
    fire_time: Instant,
    sequence: u64,
}

impl PartialEq for TimerQueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.fire_time == other.fire_time && self.sequence == other.sequence
    }
}

impl Eq for TimerQueueEntry {}

impl PartialOrd for TimerQueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerQueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap (BinaryHeap is max-heap by default).
        other
            .fire_time
            .cmp(&self.fire_time)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

struct ManualState {
    /// Current virtual time.
    now: Instant,
    /// Callbacks of timers that have not fired yet.
    timers: SlotMap<TimerId, TimerCallback>,
    /// Priority queue of pending timer fires.
    queue: BinaryHeap<TimerQueueEntry>,
    /// Tie-breaker so timers due at the same instant fire in start order.
    next_sequence: u64,
}

/// A timer host driven by an explicitly advanced virtual clock.
pub struct ManualTimers {
    inner: Mutex<ManualState>,
}

impl ManualTimers {
    /// Create a new manual timer host. The virtual clock starts at the real
    /// current instant and only moves when advanced.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(ManualState {
                now: Instant::now(),
                timers: SlotMap::with_key(),
                queue: BinaryHeap::new(),
                next_sequence: 0,
            }),
        }
    }

    /// Move the virtual clock forward and fire every timer that became due.
    ///
    /// Returns the number of timers fired. Timers started by a firing
    /// callback fire in the same call if they are already due.
    pub fn advance(&self, by: Duration) -> usize {
        {
            let mut state = self.inner.lock();
            state.now += by;
        }
        self.process_expired()
    }

    /// Fire every timer whose deadline is at or before the current virtual time.
    ///
    /// Returns the number of timers fired.
    #[tracing::instrument(skip(self), target = "horizon_shell_core::timer", level = "trace")]
    pub fn process_expired(&self) -> usize {
        let mut fired = 0;
        loop {
            let callback = {
                let mut state = self.inner.lock();
                let now = state.now;
                match state.queue.peek() {
                    Some(entry) if entry.fire_time <= now => {}
                    _ => break,
                }
                let Some(entry) = state.queue.pop() else {
                    break;
                };
                let Some(callback) = state.timers.remove(entry.id) else {
                    continue;
                };
                tracing::trace!(target: targets::TIMER, id = ?entry.id, "timer fired");
                callback
            };
            callback();
            fired += 1;
        }
        fired
    }

    /// Get the duration until the next timer fires, if any.
    pub fn time_until_next(&self) -> Option<Duration> {
        let state = self.inner.lock();
        state
            .queue
            .peek()
            .map(|entry| entry.fire_time.saturating_duration_since(state.now))
    }

    /// Get the number of timers that have not fired yet.
    pub fn active_count(&self) -> usize {
        self.inner.lock().timers.len()
    }
}

impl Default for ManualTimers {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerHost for ManualTimers {
    fn now(&self) -> Instant {
        self.inner.lock().now
    }

    fn start_one_shot(&self, delay: Duration, callback: TimerCallback) -> TimerId {
        let mut state = self.inner.lock();
        let fire_time = state.now + delay;
        let sequence = state.next_sequence;
        state.next_sequence += 1;
        let id = state.timers.insert(callback);
        state.queue.push(TimerQueueEntry {
            id,
            fire_time,
            sequence,
        });
        id
    }
}

impl std::fmt::Debug for ManualTimers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("ManualTimers")
            .field("active", &state.timers.len())
            .finish()
    }
}

#[cfg(feature = "tokio")]
mod tokio_host {
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use parking_lot::Mutex;
    use slotmap::SlotMap;
    use tokio::runtime::Handle;

    use super::{TimerCallback, TimerHost, TimerId};
    use crate::error::{Result, TimerError};
    use crate::logging::targets;

    /// A timer host backed by `tokio::time`.
    ///
    /// Callbacks run on a task spawned onto the runtime the host was created
    /// from.
    pub struct TokioTimers {
        handle: Handle,
        active: Arc<Mutex<SlotMap<TimerId, ()>>>,
    }

    impl TokioTimers {
        /// Create a timer host on the given runtime.
        pub fn new(handle: Handle) -> Self {
            Self {
                handle,
                active: Arc::new(Mutex::new(SlotMap::with_key())),
            }
        }

        /// Create a timer host on the runtime of the calling context.
        ///
        /// # Errors
        ///
        /// Returns [`TimerError::RuntimeUnavailable`] outside a tokio runtime.
        pub fn try_current() -> Result<Self> {
            let handle = Handle::try_current()
                .map_err(|err| TimerError::RuntimeUnavailable(err.to_string()))?;
            Ok(Self::new(handle))
        }

        /// Get the number of timers that have not fired yet.
        pub fn active_count(&self) -> usize {
            self.active.lock().len()
        }
    }

    impl TimerHost for TokioTimers {
        fn now(&self) -> Instant {
            tokio::time::Instant::now().into_std()
        }

        fn start_one_shot(&self, delay: Duration, callback: TimerCallback) -> TimerId {
            let id = self.active.lock().insert(());
            let active = Arc::clone(&self.active);
            self.handle.spawn(async move {
                tokio::time::sleep(delay).await;
                active.lock().remove(id);
                tracing::trace!(target: targets::TIMER, ?id, "timer fired");
                callback();
            });
            id
        }
    }
}

#[cfg(feature = "tokio")]
pub use tokio_host::TokioTimers;
