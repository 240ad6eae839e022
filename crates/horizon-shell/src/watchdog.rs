//! Idle-shutdown watchdog.
//!
//! The host process stays alive while any window is open, any hosted page is
//! still running, or a background subsystem reports work in progress. Once
//! all of that has been quiet for the settle delay, the watchdog terminates
//! the process. Any activity in between restarts the quiet period.

use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use horizon_shell_core::TimerHost;
use horizon_shell_core::logging::targets;

use crate::platform::{BusySignal, HostProcess};
use crate::window::WindowRegistry;

/// Result of one watchdog evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WatchdogVerdict {
    /// Something still needs the process; the quiet period was reset.
    Busy,
    /// Idle, but not for long enough yet. A re-evaluation is scheduled.
    Settling,
    /// The process was asked to terminate.
    Terminated,
}

#[derive(Debug, Default)]
struct WatchdogState {
    /// When the process was first seen idle in the current quiet period.
    can_close_since: Option<Instant>,
    terminated: bool,
}

struct WatchdogInner {
    busy: Arc<dyn BusySignal>,
    host: Arc<dyn HostProcess>,
    registry: Arc<WindowRegistry>,
    timers: Arc<dyn TimerHost>,
    settle_delay: Duration,
    state: Mutex<WatchdogState>,
}

/// Debounced decision of when the host process may terminate.
///
/// Cloning yields another handle to the same watchdog.
#[derive(Clone)]
pub struct ShutdownWatchdog {
    inner: Arc<WatchdogInner>,
}

impl ShutdownWatchdog {
    pub fn new(
        busy: Arc<dyn BusySignal>,
        host: Arc<dyn HostProcess>,
        registry: Arc<WindowRegistry>,
        timers: Arc<dyn TimerHost>,
        settle_delay: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(WatchdogInner {
                busy,
                host,
                registry,
                timers,
                settle_delay,
                state: Mutex::new(WatchdogState::default()),
            }),
        }
    }

    /// Check whether the process may terminate now.
    ///
    /// Call this whenever the set of windows may have become empty or a
    /// background subsystem may have gone idle. Termination is requested at
    /// most once.
    #[tracing::instrument(skip(self), target = "horizon_shell::watchdog", level = "trace")]
    pub fn evaluate(&self) -> WatchdogVerdict {
        let inner = &self.inner;
        if inner.state.lock().terminated {
            return WatchdogVerdict::Terminated;
        }

        if inner.busy.is_busy() {
            return self.reset();
        }

        // Registered windows count as closing while their content is going
        // away; any other registered window keeps the process alive.
        let mut closing = false;
        for entry in inner.registry.entries() {
            if !entry.window.content().is_closing() {
                return self.reset();
            }
            closing = true;
        }

        for view in inner.host.views() {
            if view.background {
                continue;
            }
            if !view.closing {
                return self.reset();
            }
            closing = true;
        }

        let now = inner.timers.now();
        let settling = {
            let mut state = inner.state.lock();
            match state.can_close_since {
                None => {
                    state.can_close_since = Some(now);
                    true
                }
                Some(since) => closing || now.saturating_duration_since(since) < inner.settle_delay,
            }
        };

        if settling {
            tracing::debug!(
                target: targets::WATCHDOG,
                closing,
                delay_ms = inner.settle_delay.as_millis() as u64,
                "idle, waiting before termination"
            );
            self.schedule_recheck();
            return WatchdogVerdict::Settling;
        }

        inner.state.lock().terminated = true;
        tracing::info!(target: targets::WATCHDOG, "process idle, terminating");
        inner.host.terminate();
        WatchdogVerdict::Terminated
    }

    /// When the current quiet period started, if the process is idle.
    pub fn can_close_since(&self) -> Option<Instant> {
        self.inner.state.lock().can_close_since
    }

    pub fn is_terminated(&self) -> bool {
        self.inner.state.lock().terminated
    }

    pub fn settle_delay(&self) -> Duration {
        self.inner.settle_delay
    }

    fn reset(&self) -> WatchdogVerdict {
        let previous = self.inner.state.lock().can_close_since.take();
        if previous.is_some() {
            tracing::debug!(target: targets::WATCHDOG, "activity resumed, quiet period reset");
        }
        WatchdogVerdict::Busy
    }

    fn schedule_recheck(&self) {
        let weak: Weak<WatchdogInner> = Arc::downgrade(&self.inner);
        self.inner.timers.start_one_shot(
            self.inner.settle_delay,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    ShutdownWatchdog { inner }.evaluate();
                }
            }),
        );
    }
}

impl std::fmt::Debug for ShutdownWatchdog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("ShutdownWatchdog")
            .field("settle_delay", &self.inner.settle_delay)
            .field("can_close_since", &state.can_close_since)
            .field("terminated", &state.terminated)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::ViewStatus;
    use horizon_shell_core::ManualTimers;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct Host {
        views: Mutex<Vec<ViewStatus>>,
        terminations: AtomicUsize,
    }

    impl HostProcess for Host {
        fn views(&self) -> Vec<ViewStatus> {
            self.views.lock().clone()
        }

        fn terminate(&self) {
            self.terminations.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Fixture {
        timers: Arc<ManualTimers>,
        host: Arc<Host>,
        busy: Arc<AtomicBool>,
        watchdog: ShutdownWatchdog,
    }

    fn fixture() -> Fixture {
        let timers = Arc::new(ManualTimers::new());
        let host = Arc::new(Host::default());
        let busy = Arc::new(AtomicBool::new(false));
        let flag = busy.clone();
        let watchdog = ShutdownWatchdog::new(
            Arc::new(move || flag.load(Ordering::SeqCst)),
            host.clone(),
            Arc::new(WindowRegistry::new()),
            timers.clone(),
            Duration::from_secs(5),
        );
        Fixture {
            timers,
            host,
            busy,
            watchdog,
        }
    }

    #[test]
    fn test_terminates_after_quiet_period() {
        let f = fixture();
        assert_eq!(f.watchdog.evaluate(), WatchdogVerdict::Settling);
        assert!(f.watchdog.can_close_since().is_some());

        f.timers.advance(Duration::from_millis(4999));
        assert_eq!(f.host.terminations.load(Ordering::SeqCst), 0);

        f.timers.advance(Duration::from_millis(1));
        assert_eq!(f.host.terminations.load(Ordering::SeqCst), 1);
        assert!(f.watchdog.is_terminated());
    }

    #[test]
    fn test_busy_signal_resets_clock() {
        let f = fixture();
        f.watchdog.evaluate();
        f.busy.store(true, Ordering::SeqCst);
        assert_eq!(f.watchdog.evaluate(), WatchdogVerdict::Busy);
        assert_eq!(f.watchdog.can_close_since(), None);
    }

    #[test]
    fn test_open_view_keeps_process_alive() {
        let f = fixture();
        f.host.views.lock().push(ViewStatus::page());
        assert_eq!(f.watchdog.evaluate(), WatchdogVerdict::Busy);
        f.timers.advance(Duration::from_secs(60));
        assert_eq!(f.host.terminations.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_closing_view_delays_termination() {
        let f = fixture();
        f.host.views.lock().push(ViewStatus::closing_page());
        assert_eq!(f.watchdog.evaluate(), WatchdogVerdict::Settling);

        // Still closing after the delay: keep waiting.
        f.timers.advance(Duration::from_secs(5));
        assert_eq!(f.host.terminations.load(Ordering::SeqCst), 0);

        f.host.views.lock().clear();
        f.timers.advance(Duration::from_secs(5));
        assert_eq!(f.host.terminations.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_shell_page_is_ignored() {
        let f = fixture();
        f.host.views.lock().push(ViewStatus::shell_page());
        assert_eq!(f.watchdog.evaluate(), WatchdogVerdict::Settling);

        f.timers.advance(Duration::from_secs(5));
        assert_eq!(f.host.terminations.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_terminates_once() {
        let f = fixture();
        f.watchdog.evaluate();
        f.watchdog.evaluate();
        f.timers.advance(Duration::from_secs(10));
        assert_eq!(f.watchdog.evaluate(), WatchdogVerdict::Terminated);
        assert_eq!(f.host.terminations.load(Ordering::SeqCst), 1);
    }
}
