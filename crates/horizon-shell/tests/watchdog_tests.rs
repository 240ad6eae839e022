//! Tests for idle termination driven by window and host activity.

mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;

use horizon_shell::WatchdogVerdict;
use horizon_shell::launch::LaunchRequest;
use horizon_shell::platform::ViewStatus;

use common::Harness;

fn open_window(shell: &horizon_shell::Shell) {
    shell.launch_window(LaunchRequest::new(), |result| {
        result.unwrap();
    });
}

#[test]
fn test_closing_last_window_terminates_after_delay() {
    let h = Harness::new();
    let shell = h.shell();
    open_window(&shell);
    assert!(shell.context().watchdog().can_close_since().is_none());

    h.windows.last().close();
    assert!(shell.context().watchdog().can_close_since().is_some());

    h.timers.advance(Duration::from_millis(4999));
    assert_eq!(h.host.termination_count(), 0);

    h.timers.advance(Duration::from_millis(1));
    assert_eq!(h.host.termination_count(), 1);
    assert!(shell.context().watchdog().is_terminated());
}

#[test]
fn test_busy_period_restarts_quiet_period() {
    let h = Harness::new();
    let shell = h.shell();
    open_window(&shell);
    h.windows.last().close();

    h.timers.advance(Duration::from_secs(2));
    h.set_busy(true);
    assert_eq!(shell.on_sync_completed(), WatchdogVerdict::Busy);
    assert!(shell.context().watchdog().can_close_since().is_none());

    h.timers.advance(Duration::from_millis(500));
    h.set_busy(false);
    assert_eq!(shell.on_sync_completed(), WatchdogVerdict::Settling);

    // The re-check scheduled by the first quiet period finds only 2.5s of quiet.
    h.timers.advance(Duration::from_millis(2500));
    assert_eq!(h.host.termination_count(), 0);

    h.timers.advance(Duration::from_millis(2500));
    assert_eq!(h.host.termination_count(), 1);

    // Later re-checks do not terminate again.
    h.timers.advance(Duration::from_secs(10));
    assert_eq!(h.host.termination_count(), 1);
    assert_eq!(shell.on_sync_completed(), WatchdogVerdict::Terminated);
}

#[test]
fn test_open_window_keeps_process_alive() {
    let h = Harness::new();
    let shell = h.shell();
    open_window(&shell);
    open_window(&shell);

    h.windows.created()[0].close();
    assert_eq!(shell.on_sync_completed(), WatchdogVerdict::Busy);
    h.timers.advance(Duration::from_secs(60));
    assert_eq!(h.host.termination_count(), 0);
}

#[test]
fn test_running_page_keeps_process_alive() {
    let h = Harness::new();
    let shell = h.shell();
    h.host.views.lock().push(ViewStatus::page());

    assert_eq!(shell.on_sync_completed(), WatchdogVerdict::Busy);
    h.timers.advance(Duration::from_secs(60));
    assert_eq!(h.host.termination_count(), 0);

    h.host.views.lock()[0].closing = true;
    assert_eq!(shell.on_sync_completed(), WatchdogVerdict::Settling);
    h.host.views.lock().clear();
    h.timers.advance(Duration::from_secs(5));
    assert_eq!(h.host.termination_count(), 1);
}

#[test]
fn test_window_opened_while_settling_cancels_termination() {
    let h = Harness::new();
    let shell = h.shell();
    open_window(&shell);
    h.windows.last().close();

    h.timers.advance(Duration::from_secs(3));
    open_window(&shell);
    h.timers.advance(Duration::from_secs(30));
    assert_eq!(h.host.termination_count(), 0);
    assert!(shell.context().watchdog().can_close_since().is_none());

    h.windows.last().close();
    h.timers.advance(Duration::from_secs(5));
    assert_eq!(h.host.termination_count(), 1);
}

#[test]
fn test_shell_page_does_not_keep_process_alive() {
    let h = Harness::new();
    let shell = h.shell();
    h.host.views.lock().push(ViewStatus::shell_page());

    assert_eq!(shell.on_sync_completed(), WatchdogVerdict::Settling);
    h.timers.advance(Duration::from_secs(5));
    assert_eq!(h.host.termination_count(), 1);
}

#[test]
fn test_closing_window_delays_termination() {
    let h = Harness::new();
    let shell = h.shell();
    h.host.views.lock().push(ViewStatus::shell_page());
    open_window(&shell);
    let window = h.windows.last();

    assert_eq!(shell.on_sync_completed(), WatchdogVerdict::Busy);

    window.content.closing.store(true, Ordering::SeqCst);
    assert_eq!(shell.on_sync_completed(), WatchdogVerdict::Settling);
    assert!(shell.context().watchdog().can_close_since().is_some());

    // Still registered and closing after the delay: keep waiting.
    h.timers.advance(Duration::from_secs(5));
    assert_eq!(h.host.termination_count(), 0);

    window.close();
    h.timers.advance(Duration::from_secs(5));
    assert_eq!(h.host.termination_count(), 1);
}
