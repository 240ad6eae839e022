//! In-memory platform fakes shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;
use serde_json::Value;

use horizon_shell::platform::{
    ContentEnvironment, ContentWindow, CreateCallback, DesktopService, ExitEntry, HostProcess,
    MemoryStore, PersistenceService, PlatformError, PlatformServices, PlatformWindow, ViewStatus,
    WindowService,
};
use horizon_shell::window::{Bounds, CreateOptions, ScreenArea};
use horizon_shell::{Shell, ShellConfig, ShellContext};
use horizon_shell_core::{ManualTimers, Signal};

/// Install a test-writer subscriber honoring `RUST_LOG`. Safe to call from
/// every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub struct FakeContent {
    environment: Mutex<ContentEnvironment>,
    pub focused: Mutex<Result<bool, PlatformError>>,
    pub supports_reload: AtomicBool,
    pub closing: AtomicBool,
    pub reloads: AtomicUsize,
    pub unloads: AtomicUsize,
    pub exit_entries: Mutex<Vec<ExitEntry>>,
}

impl Default for FakeContent {
    fn default() -> Self {
        Self {
            environment: Mutex::new(ContentEnvironment::default()),
            focused: Mutex::new(Ok(false)),
            supports_reload: AtomicBool::new(true),
            closing: AtomicBool::new(false),
            reloads: AtomicUsize::new(0),
            unloads: AtomicUsize::new(0),
            exit_entries: Mutex::new(Vec::new()),
        }
    }
}

impl FakeContent {
    pub fn set_focused(&self, focused: Result<bool, PlatformError>) {
        *self.focused.lock() = focused;
    }

    pub fn environment_snapshot(&self) -> ContentEnvironment {
        self.environment.lock().clone()
    }

    pub fn reload_count(&self) -> usize {
        self.reloads.load(Ordering::SeqCst)
    }
}

impl ContentWindow for FakeContent {
    fn environment(&self) -> ContentEnvironment {
        self.environment.lock().clone()
    }

    fn set_environment(&self, environment: ContentEnvironment) {
        *self.environment.lock() = environment;
    }

    fn reload(&self) -> bool {
        if !self.supports_reload.load(Ordering::SeqCst) {
            return false;
        }
        self.reloads.fetch_add(1, Ordering::SeqCst);
        true
    }

    fn unload(&self) {
        self.unloads.fetch_add(1, Ordering::SeqCst);
    }

    fn save_on_exit(&self) -> Vec<ExitEntry> {
        self.exit_entries.lock().clone()
    }

    fn is_focused(&self) -> Result<bool, PlatformError> {
        self.focused.lock().clone()
    }

    fn is_closing(&self) -> bool {
        self.closing.load(Ordering::SeqCst)
    }
}

pub struct FakeWindow {
    pub url: String,
    pub options: CreateOptions,
    bounds: Mutex<Bounds>,
    pub maximized: AtomicBool,
    pub minimized: AtomicBool,
    /// When set, `restore` waits for the test to call `finish_restore`.
    pub defer_restore: AtomicBool,
    pub restores: AtomicUsize,
    pub focuses: AtomicUsize,
    pub icon: Mutex<Option<String>>,
    pub content: Arc<FakeContent>,
    bounds_changed: Signal<Bounds>,
    closed: Signal<()>,
    restored: Signal<()>,
}

impl FakeWindow {
    pub fn new(url: &str, options: &CreateOptions, bounds: Bounds) -> Self {
        Self {
            url: url.to_owned(),
            options: options.clone(),
            bounds: Mutex::new(bounds),
            maximized: AtomicBool::new(false),
            minimized: AtomicBool::new(false),
            defer_restore: AtomicBool::new(false),
            restores: AtomicUsize::new(0),
            focuses: AtomicUsize::new(0),
            icon: Mutex::new(None),
            content: Arc::new(FakeContent::default()),
            bounds_changed: Signal::new(),
            closed: Signal::new(),
            restored: Signal::new(),
        }
    }

    /// Simulate the user moving or resizing the window.
    pub fn resize_to(&self, bounds: Bounds) {
        *self.bounds.lock() = bounds;
        self.bounds_changed.emit(bounds);
    }

    /// Simulate the user closing the window.
    pub fn close(&self) {
        self.closed.emit(());
    }

    pub fn finish_restore(&self) {
        self.restored.emit(());
    }

    pub fn focus_count(&self) -> usize {
        self.focuses.load(Ordering::SeqCst)
    }

    pub fn bounds_listeners(&self) -> usize {
        self.bounds_changed.connection_count()
    }
}

impl PlatformWindow for FakeWindow {
    fn bounds(&self) -> Bounds {
        *self.bounds.lock()
    }

    fn move_to(&self, left: i32, top: i32) {
        let mut bounds = self.bounds.lock();
        *bounds = bounds.moved_to(left, top);
    }

    fn is_maximized(&self) -> bool {
        self.maximized.load(Ordering::SeqCst)
    }

    fn is_minimized(&self) -> bool {
        self.minimized.load(Ordering::SeqCst)
    }

    fn restore(&self) {
        self.restores.fetch_add(1, Ordering::SeqCst);
        self.maximized.store(false, Ordering::SeqCst);
        self.minimized.store(false, Ordering::SeqCst);
        if !self.defer_restore.load(Ordering::SeqCst) {
            self.restored.emit(());
        }
    }

    fn focus(&self) {
        self.focuses.fetch_add(1, Ordering::SeqCst);
        self.minimized.store(false, Ordering::SeqCst);
    }

    fn set_icon(&self, path: &str) {
        *self.icon.lock() = Some(path.to_owned());
    }

    fn content(&self) -> Arc<dyn ContentWindow> {
        self.content.clone()
    }

    fn bounds_changed(&self) -> &Signal<Bounds> {
        &self.bounds_changed
    }

    fn closed(&self) -> &Signal<()> {
        &self.closed
    }

    fn restored(&self) -> &Signal<()> {
        &self.restored
    }
}

struct PendingCreate {
    url: String,
    options: CreateOptions,
    callback: CreateCallback,
}

/// Window service that records every window it creates.
///
/// Creation completes inside `create` unless `defer` is set, in which case
/// requests wait for `complete_next` or `fail_next`.
pub struct FakeWindowService {
    pub area: ScreenArea,
    pub defer: AtomicBool,
    pub fail: AtomicBool,
    pending: Mutex<VecDeque<PendingCreate>>,
    created: Mutex<Vec<Arc<FakeWindow>>>,
}

impl Default for FakeWindowService {
    fn default() -> Self {
        Self {
            area: ScreenArea::new(1000, 800),
            defer: AtomicBool::new(false),
            fail: AtomicBool::new(false),
            pending: Mutex::new(VecDeque::new()),
            created: Mutex::new(Vec::new()),
        }
    }
}

impl FakeWindowService {
    pub fn created(&self) -> Vec<Arc<FakeWindow>> {
        self.created.lock().clone()
    }

    pub fn created_count(&self) -> usize {
        self.created.lock().len()
    }

    pub fn last(&self) -> Arc<FakeWindow> {
        self.created
            .lock()
            .last()
            .cloned()
            .expect("no window was created")
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// Complete the oldest deferred creation successfully.
    pub fn complete_next(&self) -> Arc<FakeWindow> {
        let request = self
            .pending
            .lock()
            .pop_front()
            .expect("no pending creation");
        let window = self.build(&request.url, &request.options);
        (request.callback)(Ok(window.clone()));
        window
    }

    /// Fail the oldest deferred creation.
    pub fn fail_next(&self) {
        let request = self
            .pending
            .lock()
            .pop_front()
            .expect("no pending creation");
        (request.callback)(Err(PlatformError::Failed("refused".into())));
    }

    fn build(&self, url: &str, options: &CreateOptions) -> Arc<FakeWindow> {
        let bounds = options.bounds().unwrap_or_else(|| {
            let (width, height) = options.size();
            Bounds::new(0, 0, width.unwrap_or(800) as i32, height.unwrap_or(600) as i32)
        });
        let window = Arc::new(FakeWindow::new(url, options, bounds));
        self.created.lock().push(window.clone());
        window
    }
}

impl WindowService for FakeWindowService {
    fn create(&self, url: &str, options: &CreateOptions, callback: CreateCallback) {
        if self.fail.load(Ordering::SeqCst) {
            callback(Err(PlatformError::Failed("refused".into())));
            return;
        }
        if self.defer.load(Ordering::SeqCst) {
            self.pending.lock().push_back(PendingCreate {
                url: url.to_owned(),
                options: options.clone(),
                callback,
            });
            return;
        }
        let window = self.build(url, options);
        callback(Ok(window));
    }

    fn available_area(&self) -> ScreenArea {
        self.area
    }
}

/// Desktop service that records which profile each visit went to.
#[derive(Default)]
pub struct FakeDesktop {
    pub visits: Mutex<Vec<String>>,
}

impl FakeDesktop {
    pub const CURRENT_PROFILE: &'static str = "me@example.com";

    pub fn visits(&self) -> Vec<String> {
        self.visits.lock().clone()
    }
}

impl DesktopService for FakeDesktop {
    fn current_profile(&self, callback: Box<dyn FnOnce(String) + Send>) {
        callback(Self::CURRENT_PROFILE.to_owned());
    }

    fn visit_desktop(
        &self,
        _window: &Arc<dyn PlatformWindow>,
        profile_id: &str,
        callback: Box<dyn FnOnce() + Send>,
    ) {
        self.visits.lock().push(profile_id.to_owned());
        callback();
    }
}

#[derive(Default)]
pub struct FakeHost {
    pub views: Mutex<Vec<ViewStatus>>,
    pub terminations: AtomicUsize,
}

impl FakeHost {
    pub fn termination_count(&self) -> usize {
        self.terminations.load(Ordering::SeqCst)
    }
}

impl HostProcess for FakeHost {
    fn views(&self) -> Vec<ViewStatus> {
        self.views.lock().clone()
    }

    fn terminate(&self) {
        self.terminations.fetch_add(1, Ordering::SeqCst);
    }
}

/// One set of fakes wired into platform services.
pub struct Harness {
    pub windows: Arc<FakeWindowService>,
    pub store: Arc<MemoryStore>,
    pub desktop: Arc<FakeDesktop>,
    pub host: Arc<FakeHost>,
    pub busy: Arc<AtomicBool>,
    pub timers: Arc<ManualTimers>,
}

impl Harness {
    pub fn new() -> Self {
        init_tracing();
        Self {
            windows: Arc::new(FakeWindowService::default()),
            store: Arc::new(MemoryStore::new()),
            desktop: Arc::new(FakeDesktop::default()),
            host: Arc::new(FakeHost::default()),
            busy: Arc::new(AtomicBool::new(false)),
            timers: Arc::new(ManualTimers::new()),
        }
    }

    pub fn services(&self) -> PlatformServices {
        let busy = self.busy.clone();
        PlatformServices {
            windows: self.windows.clone(),
            store: self.store.clone(),
            desktop: self.desktop.clone(),
            host: self.host.clone(),
            busy: Arc::new(move || busy.load(Ordering::SeqCst)),
            timers: self.timers.clone(),
        }
    }

    pub fn context(&self) -> ShellContext {
        ShellContext::new(self.services(), ShellConfig::default())
    }

    pub fn shell(&self) -> Shell {
        self.shell_with(ShellConfig::default())
    }

    pub fn shell_with(&self, config: ShellConfig) -> Shell {
        Shell::new(self.services(), config).expect("default id prefix is valid")
    }

    pub fn set_busy(&self, busy: bool) {
        self.busy.store(busy, Ordering::SeqCst);
    }

    pub fn stored(&self, key: &str) -> Option<Value> {
        self.store.value(key)
    }

    pub fn put(&self, key: &str, value: Value) {
        self.store.set(key, value);
    }
}

/// Collects callback results for later inspection.
pub struct Recorder<T> {
    values: Arc<Mutex<Vec<T>>>,
}

impl<T> Clone for Recorder<T> {
    fn clone(&self) -> Self {
        Self {
            values: self.values.clone(),
        }
    }
}

impl<T: Send + 'static> Recorder<T> {
    pub fn new() -> Self {
        Self {
            values: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A callback that appends its argument.
    pub fn callback(&self) -> impl FnOnce(T) + Send + 'static {
        let values = self.values.clone();
        move |value| values.lock().push(value)
    }

    pub fn len(&self) -> usize {
        self.values.lock().len()
    }

    pub fn take(&self) -> Vec<T> {
        std::mem::take(&mut *self.values.lock())
    }
}
