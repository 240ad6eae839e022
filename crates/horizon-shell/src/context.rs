//! Shared state of one shell instance.

use std::sync::Arc;

use crate::config::ShellConfig;
use crate::platform::PlatformServices;
use crate::watchdog::ShutdownWatchdog;
use crate::window::WindowRegistry;

/// Everything a window wrapper or the launch coordinator needs to reach:
/// the platform services, the window registry, the watchdog and the
/// configuration.
///
/// Cloning is cheap and every clone refers to the same registry and
/// watchdog.
#[derive(Clone)]
pub struct ShellContext {
    services: PlatformServices,
    registry: Arc<WindowRegistry>,
    watchdog: ShutdownWatchdog,
    config: Arc<ShellConfig>,
}

impl ShellContext {
    /// Create a context with an empty registry.
    pub fn new(services: PlatformServices, config: ShellConfig) -> Self {
        let registry = Arc::new(WindowRegistry::new());
        let watchdog = ShutdownWatchdog::new(
            Arc::clone(&services.busy),
            Arc::clone(&services.host),
            Arc::clone(&registry),
            Arc::clone(&services.timers),
            config.settle_delay(),
        );
        Self {
            services,
            registry,
            watchdog,
            config: Arc::new(config),
        }
    }

    pub fn services(&self) -> &PlatformServices {
        &self.services
    }

    pub fn registry(&self) -> &Arc<WindowRegistry> {
        &self.registry
    }

    pub fn watchdog(&self) -> &ShutdownWatchdog {
        &self.watchdog
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }
}

impl std::fmt::Debug for ShellContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShellContext")
            .field("registry", &self.registry)
            .field("watchdog", &self.watchdog)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
