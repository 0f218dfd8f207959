//! System Bootstrap
//!
//! Drives a system context through startup and shutdown on behalf of the
//! hosting container.
//!
//! Startup constructs the context, registers the host on it, publishes it
//! in the host's root slot, runs the customization hooks, then fetches the
//! controller and calls `init` followed by `start`. If any step returns an
//! error or panics, the failure replaces the context in the root slot, so
//! every later registry lookup fails the same way.
//!
//! Shutdown stops the controller and clears the root slot.
//!
//! No lock is held while hooks and controller methods run, so they may call
//! back into the initializer. Until startup finishes, [`SystemInitializer::context`]
//! reports no running context and a second startup is rejected.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::Mutex;
use sysctx_core::error::{Error, LifecycleError, RegistryError, Result};
use sysctx_core::traits::Host;
use sysctx_core::types::StartupFailure;
use sysctx_core::utils::panic_message;
use tracing::{error, info};

use super::context::SystemContext;
use crate::controller::ControllerFactory;
use crate::registry;

/// Customization points run during startup, after the context is published
/// and before the controller is built.
///
/// All hooks default to doing nothing.
pub trait StartupHooks: Send + Sync {
    /// Install a custom resource loader on the context.
    fn setup_resource_loader(&self, _context: &SystemContext) -> Result<()> {
        Ok(())
    }

    /// Install or pre-load the configuration.
    fn load_config(&self, _context: &SystemContext) -> Result<()> {
        Ok(())
    }

    /// Called once the controller has started.
    fn on_started(&self, _context: &Arc<SystemContext>) -> Result<()> {
        Ok(())
    }
}

/// Hooks that do nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl StartupHooks for NoHooks {}

struct Active {
    host: Arc<dyn Host>,
    context: Arc<SystemContext>,
}

enum Phase {
    Idle,
    Starting,
    Running(Active),
}

/// Starts and stops the system context for one host.
pub struct SystemInitializer<H = NoHooks> {
    hooks: H,
    factory: Arc<ControllerFactory>,
    phase: Mutex<Phase>,
}

impl Default for SystemInitializer<NoHooks> {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemInitializer<NoHooks> {
    /// Create an initializer without hooks.
    pub fn new() -> Self {
        Self::with_hooks(NoHooks)
    }
}

impl<H: StartupHooks> SystemInitializer<H> {
    /// Create an initializer running `hooks` during startup.
    pub fn with_hooks(hooks: H) -> Self {
        Self {
            hooks,
            factory: Arc::new(ControllerFactory::with_defaults()),
            phase: Mutex::new(Phase::Idle),
        }
    }

    /// The controller factory handed to every context this initializer
    /// creates. Register custom controllers here before startup.
    pub fn factory(&self) -> &Arc<ControllerFactory> {
        &self.factory
    }

    /// The running context, if startup succeeded and shutdown has not run.
    pub fn context(&self) -> Option<Arc<SystemContext>> {
        match &*self.phase.lock() {
            Phase::Running(active) => Some(Arc::clone(&active.context)),
            Phase::Idle | Phase::Starting => None,
        }
    }

    /// Start a system context for `host`.
    ///
    /// # Returns
    ///
    /// The started context, also published in the host's root slot. On
    /// failure the root slot holds the recorded failure and the same
    /// failure is returned.
    pub fn context_initialized(&self, host: Arc<dyn Host>) -> Result<Arc<SystemContext>> {
        {
            let mut phase = self.phase.lock();
            if !matches!(*phase, Phase::Idle) {
                return Err(LifecycleError::AlreadyStarted.into());
            }
            *phase = Phase::Starting;
        }

        info!(host = %host.name(), "Initializing system context");

        let err: Error = match panic::catch_unwind(AssertUnwindSafe(|| self.start(&host))) {
            Ok(Ok(context)) => {
                info!(context = %context.id(), host = %host.name(), "System context started");
                *self.phase.lock() = Phase::Running(Active {
                    host: Arc::clone(&host),
                    context: Arc::clone(&context),
                });
                return Ok(context);
            }
            Ok(Err(err)) => {
                error!(host = %host.name(), error = %err, "System context startup failed");
                let err = Arc::new(err);
                registry::record_failure(
                    host.attributes(),
                    registry::root_attribute(),
                    StartupFailure::Error(Arc::clone(&err)),
                );
                Error::Replayed(err)
            }
            Err(payload) => {
                let message = panic_message(&*payload);
                error!(host = %host.name(), panic = %message, "System context startup panicked");
                registry::record_failure(
                    host.attributes(),
                    registry::root_attribute(),
                    StartupFailure::Panic(message.clone()),
                );
                RegistryError::Panicked {
                    attribute: registry::root_attribute().to_string(),
                    message,
                }
                .into()
            }
        };

        *self.phase.lock() = Phase::Idle;
        Err(err)
    }

    /// Stop the running context and clear the root slot.
    ///
    /// The slot is cleared even when the controller fails to stop; the
    /// stop failure is still returned.
    pub fn context_destroyed(&self) -> Result<()> {
        let active = {
            let mut phase = self.phase.lock();
            match std::mem::replace(&mut *phase, Phase::Idle) {
                Phase::Running(active) => active,
                other => {
                    *phase = other;
                    return Err(LifecycleError::NotStarted.into());
                }
            }
        };

        info!(context = %active.context.id(), "Shutting down system context");
        let stopped = active
            .context
            .controller()
            .and_then(|controller| controller.stop());
        registry::set_context(active.host.attributes(), None);

        if let Err(err) = &stopped {
            error!(context = %active.context.id(), error = %err, "System controller failed to stop");
        }
        stopped
    }

    fn start(&self, host: &Arc<dyn Host>) -> Result<Arc<SystemContext>> {
        let context = SystemContext::with_factory(Arc::clone(host), Arc::clone(&self.factory));
        context.register_object(Arc::new(Arc::clone(host)));
        registry::set_context(host.attributes(), Some(Arc::clone(&context)));

        self.hooks.setup_resource_loader(&context)?;
        self.hooks.load_config(&context)?;

        let controller = context.controller()?;
        controller.init()?;
        controller.start()?;

        self.hooks.on_started(&context)?;
        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::DirectoryHost;
    use std::sync::Weak;
    use tempfile::TempDir;

    /// Calls back into its own initializer from every hook.
    struct ReentrantHooks {
        initializer: Weak<SystemInitializer<ReentrantHooks>>,
        observed: Mutex<Vec<String>>,
    }

    impl ReentrantHooks {
        fn observe(&self, hook: &str, context: &SystemContext) {
            let Some(initializer) = self.initializer.upgrade() else {
                return;
            };
            let running = initializer.context().is_some();
            let restart = initializer.context_initialized(Arc::clone(context.host()));
            let shutdown = initializer.context_destroyed();
            self.observed.lock().push(format!(
                "{hook}: running={running} restart={} shutdown={}",
                matches!(restart, Err(Error::Lifecycle(LifecycleError::AlreadyStarted))),
                matches!(shutdown, Err(Error::Lifecycle(LifecycleError::NotStarted))),
            ));
        }
    }

    impl StartupHooks for ReentrantHooks {
        fn setup_resource_loader(&self, context: &SystemContext) -> Result<()> {
            self.observe("setup_resource_loader", context);
            Ok(())
        }

        fn on_started(&self, context: &Arc<SystemContext>) -> Result<()> {
            self.observe("on_started", context);
            Ok(())
        }
    }

    fn reentrant_initializer() -> Arc<SystemInitializer<ReentrantHooks>> {
        Arc::new_cyclic(|me| {
            SystemInitializer::with_hooks(ReentrantHooks {
                initializer: me.clone(),
                observed: Mutex::new(Vec::new()),
            })
        })
    }

    #[test]
    fn test_shutdown_without_startup() {
        let initializer = SystemInitializer::new();

        let err = initializer.context_destroyed().unwrap_err();

        assert!(matches!(err, Error::Lifecycle(LifecycleError::NotStarted)));
    }

    #[test]
    fn test_double_startup_rejected() {
        let dir = TempDir::new().unwrap();
        let host: Arc<dyn Host> = Arc::new(DirectoryHost::new(dir.path()));
        let initializer = SystemInitializer::new();

        initializer.context_initialized(Arc::clone(&host)).unwrap();
        let err = initializer.context_initialized(host).unwrap_err();

        assert!(matches!(err, Error::Lifecycle(LifecycleError::AlreadyStarted)));
        initializer.context_destroyed().unwrap();
    }

    #[test]
    fn test_hooks_can_call_back_into_initializer() {
        let dir = TempDir::new().unwrap();
        let host: Arc<dyn Host> = Arc::new(DirectoryHost::new(dir.path()));
        let initializer = reentrant_initializer();

        let context = initializer.context_initialized(host).unwrap();

        assert_eq!(
            *initializer.hooks.observed.lock(),
            vec![
                "setup_resource_loader: running=false restart=true shutdown=true".to_string(),
                "on_started: running=false restart=true shutdown=true".to_string(),
            ]
        );
        assert!(Arc::ptr_eq(&initializer.context().unwrap(), &context));
        initializer.context_destroyed().unwrap();
    }

    #[test]
    fn test_failed_startup_can_be_retried() {
        let dir = TempDir::new().unwrap();
        let host: Arc<dyn Host> = Arc::new(
            DirectoryHost::new(dir.path())
                .with_init_parameter(crate::controller::CONTROLLER_CLASS_PARAM, "com.example.Missing"),
        );
        let initializer = SystemInitializer::new();

        initializer.context_initialized(host).unwrap_err();
        assert!(initializer.context().is_none());

        let host: Arc<dyn Host> = Arc::new(DirectoryHost::new(dir.path()));
        initializer.context_initialized(host).unwrap();
        assert!(initializer.context().is_some());
        initializer.context_destroyed().unwrap();
    }

    #[test]
    fn test_host_registered_on_context() {
        let dir = TempDir::new().unwrap();
        let host: Arc<dyn Host> = Arc::new(DirectoryHost::new(dir.path()).with_name("shop"));
        let initializer = SystemInitializer::new();

        let context = initializer.context_initialized(host).unwrap();
        let registered = context.object::<Arc<dyn Host>>().unwrap();

        assert_eq!(registered.name(), "shop");
        initializer.context_destroyed().unwrap();
        assert!(initializer.context().is_none());
    }
}
