//! The built-in lifecycle controller.

use std::any::Any;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use sysctx_core::error::{LifecycleError, Result};
use sysctx_core::types::ControllerState;
use tracing::{debug, info};

use super::{ContextBinding, LifecycleController};
use crate::system::SystemContext;

/// The controller used when no controller identifier is configured.
///
/// It loads the system configuration during `init`, so a broken
/// configuration aborts startup, and otherwise only tracks its state.
#[derive(Debug, Default)]
pub struct DefaultController {
    binding: ContextBinding,
    state: Mutex<ControllerState>,
}

impl DefaultController {
    /// Create an unbound controller.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current state
    pub fn state(&self) -> ControllerState {
        *self.state.lock()
    }

    fn transition(
        &self,
        action: &'static str,
        allowed: &[ControllerState],
        next: ControllerState,
    ) -> Result<()> {
        let mut state = self.state.lock();
        if !allowed.contains(&*state) {
            return Err(LifecycleError::InvalidTransition {
                action,
                state: *state,
            }
            .into());
        }
        *state = next;
        Ok(())
    }
}

impl LifecycleController for DefaultController {
    fn bind(&self, context: Weak<SystemContext>) -> Result<()> {
        self.binding.bind(context)
    }

    fn context(&self) -> Option<Arc<SystemContext>> {
        self.binding.get()
    }

    fn init(&self) -> Result<()> {
        let context = self.binding.require()?;
        let config = context.config()?;
        self.transition("init", &[ControllerState::Created], ControllerState::Initialized)?;

        debug!(context = %context.id(), keys = config.len(), "Controller initialized");
        Ok(())
    }

    fn start(&self) -> Result<()> {
        self.transition("start", &[ControllerState::Initialized], ControllerState::Running)?;
        info!("System controller started");
        Ok(())
    }

    fn stop(&self) -> Result<()> {
        self.transition(
            "stop",
            &[ControllerState::Initialized, ControllerState::Running],
            ControllerState::Stopped,
        )?;
        info!("System controller stopped");
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
