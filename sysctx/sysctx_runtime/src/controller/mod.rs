//! Lifecycle controllers.
//!
//! A lifecycle controller is the pluggable object a system context drives
//! through `init → start` at startup and `stop` at shutdown. Controllers
//! are created by identifier through the [`ControllerFactory`] and hold a
//! weak back-reference to the context that owns them.

pub mod default;
pub mod factory;

use std::any::Any;
use std::sync::{Arc, Weak};

use once_cell::sync::OnceCell;
use sysctx_core::error::{ControllerError, Result};

use crate::system::SystemContext;

pub use default::DefaultController;
pub use factory::{default_controller_name, ControllerFactory, CONTROLLER_CLASS_PARAM};

/// A pluggable lifecycle controller.
pub trait LifecycleController: Send + Sync {
    /// Bind the controller to its owning context. Succeeds once; any later
    /// call fails with `ControllerError::AlreadyBound`.
    fn bind(&self, context: Weak<SystemContext>) -> Result<()>;

    /// The owning context, if bound and still alive.
    fn context(&self) -> Option<Arc<SystemContext>>;

    /// Initialize the controller.
    fn init(&self) -> Result<()>;

    /// Start the controller. Only valid after `init`.
    fn start(&self) -> Result<()>;

    /// Stop the controller.
    fn stop(&self) -> Result<()>;

    /// Access to the concrete type, for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Fully-qualified type name of the controller.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// A write-once back-reference from a controller to its context.
///
/// Custom controllers embed this to get the binding rules of
/// [`LifecycleController::bind`] for free.
#[derive(Debug, Default)]
pub struct ContextBinding {
    context: OnceCell<Weak<SystemContext>>,
}

impl ContextBinding {
    /// Create an unbound binding.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the back-reference.
    pub fn bind(&self, context: Weak<SystemContext>) -> Result<()> {
        self.context
            .set(context)
            .map_err(|_| ControllerError::AlreadyBound.into())
    }

    /// Upgrade the back-reference.
    pub fn get(&self) -> Option<Arc<SystemContext>> {
        self.context.get().and_then(Weak::upgrade)
    }

    /// The owning context, or `ControllerError::NotBound`.
    pub fn require(&self) -> Result<Arc<SystemContext>> {
        self.get().ok_or_else(|| ControllerError::NotBound.into())
    }

    /// Check whether `bind` has been called.
    pub fn is_bound(&self) -> bool {
        self.context.get().is_some()
    }
}
