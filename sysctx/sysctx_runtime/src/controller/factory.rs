//! Controller Factory
//!
//! Maps controller identifiers to zero-argument constructors. The built-in
//! [`DefaultController`] is registered under its fully-qualified type name;
//! applications register their own controllers before the context first
//! asks for one.

use std::any::type_name;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use sysctx_core::error::{BoxError, ControllerError, Result};
use sysctx_core::utils::panic_message;
use tracing::{debug, info};

use super::{DefaultController, LifecycleController};
use crate::system::SystemContext;

/// Name of the startup parameter selecting the controller.
pub const CONTROLLER_CLASS_PARAM: &str = "systemControllerClass";

/// A registered controller constructor.
pub type ControllerConstructor = Arc<
    dyn Fn() -> std::result::Result<Box<dyn LifecycleController>, BoxError> + Send + Sync,
>;

/// Identifier of the built-in controller.
pub fn default_controller_name() -> &'static str {
    type_name::<DefaultController>()
}

/// Registry of controller constructors, keyed by identifier.
pub struct ControllerFactory {
    constructors: RwLock<HashMap<String, ControllerConstructor>>,
}

impl Default for ControllerFactory {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ControllerFactory {
    /// Create a factory with no registered controllers.
    pub fn new() -> Self {
        Self {
            constructors: RwLock::new(HashMap::new()),
        }
    }

    /// Create a factory with the built-in controller registered.
    pub fn with_defaults() -> Self {
        let factory = Self::new();
        factory.register::<DefaultController>();
        factory
    }

    /// Register `C` under its fully-qualified type name, constructed with
    /// `Default`.
    pub fn register<C>(&self)
    where
        C: LifecycleController + Default + 'static,
    {
        self.register_fn(type_name::<C>(), || {
            Ok(Box::new(C::default()) as Box<dyn LifecycleController>)
        });
    }

    /// Register a fallible constructor under an arbitrary identifier.
    /// A later registration under the same identifier replaces the earlier one.
    pub fn register_fn<F>(&self, name: impl Into<String>, constructor: F)
    where
        F: Fn() -> std::result::Result<Box<dyn LifecycleController>, BoxError>
            + Send
            + Sync
            + 'static,
    {
        let name = name.into();
        debug!(controller = %name, "Registered controller constructor");
        self.constructors.write().insert(name, Arc::new(constructor));
    }

    /// Check whether an identifier is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.constructors.read().contains_key(name)
    }

    /// The registered identifiers, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.constructors.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Construct an unbound controller.
    ///
    /// A missing or blank `name` selects the built-in controller. Unknown
    /// identifiers, constructor errors and constructor panics are all
    /// reported as `ControllerError::Instantiation` naming the identifier.
    pub fn instantiate(&self, name: Option<&str>) -> Result<Arc<dyn LifecycleController>> {
        let name = name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| default_controller_name());

        let constructor = self.constructors.read().get(name).cloned();
        let constructor = constructor
            .ok_or_else(|| instantiation_failed(name, ControllerError::Unknown(name.to_string())))?;

        // The lock is released before running third-party code.
        let controller = panic::catch_unwind(AssertUnwindSafe(|| constructor()))
            .map_err(|payload| {
                instantiation_failed(
                    name,
                    ControllerError::ConstructorPanicked(panic_message(&*payload)),
                )
            })?
            .map_err(|source| ControllerError::Instantiation {
                name: name.to_string(),
                source,
            })?;

        info!(controller = %name, "Instantiated system controller");
        Ok(Arc::from(controller))
    }

    /// Construct a controller and bind it to `context`.
    pub fn create(
        &self,
        name: Option<&str>,
        context: Weak<SystemContext>,
    ) -> Result<Arc<dyn LifecycleController>> {
        let controller = self.instantiate(name)?;
        controller.bind(context)?;
        Ok(controller)
    }
}

fn instantiation_failed(name: &str, cause: ControllerError) -> ControllerError {
    ControllerError::Instantiation {
        name: name.to_string(),
        source: Box::new(cause),
    }
}
