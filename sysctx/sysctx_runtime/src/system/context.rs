//! The system context.
//!
//! A `SystemContext` owns the application-wide configuration and the
//! lifecycle controller. Both are built lazily on first access and cached
//! for the life of the context; concurrent first accesses are serialized so
//! every caller sees the same instance.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use sysctx_core::error::{Error, Result};
use sysctx_core::id::ContextId;
use sysctx_core::traits::{Host, ResourceLoader};
use sysctx_core::types::Configuration;
use tracing::{debug, info};

use super::resource::HostResourceLoader;
use crate::config::{load_from_parameter, CONFIG_LOCATION_PARAM};
use crate::controller::{ControllerFactory, LifecycleController, CONTROLLER_CLASS_PARAM};

type Object = Arc<dyn Any + Send + Sync>;

/// The process-wide system context.
pub struct SystemContext {
    id: ContextId,
    host: Arc<dyn Host>,
    factory: Arc<ControllerFactory>,
    self_ref: Weak<SystemContext>,
    config: OnceCell<Configuration>,
    controller: OnceCell<Arc<dyn LifecycleController>>,
    resource_loader: OnceCell<Arc<dyn ResourceLoader>>,
    objects: RwLock<HashMap<TypeId, Object>>,
}

impl SystemContext {
    /// Create a context over `host` using the built-in controller factory.
    pub fn new(host: Arc<dyn Host>) -> Arc<Self> {
        Self::with_factory(host, Arc::new(ControllerFactory::with_defaults()))
    }

    /// Create a context over `host` that builds its controller with `factory`.
    pub fn with_factory(host: Arc<dyn Host>, factory: Arc<ControllerFactory>) -> Arc<Self> {
        let context = Arc::new_cyclic(|self_ref| Self {
            id: ContextId::new(),
            host,
            factory,
            self_ref: self_ref.clone(),
            config: OnceCell::new(),
            controller: OnceCell::new(),
            resource_loader: OnceCell::new(),
            objects: RwLock::new(HashMap::new()),
        });
        debug!(context = %context.id, host = %context.host.name(), "Created system context");
        context
    }

    /// Get the context ID
    pub fn id(&self) -> ContextId {
        self.id
    }

    /// The hosting container.
    pub fn host(&self) -> &Arc<dyn Host> {
        &self.host
    }

    /// The factory used to build the controller.
    pub fn factory(&self) -> &Arc<ControllerFactory> {
        &self.factory
    }

    /// The system configuration.
    ///
    /// Loaded on first call from the files listed in the
    /// `systemConfigLocation` startup parameter (or the default locations)
    /// and cached afterwards, even if the files later change. A failed load
    /// is not cached; the next call tries again.
    pub fn config(&self) -> Result<&Configuration> {
        self.config.get_or_try_init(|| {
            let param = self.host.init_parameter(CONFIG_LOCATION_PARAM);
            let loader = self.resource_loader();
            let config = load_from_parameter(param.as_deref(), loader.as_ref())?;
            info!(
                context = %self.id,
                sources = config.sources().len(),
                keys = config.len(),
                "System configuration initialized"
            );
            Ok(config)
        })
    }

    /// The lifecycle controller, bound to this context.
    ///
    /// Built on first call from the `systemControllerClass` startup
    /// parameter, or the built-in controller when it is not set.
    pub fn controller(&self) -> Result<Arc<dyn LifecycleController>> {
        self.controller
            .get_or_try_init(|| {
                let name = self.host.init_parameter(CONTROLLER_CLASS_PARAM);
                self.factory.create(name.as_deref(), self.self_ref.clone())
            })
            .map(Arc::clone)
    }

    /// The loader used to resolve configuration locations.
    pub fn resource_loader(&self) -> Arc<dyn ResourceLoader> {
        self.resource_loader
            .get_or_init(|| Arc::new(HostResourceLoader::new(Arc::clone(&self.host))))
            .clone()
    }

    /// Replace the default resource loader. Fails once the loader has been
    /// used or installed.
    pub fn install_resource_loader(&self, loader: Arc<dyn ResourceLoader>) -> Result<()> {
        self.resource_loader
            .set(loader)
            .map_err(|_| Error::AlreadyInitialized("resource loader"))
    }

    /// Supply the configuration instead of loading it from files. Fails
    /// once the configuration has been loaded or installed.
    pub fn install_config(&self, config: Configuration) -> Result<()> {
        self.config
            .set(config)
            .map_err(|_| Error::AlreadyInitialized("configuration"))
    }

    /// Supply the controller instead of building it by identifier. The
    /// controller is bound to this context.
    pub fn install_controller(&self, controller: Arc<dyn LifecycleController>) -> Result<()> {
        if self.controller.get().is_some() {
            return Err(Error::AlreadyInitialized("controller"));
        }
        controller.bind(self.self_ref.clone())?;
        self.controller
            .set(controller)
            .map_err(|_| Error::AlreadyInitialized("controller"))
    }

    /// Register an object on the context, keyed by its type. Returns the
    /// object previously registered for that type.
    pub fn register_object<T>(&self, object: Arc<T>) -> Option<Object>
    where
        T: Any + Send + Sync,
    {
        self.objects.write().insert(TypeId::of::<T>(), object)
    }

    /// Look up an object registered with [`register_object`](Self::register_object).
    pub fn object<T>(&self) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        let object = self.objects.read().get(&TypeId::of::<T>()).cloned()?;
        object.downcast::<T>().ok()
    }
}

impl fmt::Debug for SystemContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemContext")
            .field("id", &self.id)
            .field("host", &self.host.name())
            .field("config_loaded", &self.config.get().is_some())
            .field("controller", &self.controller.get().map(|c| c.type_name()))
            .finish()
    }
}
