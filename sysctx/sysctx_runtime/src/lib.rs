//! sysctx runtime
//!
//! This crate bootstraps a process-wide system context from a hosting
//! container: it resolves and merges the configured property files, builds
//! the pluggable lifecycle controller, and publishes the context into the
//! host's attribute namespace where the rest of the application finds it.
//!
//! ```text
//! SystemInitializer::context_initialized(host)
//!     → SystemContext::with_factory(host, factory)
//!     → registry::set_context(root slot)
//!     → StartupHooks (resource loader, config)
//!     → controller.init() → controller.start()
//!
//! SystemContext::config()      (lazy, once)
//!     → config::resolve_sources (skip missing files)
//!     → config::load_configuration (first-listed source wins)
//!
//! SystemContext::controller()  (lazy, once)
//!     → ControllerFactory::create (by identifier, bound to the context)
//! ```

pub mod config;
pub mod controller;
pub mod host;
pub mod registry;
pub mod system;

pub use controller::{ControllerFactory, DefaultController, LifecycleController};
pub use host::{DirectoryHost, HostDescriptor};
pub use system::{SystemContext, SystemInitializer};
