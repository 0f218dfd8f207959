//! System context and startup orchestration.

pub mod bootstrap;
pub mod context;
pub mod resource;

pub use bootstrap::{NoHooks, StartupHooks, SystemInitializer};
pub use context::SystemContext;
pub use resource::HostResourceLoader;
