//! # sysctx core
//!
//! `sysctx_core` provides the building blocks shared by the sysctx runtime:
//! the error hierarchy, typed identifiers, the property-file model, layered
//! configuration views and the contract a hosting container must satisfy.
//!
//! ## Crate Structure
//!
//! - **error**: Error types for all sysctx components
//! - **id**: Strongly-typed identifier types
//! - **traits**: The host and resource-loading contracts
//! - **types**: Properties, configurations, attributes, controller states
//! - **utils**: Small helpers

pub mod error;
pub mod id;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export key types and traits for convenience
pub use error::{Error, Result};
pub use id::ContextId;
pub use traits::{Host, Resource, ResourceLoader};
pub use types::{
    Attribute, AttributeStore, CombinedConfiguration, ConfigSource, Configuration,
    ControllerState, Properties, StartupFailure,
};
