//! Core data types for the sysctx system context.
//!
//! This module defines the data structures shared by the runtime: parsed
//! property sources, the combined configuration view, controller states and
//! the attribute namespace a host exposes.

pub mod attribute;
pub mod configuration;
pub mod properties;
pub mod state;

pub use attribute::{Attribute, AttributeStore, StartupFailure};
pub use configuration::{CombinedConfiguration, Configuration};
pub use properties::{ConfigSource, Properties};
pub use state::ControllerState;
