//! Core trait definitions.
//!
//! These traits describe what sysctx needs from the hosting container:
//! a way to read startup parameters, map logical paths to files, and a
//! shared attribute namespace.

pub mod host;

pub use host::{Host, Resource, ResourceLoader};
