//! The hosting container contract.
//!
//! sysctx does not implement a container. It consumes one through the
//! `Host` trait: named startup parameters, real-path resolution of logical
//! resource paths, and an attribute namespace shared by the whole
//! application.
//!
//! # Examples
//!
//! ```
//! use std::path::PathBuf;
//! use sysctx_core::traits::Host;
//! use sysctx_core::types::AttributeStore;
//!
//! struct FixedHost {
//!     attributes: AttributeStore,
//! }
//!
//! impl Host for FixedHost {
//!     fn name(&self) -> &str {
//!         "fixed"
//!     }
//!
//!     fn init_parameter(&self, _name: &str) -> Option<String> {
//!         None
//!     }
//!
//!     fn real_path(&self, path: &str) -> Option<PathBuf> {
//!         Some(PathBuf::from("/srv/app").join(path.trim_start_matches('/')))
//!     }
//!
//!     fn attributes(&self) -> &AttributeStore {
//!         &self.attributes
//!     }
//! }
//!
//! let host = FixedHost { attributes: AttributeStore::new() };
//! assert_eq!(
//!     host.real_path("/WEB-INF/sysconfig.cfg"),
//!     Some(PathBuf::from("/srv/app/WEB-INF/sysconfig.cfg"))
//! );
//! ```

use std::path::{Path, PathBuf};

use crate::types::AttributeStore;

/// A hosting container.
pub trait Host: Send + Sync {
    /// Display name of the hosted application, used in log messages.
    fn name(&self) -> &str;

    /// Get a named startup parameter.
    fn init_parameter(&self, name: &str) -> Option<String>;

    /// Map a logical resource path to a filesystem path.
    ///
    /// Returns `None` when the host cannot map the path at all. A mapped
    /// path does not have to exist.
    fn real_path(&self, path: &str) -> Option<PathBuf>;

    /// The host-wide attribute namespace.
    fn attributes(&self) -> &AttributeStore;
}

/// A resolved resource location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    location: String,
    path: Option<PathBuf>,
}

impl Resource {
    /// Create a resource for `location`, resolved to `path` if the loader
    /// could map it.
    pub fn new(location: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self {
            location: location.into(),
            path,
        }
    }

    /// The logical location that was requested.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// The filesystem path, if the location could be mapped.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Check whether the resource exists on disk.
    pub fn exists(&self) -> bool {
        self.path.as_deref().is_some_and(Path::exists)
    }
}

/// Resolves logical locations into resources.
pub trait ResourceLoader: Send + Sync {
    /// Resolve a location. Never fails; use `Resource::exists` to check
    /// the outcome.
    fn resolve(&self, location: &str) -> Resource;
}
