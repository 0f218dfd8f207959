//! Host-backed resource loading.

use std::sync::Arc;

use sysctx_core::traits::{Host, Resource, ResourceLoader};
use tracing::trace;

/// Resolves locations through [`Host::real_path`].
///
/// A location the host cannot map resolves to a resource without a path,
/// which never exists and is skipped by configuration loading.
pub struct HostResourceLoader {
    host: Arc<dyn Host>,
}

impl HostResourceLoader {
    /// Create a loader over `host`.
    pub fn new(host: Arc<dyn Host>) -> Self {
        Self { host }
    }
}

impl ResourceLoader for HostResourceLoader {
    fn resolve(&self, location: &str) -> Resource {
        let path = self.host.real_path(location);
        if path.is_none() {
            trace!(location = %location, host = %self.host.name(), "Host cannot map location");
        }
        Resource::new(location, path)
    }
}
