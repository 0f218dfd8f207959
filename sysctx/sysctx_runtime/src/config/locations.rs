//! Resolution of configuration locations.

use sysctx_core::traits::{Resource, ResourceLoader};
use tracing::{debug, info};

/// Name of the startup parameter listing the configuration files.
pub const CONFIG_LOCATION_PARAM: &str = "systemConfigLocation";

/// Locations used when the startup parameter is not set.
pub const DEFAULT_CONFIG_LOCATIONS: &str = "/WEB-INF/sysconfig.cfg,/WEB-INF/sysconfig.dev.cfg";

const DELIMITERS: &[char] = &[',', ';', ' ', '\t', '\n'];

/// Split a location list on `,`, `;`, space, tab and newline, dropping
/// empty tokens.
pub fn split_locations(param: &str) -> Vec<String> {
    param
        .split(DELIMITERS)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(String::from)
        .collect()
}

/// Resolve the configured locations into existing resources.
///
/// `param` falls back to [`DEFAULT_CONFIG_LOCATIONS`] when `None`. Missing
/// resources are logged and skipped; the result keeps the listed order.
pub fn resolve_sources(param: Option<&str>, loader: &dyn ResourceLoader) -> Vec<Resource> {
    let param = param.unwrap_or(DEFAULT_CONFIG_LOCATIONS);
    let mut resources = Vec::new();

    for location in split_locations(param) {
        let resource = loader.resolve(&location);
        if !resource.exists() {
            match resource.path() {
                Some(path) => info!(location = %location, path = %path.display(), "System configuration file does not exist"),
                None => info!(location = %location, "System configuration file does not exist"),
            }
            continue;
        }
        debug!(location = %location, "Resolved system configuration file");
        resources.push(resource);
    }

    resources
}
