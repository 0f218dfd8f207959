//! Parsing and merging of resolved configuration sources.

use sysctx_core::error::{ConfigError, Result};
use sysctx_core::traits::{Resource, ResourceLoader};
use sysctx_core::types::{CombinedConfiguration, ConfigSource, Configuration, Properties};
use tracing::info;

use super::locations::resolve_sources;

/// Parse every resource and merge the results.
///
/// - no resources: an empty configuration;
/// - one resource: its properties, unwrapped;
/// - several: a `CombinedConfiguration` where the first-listed resource
///   wins on conflicting keys.
///
/// The first resource that fails to read or parse aborts the whole load
/// with `ConfigError::Load` naming that resource.
pub fn load_configuration(resources: &[Resource]) -> Result<Configuration> {
    let mut sources = Vec::with_capacity(resources.len());

    for resource in resources {
        let Some(path) = resource.path() else {
            continue;
        };
        let properties = Properties::load(path).map_err(|source| ConfigError::Load {
            path: path.to_path_buf(),
            source: Box::new(source),
        })?;
        info!(path = %path.display(), keys = properties.len(), "System configuration file loaded");
        sources.push(ConfigSource::new(path, properties));
    }

    if sources.len() > 1 {
        return Ok(Configuration::Combined(CombinedConfiguration::new(sources)));
    }
    match sources.pop() {
        Some(source) => Ok(Configuration::Source(source)),
        None => {
            info!("No system configuration file found");
            Ok(Configuration::empty())
        }
    }
}

/// Resolve `param` (or the default locations) through `loader` and load
/// the result.
pub fn load_from_parameter(param: Option<&str>, loader: &dyn ResourceLoader) -> Result<Configuration> {
    let resources = resolve_sources(param, loader);
    load_configuration(&resources)
}
