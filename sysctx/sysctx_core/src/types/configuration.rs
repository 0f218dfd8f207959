//! Layered configuration views.
//!
//! A `Configuration` is the read-only result of loading the configured
//! sources. It is either a single source returned as-is (possibly the empty
//! substitute used when nothing resolved), or a `CombinedConfiguration`
//! built with override precedence: for a key defined by several sources,
//! the value of the first-listed source wins.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::types::properties::{ConfigSource, Properties};

/// The merged view over an ordered list of sources.
///
/// Layers are stored in precedence order: index 0 has the highest priority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinedConfiguration {
    layers: Vec<ConfigSource>,
    merged: Properties,
    provenance: BTreeMap<String, usize>,
}

impl CombinedConfiguration {
    /// Merge `layers`, highest precedence first.
    ///
    /// Layers are walked in listed order and a key is only taken from a
    /// layer when no earlier layer defined it.
    pub fn new(layers: Vec<ConfigSource>) -> Self {
        let mut merged = Properties::new();
        let mut provenance = BTreeMap::new();

        for (index, layer) in layers.iter().enumerate() {
            for (key, value) in layer.properties().iter() {
                if merged.contains_key(key) {
                    continue;
                }
                merged.insert(key, value);
                provenance.insert(key.to_string(), index);
            }
        }

        Self {
            layers,
            merged,
            provenance,
        }
    }

    /// Get the winning value for a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.merged.get(key)
    }

    /// The layers, highest precedence first.
    pub fn layers(&self) -> &[ConfigSource] {
        &self.layers
    }

    /// The layer that supplied the value for `key`.
    pub fn layer_of(&self, key: &str) -> Option<&ConfigSource> {
        self.provenance
            .get(key)
            .and_then(|index| self.layers.get(*index))
    }

    /// The flattened key/value view.
    pub fn merged(&self) -> &Properties {
        &self.merged
    }
}

/// A loaded system configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Configuration {
    /// A single source, unwrapped. Empty when no source resolved.
    Source(ConfigSource),

    /// Two or more sources merged with override precedence.
    Combined(CombinedConfiguration),
}

impl Default for Configuration {
    fn default() -> Self {
        Self::empty()
    }
}

impl Configuration {
    /// An empty configuration.
    pub fn empty() -> Self {
        Self::Source(ConfigSource::default())
    }

    /// All entries visible through this configuration.
    pub fn as_properties(&self) -> &Properties {
        match self {
            Self::Source(source) => source.properties(),
            Self::Combined(combined) => combined.merged(),
        }
    }

    /// The sources behind this configuration, highest precedence first.
    ///
    /// The empty configuration reports its single in-memory source.
    pub fn sources(&self) -> &[ConfigSource] {
        match self {
            Self::Source(source) => std::slice::from_ref(source),
            Self::Combined(combined) => combined.layers(),
        }
    }

    /// The file that supplied the value for `key`.
    pub fn source_of(&self, key: &str) -> Option<&Path> {
        match self {
            Self::Source(source) if source.properties().contains_key(key) => source.origin(),
            Self::Source(_) => None,
            Self::Combined(combined) => combined.layer_of(key).and_then(ConfigSource::origin),
        }
    }

    /// Get a value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.as_properties().get(key)
    }

    /// Get a value, or `default` when the key is missing.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Get a value converted with `FromStr`.
    ///
    /// # Returns
    ///
    /// * `Ok(None)` - The key is missing.
    /// * `Ok(Some(value))` - The key exists and its trimmed value parsed.
    /// * `Err(ConfigError::InvalidValue)` - The value did not parse.
    pub fn get_parsed<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        let Some(raw) = self.get(key) else {
            return Ok(None);
        };
        raw.trim()
            .parse::<T>()
            .map(Some)
            .map_err(|err| ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw.to_string(),
                message: err.to_string(),
            })
    }

    /// Get a boolean. Accepts `true/false`, `yes/no` and `on/off`, ignoring case.
    pub fn get_bool(&self, key: &str) -> Result<Option<bool>, ConfigError> {
        let Some(raw) = self.get(key) else {
            return Ok(None);
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" => Ok(Some(true)),
            "false" | "no" | "off" => Ok(Some(false)),
            _ => Err(ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw.to_string(),
                message: "expected a boolean".to_string(),
            }),
        }
    }

    /// Get a comma-separated list. Items are trimmed and blanks dropped;
    /// a missing key gives an empty list.
    pub fn get_list(&self, key: &str) -> Vec<String> {
        self.get(key)
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Check whether a key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.as_properties().contains_key(key)
    }

    /// Iterate over the keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.as_properties().keys()
    }

    /// Number of visible keys.
    pub fn len(&self) -> usize {
        self.as_properties().len()
    }

    /// Check whether no keys are visible.
    pub fn is_empty(&self) -> bool {
        self.as_properties().is_empty()
    }
}
