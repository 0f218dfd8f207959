//! Directory Host
//!
//! A `Host` backed by a document root on the local filesystem. Used by the
//! command-line tool and by tests; embedders with a real container
//! implement `Host` themselves.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use sysctx_core::error::{HostError, Result};
use sysctx_core::traits::Host;
use sysctx_core::types::AttributeStore;
use tracing::{debug, info};

/// Host descriptor, usually read from a TOML file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HostDescriptor {
    /// Display name of the application
    #[serde(default = "default_host_name")]
    pub name: String,

    /// Document root; relative paths are resolved against the descriptor's
    /// directory
    #[serde(default)]
    pub document_root: Option<PathBuf>,

    /// Startup parameters
    #[serde(default)]
    pub init_params: BTreeMap<String, String>,
}

fn default_host_name() -> String {
    "sysctx".to_string()
}

impl Default for HostDescriptor {
    fn default() -> Self {
        Self {
            name: default_host_name(),
            document_root: None,
            init_params: BTreeMap::new(),
        }
    }
}

impl HostDescriptor {
    /// Load a descriptor from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading host descriptor from {}", path.display());

        let content = fs::read_to_string(path).map_err(|source| HostError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let mut descriptor = Self::parse(&content)?;

        if let (Some(root), Some(base)) = (&descriptor.document_root, path.parent()) {
            if root.is_relative() {
                descriptor.document_root = Some(base.join(root));
            }
        }

        Ok(descriptor)
    }

    /// Parse and validate descriptor text.
    pub fn parse(content: &str) -> Result<Self> {
        let descriptor: Self =
            toml::from_str(content).map_err(|err| HostError::Parse(err.to_string()))?;
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Validate the descriptor
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(HostError::Invalid("Host name cannot be empty".to_string()).into());
        }

        if let Some(root) = &self.document_root {
            if root.as_os_str().is_empty() {
                return Err(HostError::Invalid("Document root cannot be empty".to_string()).into());
            }
        }

        if self.init_params.keys().any(|name| name.trim().is_empty()) {
            return Err(
                HostError::Invalid("Startup parameter names cannot be empty".to_string()).into(),
            );
        }

        Ok(())
    }
}

/// A host serving resources from a document root.
#[derive(Debug)]
pub struct DirectoryHost {
    name: String,
    root: PathBuf,
    init_params: BTreeMap<String, String>,
    attributes: AttributeStore,
}

impl DirectoryHost {
    /// Create a host over `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            name: default_host_name(),
            root: root.into(),
            init_params: BTreeMap::new(),
            attributes: AttributeStore::new(),
        }
    }

    /// Create a host from a descriptor. `root` overrides the descriptor's
    /// document root; with neither, the current directory is used.
    pub fn from_descriptor(descriptor: HostDescriptor, root: Option<PathBuf>) -> Self {
        let root = root
            .or(descriptor.document_root)
            .unwrap_or_else(|| PathBuf::from("."));
        debug!(name = %descriptor.name, root = %root.display(), "Creating directory host");

        Self {
            name: descriptor.name,
            root,
            init_params: descriptor.init_params,
            attributes: AttributeStore::new(),
        }
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set a startup parameter.
    pub fn with_init_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_init_parameter(name, value);
        self
    }

    /// Set a startup parameter, replacing any previous value.
    pub fn set_init_parameter(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.init_params.insert(name.into(), value.into());
    }

    /// The document root.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Host for DirectoryHost {
    fn name(&self) -> &str {
        &self.name
    }

    fn init_parameter(&self, name: &str) -> Option<String> {
        self.init_params.get(name).cloned()
    }

    fn real_path(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|component| !matches!(component, Component::Normal(_) | Component::CurDir));
        if escapes {
            return None;
        }
        Some(self.root.join(relative))
    }

    fn attributes(&self) -> &AttributeStore {
        &self.attributes
    }
}
