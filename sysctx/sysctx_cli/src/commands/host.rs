//! Host selection and context sessions
//!
//! Every command boots a system context over a directory host built from
//! the command-line arguments, and shuts it down again when done.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use sysctx_core::traits::Host;
use sysctx_runtime::{DirectoryHost, HostDescriptor, SystemContext, SystemInitializer};
use tracing::debug;

/// Arguments selecting the host
#[derive(Args, Debug, Clone)]
pub struct HostArgs {
    /// Document root of the application
    #[clap(long)]
    pub root: Option<PathBuf>,

    /// Host descriptor file (TOML)
    #[clap(long)]
    pub descriptor: Option<PathBuf>,

    /// Startup parameter, may be repeated
    #[clap(long = "param", value_name = "NAME=VALUE", value_parser = parse_param)]
    pub params: Vec<(String, String)>,
}

/// Parse a `NAME=VALUE` startup parameter.
pub fn parse_param(raw: &str) -> std::result::Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got `{raw}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("parameter name is empty in `{raw}`"));
    }
    Ok((name.to_string(), value.to_string()))
}

/// Build the host described by `args`.
///
/// `--root` overrides the descriptor's document root, and `--param` values
/// override the descriptor's startup parameters.
pub fn build_host(args: &HostArgs) -> Result<DirectoryHost> {
    let descriptor = match &args.descriptor {
        Some(path) => HostDescriptor::load(path)
            .with_context(|| format!("Failed to load host descriptor {}", path.display()))?,
        None => HostDescriptor::default(),
    };

    let mut host = DirectoryHost::from_descriptor(descriptor, args.root.clone());
    for (name, value) in &args.params {
        host.set_init_parameter(name, value);
    }
    Ok(host)
}

/// A started system context.
pub struct Session {
    host: Arc<dyn Host>,
    initializer: SystemInitializer,
    context: Arc<SystemContext>,
}

impl Session {
    /// Boot a context over the host described by `args`.
    pub fn open(args: &HostArgs) -> Result<Self> {
        let host: Arc<dyn Host> = Arc::new(build_host(args)?);
        let initializer = SystemInitializer::new();
        let context = initializer
            .context_initialized(Arc::clone(&host))
            .with_context(|| format!("Failed to start system context for host {}", host.name()))?;
        debug!(context = %context.id(), "Session opened");

        Ok(Self {
            host,
            initializer,
            context,
        })
    }

    /// The hosting container.
    pub fn host(&self) -> &Arc<dyn Host> {
        &self.host
    }

    /// The running context.
    pub fn context(&self) -> &Arc<SystemContext> {
        &self.context
    }

    /// Shut the context down.
    pub fn close(self) -> Result<()> {
        debug!(context = %self.context.id(), "Closing session");
        self.initializer
            .context_destroyed()
            .context("Failed to shut down system context")
    }
}
