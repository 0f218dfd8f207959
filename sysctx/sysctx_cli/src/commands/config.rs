//! Configuration commands
//!
//! `show-config`, `check` and `get` all boot a system context, read from it
//! and shut it down again.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use serde_json::json;

use super::host::{HostArgs, Session};

/// Arguments for the show-config command
#[derive(Args, Debug)]
pub struct ShowConfigArgs {
    #[clap(flatten)]
    pub host: HostArgs,

    /// Print the configuration as a JSON object
    #[clap(long)]
    pub json: bool,

    /// Annotate each key with the file that supplied it
    #[clap(long)]
    pub origins: bool,
}

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    #[clap(flatten)]
    pub host: HostArgs,

    /// Print the report as JSON
    #[clap(long)]
    pub json: bool,
}

/// Arguments for the get command
#[derive(Args, Debug)]
pub struct GetArgs {
    /// The configuration key
    pub key: String,

    #[clap(flatten)]
    pub host: HostArgs,
}

#[derive(Debug, Serialize)]
struct CheckReport {
    host: String,
    context: String,
    sources: Vec<String>,
    keys: usize,
    controller: String,
}

/// Implementation of the show-config command
pub fn execute_show_config(args: &ShowConfigArgs) -> Result<ExitCode> {
    let session = Session::open(&args.host)?;
    let config = session.context().config()?;

    if args.json {
        let output = if args.origins {
            let entries: serde_json::Map<String, serde_json::Value> = config
                .as_properties()
                .iter()
                .map(|(key, value)| {
                    let origin = config
                        .source_of(key)
                        .map(|path| path.display().to_string());
                    (key.to_string(), json!({ "value": value, "origin": origin }))
                })
                .collect();
            serde_json::to_string_pretty(&entries)?
        } else {
            serde_json::to_string_pretty(config.as_properties())?
        };
        println!("{output}");
    } else {
        for (key, value) in config.as_properties().iter() {
            match config.source_of(key).filter(|_| args.origins) {
                Some(origin) => println!("{key}={value}  # {}", origin.display()),
                None => println!("{key}={value}"),
            }
        }
    }

    session.close()?;
    Ok(ExitCode::SUCCESS)
}

/// Implementation of the check command
pub fn execute_check(args: &CheckArgs) -> Result<ExitCode> {
    let session = Session::open(&args.host)?;
    let context = session.context();
    let config = context.config()?;

    let report = CheckReport {
        host: session.host().name().to_string(),
        context: context.id().to_string(),
        sources: config
            .sources()
            .iter()
            .filter_map(|source| source.origin())
            .map(|path| path.display().to_string())
            .collect(),
        keys: config.len(),
        controller: context.controller()?.type_name().to_string(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Host: {}", report.host);
        println!("Context: {}", report.context);
        println!("Configuration sources: {}", report.sources.len());
        for source in &report.sources {
            println!("  {source}");
        }
        println!("Keys: {}", report.keys);
        println!("Controller: {}", report.controller);
        println!("OK");
    }

    session.close()?;
    Ok(ExitCode::SUCCESS)
}

/// Implementation of the get command
pub fn execute_get(args: &GetArgs) -> Result<ExitCode> {
    let session = Session::open(&args.host)?;
    let value = session
        .context()
        .config()?
        .get(&args.key)
        .map(String::from);
    session.close()?;

    match value {
        Some(value) => {
            println!("{value}");
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!("Key not found: {}", args.key);
            Ok(ExitCode::from(1))
        }
    }
}
