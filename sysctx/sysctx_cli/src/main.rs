mod commands;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::config::{execute_check, execute_get, execute_show_config};
use commands::config::{CheckArgs, GetArgs, ShowConfigArgs};

/// sysctx Command Line Interface
///
/// Boots a system context over a directory host and inspects its
/// configuration.
#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    /// Log filter used when RUST_LOG is not set
    #[clap(long, global = true, default_value = "warn")]
    log_level: String,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the merged configuration
    #[clap(name = "show-config")]
    ShowConfig(ShowConfigArgs),

    /// Start and stop the context, reporting what was loaded
    Check(CheckArgs),

    /// Print a single configuration value
    Get(GetArgs),
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Print an error and its causes, skipping causes already contained in
/// the message above them.
fn report(err: &anyhow::Error) {
    eprintln!("Error: {err}");
    let mut previous = err.to_string();
    for cause in err.chain().skip(1) {
        let message = cause.to_string();
        if !previous.contains(&message) {
            eprintln!("  Caused by: {message}");
        }
        previous = message;
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let result = match &cli.command {
        Commands::ShowConfig(args) => execute_show_config(args),
        Commands::Check(args) => execute_check(args),
        Commands::Get(args) => execute_get(args),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            report(&err);
            ExitCode::from(2)
        }
    }
}
