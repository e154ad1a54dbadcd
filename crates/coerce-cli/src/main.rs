//! # coerce CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use coerce_cli::inspect::{run_inspect, run_kinds, InspectArgs};
use coerce_cli::validate::{run_validate, ValidateArgs};

/// Schema-driven parameter validation and coercion.
#[derive(Parser, Debug)]
#[command(name = "coerce", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a JSON parameter file against a schema document.
    Validate(ValidateArgs),

    /// Print the fields of a schema document.
    Inspect(InspectArgs),

    /// List the built-in type kinds.
    Kinds,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Validate(args) => run_validate(&args),
        Commands::Inspect(args) => run_inspect(&args),
        Commands::Kinds => run_kinds(),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
