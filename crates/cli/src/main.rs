//! layoutspec CLI - Main Entry Point
//!
//! Runs layout spec suites against rendered pages and reports one result per
//! spec section.
//!
//! Exit codes: 0 when every test passed, 1 when a test failed, 2 when the
//! command itself could not run.

use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{check_spec, run, suite};

/// layoutspec - layout checks for web pages
#[derive(Parser)]
#[command(name = "layoutspec")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one suite declared with flags
    Run(run::RunArgs),

    /// Run suites from a TOML suite file or directory
    Suite(suite::SuiteArgs),

    /// Parse a spec and list its sections
    CheckSpec(check_spec::CheckSpecArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Run(args) => run::execute(args, cli.format).await,
        Commands::Suite(args) => suite::execute(args, cli.format).await,
        Commands::CheckSpec(args) => check_spec::execute(args, cli.format),
    };

    match result {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            std::process::exit(2);
        }
    }
}
