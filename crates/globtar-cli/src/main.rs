//! globtar - build tar and tar.gz archives from glob patterns.

mod cli;
mod commands;
mod error;
mod output;
mod progress;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    let stdout_reserved = matches!(&cli.command, cli::Commands::Create(args) if args.is_stdout());
    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet, stdout_reserved);

    match &cli.command {
        cli::Commands::Create(args) => {
            commands::create::execute(args, &*formatter, cli.quiet, cli.json)
        }
        cli::Commands::Match(args) => commands::matches::execute(args, &*formatter),
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` overrides the flag-derived level.
fn init_logging(verbose: bool, quiet: bool) {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
