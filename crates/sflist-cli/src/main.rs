//! Sflist CLI - Command-line utility for decoding and tracking macOS
//! recent-document lists.

mod cli;
mod commands;
mod error;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    init_tracing(cli.verbose);
    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet);

    match &cli.command {
        cli::Commands::Read(args) => commands::read::execute(args, &*formatter),
        cli::Commands::Sync(args) => commands::sync::execute(args, &*formatter),
        cli::Commands::Recent(args) => commands::recent::execute(args, &*formatter),
        cli::Commands::Pin(args) => commands::pin::execute(args, &*formatter, true),
        cli::Commands::Unpin(args) => commands::pin::execute(args, &*formatter, false),
        cli::Commands::Clear(args) => commands::clear::execute(args, &*formatter),
        cli::Commands::Watch(args) => commands::watch::execute(args, &*formatter),
        cli::Commands::Completion(args) => {
            commands::completion::execute(args.shell);
            Ok(())
        }
    }
}

/// Initializes stderr logging; `RUST_LOG` overrides the verbosity flag.
fn init_tracing(verbose: bool) {
    let default = if verbose { "sflist_core=debug,sflist=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
