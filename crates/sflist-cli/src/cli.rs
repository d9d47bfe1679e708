//! CLI argument parsing using clap.

use clap::ArgGroup;
use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sflist")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Decode a recents list and print the resolved paths
    Read(ReadArgs),
    /// Decode a recents list and record the paths in the local store
    Sync(SyncArgs),
    /// List tracked paths, pinned first, then by recency
    Recent(RecentArgs),
    /// Pin a tracked path so it sorts first
    Pin(PinArgs),
    /// Unpin a tracked path
    Unpin(PinArgs),
    /// Delete all tracked paths
    Clear(ClearArgs),
    /// Watch a recents list and re-sync on every change
    Watch(WatchArgs),
    /// Generate shell completions
    Completion(CompletionArgs),
}

#[derive(clap::Args)]
#[command(group(ArgGroup::new("source").required(true).args(["file", "app"])))]
pub struct ReadArgs {
    /// Path to the recents-list file
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Application bundle id; resolves the standard recents location
    #[arg(long, value_name = "BUNDLE_ID")]
    pub app: Option<String>,

    /// Restrict the decode allow-list to the bare recents schema
    #[arg(long)]
    pub minimal: bool,
}

#[derive(clap::Args)]
#[command(group(ArgGroup::new("source").required(true).args(["file", "app"])))]
pub struct SyncArgs {
    /// Path to the recents-list file
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Application bundle id; resolves the standard recents location
    #[arg(long, value_name = "BUNDLE_ID")]
    pub app: Option<String>,

    /// Record store database (default: ~/.sflist/records.db)
    #[arg(long, value_name = "DB")]
    pub store: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct RecentArgs {
    /// Record store database (default: ~/.sflist/records.db)
    #[arg(long, value_name = "DB")]
    pub store: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct PinArgs {
    /// Tracked path to pin or unpin
    #[arg(value_name = "PATH")]
    pub path: String,

    /// Record store database (default: ~/.sflist/records.db)
    #[arg(long, value_name = "DB")]
    pub store: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct ClearArgs {
    /// Record store database (default: ~/.sflist/records.db)
    #[arg(long, value_name = "DB")]
    pub store: Option<PathBuf>,

    /// Confirm deletion of all records
    #[arg(long)]
    pub yes: bool,
}

#[derive(clap::Args)]
#[command(group(ArgGroup::new("source").required(true).args(["file", "app"])))]
pub struct WatchArgs {
    /// Path to the recents-list file
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Application bundle id; resolves the standard recents location
    #[arg(long, value_name = "BUNDLE_ID")]
    pub app: Option<String>,

    /// Record store database (default: ~/.sflist/records.db)
    #[arg(long, value_name = "DB")]
    pub store: Option<PathBuf>,

    /// Poll interval in seconds
    #[arg(long, default_value = "2", value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: u64,
}

#[derive(clap::Args)]
pub struct CompletionArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}
