//! Command-line interface definitions for craft-replay.

use std::path::PathBuf;

use clap::Parser;
use logging::LogArgs;

/// Command-line interface arguments for the craft-replay binary.
#[derive(Parser, Debug)]
#[command(
    name = "craft-replay",
    about = "Route recorded bridge messages and print what script would receive",
    version
)]
pub struct Cli {
    /// Logging controls
    #[command(flatten)]
    pub log: LogArgs,

    /// Bridge configuration file (JSON)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Sidebar configuration file (JSON), loaded after the bridge config
    #[arg(long)]
    pub sidebar: Option<PathBuf>,

    /// How long to keep pumping for asynchronous replies after the last
    /// message, in milliseconds
    #[arg(long, default_value_t = 250)]
    pub settle_ms: u64,

    /// File with one raw message per line; `-` reads stdin
    pub file: PathBuf,
}
