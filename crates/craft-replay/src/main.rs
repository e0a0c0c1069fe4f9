//! Replay recorded bridge messages without a web view.
//!
//! Reads one raw message per line (JSON or a toolkit object description),
//! routes each through a bridge with the default handlers and prints the
//! resulting script evaluations and queued UI-thread ops.

use std::{
    fs,
    io::{self, Read},
    path::Path,
    process::ExitCode,
    time::Duration,
};

use clap::Parser;
use craft_bridge::BridgeConfig;
use tokio::runtime::Runtime;
use tracing::info;

mod cli;
mod error;
mod replay;

use cli::Cli;
use error::{Error, Result};
use replay::Replay;

/// Message text from `path`, or stdin for `-`.
fn read_input(path: &Path) -> Result<String> {
    let read = if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).map(|_| buf)
    } else {
        fs::read_to_string(path)
    };
    read.map_err(|source| Error::Input {
        path: path.to_path_buf(),
        source,
    })
}

/// Execute one replay run.
fn run(cli: &Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => BridgeConfig::load(path)?,
        None => BridgeConfig::default(),
    };
    let runtime = Runtime::new()?;
    let replay = Replay::new(config, runtime.handle().clone());
    if let Some(path) = &cli.sidebar {
        let json = fs::read_to_string(path).map_err(|source| Error::Input {
            path: path.clone(),
            source,
        })?;
        let sections = replay.bridge().load_sidebar(&json)?;
        info!(sections, "sidebar loaded");
    }
    let input = read_input(&cli.file)?;
    let mut out = io::stdout().lock();
    let routed = replay.run(&input, Duration::from_millis(cli.settle_ms), &mut out)?;
    info!(routed, "replay finished");
    Ok(())
}

/// Parse arguments, set up logging and replay.
fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(&cli.log);
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("craft-replay: {e}");
            ExitCode::FAILURE
        }
    }
}
