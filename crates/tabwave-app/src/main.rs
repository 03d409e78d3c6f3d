//! Headless Tabwave front end.
//!
//! Reads one command per line from stdin, drives the shell, and prints the
//! result as one line of JSON on stdout. Logs go to stderr.

mod driver;

use anyhow::Context;
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tabwave_common::{init_logging, LogConfig, LogFormat};
use tabwave_core::{config::default_data_dir, ShellConfig, StorageBackend};
use tabwave_shell::BrowserShell;
use tracing::{error, info};

use crate::driver::{Driver, Reply};

#[derive(Parser, Debug)]
#[command(name = "tabwave")]
#[command(about = "Drive the Tabwave browser shell from stdin")]
struct Args {
    /// Directory holding config.json and saved state
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Storage backend: memory, json or sqlite
    #[arg(long)]
    backend: Option<StorageBackend>,

    /// Log output format: pretty, compact or json
    #[arg(long, default_value = "compact")]
    log: LogFormat,

    /// Enable debug logging
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_config = if args.verbose {
        LogConfig::debug()
    } else {
        LogConfig::default()
    };
    init_logging(log_config.with_format(args.log)).context("failed to initialize logging")?;

    let data_dir = args.data_dir.unwrap_or_else(default_data_dir);
    let mut config = ShellConfig::load(&ShellConfig::with_data_dir(data_dir).config_path());
    if let Some(backend) = args.backend {
        config.backend = backend;
    }
    config.validate().context("invalid configuration")?;

    info!(
        data_dir = %config.data_dir.display(),
        backend = config.backend.as_str(),
        "Starting Tabwave"
    );

    let shell = BrowserShell::open(&config).context("failed to open storage")?;
    let mut driver = Driver::new(shell);

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read stdin")?;
        if line.trim().is_empty() {
            continue;
        }

        let output = match driver.handle(&line) {
            Ok(Reply::Quit) => break,
            Ok(Reply::Json(value)) => value,
            Err(err) => {
                error!("{:#}", err);
                serde_json::json!({ "error": format!("{:#}", err) })
            }
        };
        writeln!(stdout, "{}", output)?;
        stdout.flush()?;
    }

    info!("Shutting down");
    Ok(())
}
