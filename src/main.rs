//! env-flatten
//!
//! Command line front end: reads a configuration document, flattens it and
//! writes `KEY=VALUE` lines.

use anyhow::{Result, anyhow};
use clap::Parser;
use env_flatten::cli::{self, Cli};
use env_flatten::config::ConfigPaths;
use std::fs::OpenOptions;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log, cli.verbose)?;

    let mut stdin = std::io::stdin().lock();
    let mut stdout = std::io::stdout().lock();
    cli::run(&cli, ConfigPaths::discover(), &mut stdin, &mut stdout)
}

/// Install the global subscriber for `target`: 0/off, 1/stdout, 2/stderr or a
/// file path opened for append. `RUST_LOG` overrides the `-v` level.
fn init_logging(target: &str, verbose: bool) -> Result<()> {
    let (writer, ansi) = match target {
        "0" | "off" => return Ok(()),
        "1" | "stdout" => (BoxMakeWriter::new(std::io::stdout), true),
        "2" | "stderr" => (BoxMakeWriter::new(std::io::stderr), true),
        filename => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(filename)?;
            (BoxMakeWriter::new(Arc::new(file)), false)
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .try_init()
        .map_err(|e| anyhow!(e))
}
