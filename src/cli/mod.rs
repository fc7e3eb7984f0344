//! CLI command definitions for env-flatten
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod flatten;

use crate::config::{ConfigLoader, ConfigPaths};
use anyhow::Result;
use clap::{Parser, Subcommand};
use flatten::FlattenArgs;
use std::io::{Read, Write};
use tracing::debug;

/// Flatten nested JSON/YAML configuration into KEY=VALUE environment lines
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (replaces project and user config)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// The subcommand to run; flattening stdin when none is given.
    pub fn command_or_default(&self) -> Command {
        self.command
            .clone()
            .unwrap_or_else(|| Command::Flatten(FlattenArgs::default()))
    }
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Flatten a document into KEY=VALUE lines (default if no subcommand given)
    Flatten(FlattenArgs),

    /// Print the effective settings after merging all config tiers
    Config,
}

/// Run a parsed command line.
///
/// `paths` locates the config tiers; `--config` replaces them with one file.
pub fn run(
    cli: &Cli,
    paths: ConfigPaths,
    stdin: &mut dyn Read,
    stdout: &mut dyn Write,
) -> Result<()> {
    let paths = match cli.config {
        Some(ref config_path) => paths.with_explicit_file(config_path),
        None => paths,
    };
    let mut loader = ConfigLoader::load_with_paths(paths)?;
    for source in loader.sources() {
        debug!("using config file {}", source.display());
    }

    match cli.command_or_default() {
        Command::Flatten(args) => {
            args.apply_overrides(loader.config_mut());
            loader.config().validate()?;
            args.execute(loader.config(), stdin, stdout)
        }
        Command::Config => {
            stdout.write_all(loader.config().to_yaml()?.as_bytes())?;
            stdout.flush()?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::SequencePolicy;
    use crate::format::OutputFormat;
    use std::path::PathBuf;

    #[test]
    fn test_no_subcommand_defaults_to_flatten_stdin() {
        let cli = Cli::parse_from(["env-flatten"]);
        match cli.command_or_default() {
            Command::Flatten(args) => {
                assert!(args.input.is_none());
                assert!(args.output.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(cli.log, "2");
    }

    #[test]
    fn test_flatten_args_parse() {
        let cli = Cli::parse_from([
            "env-flatten",
            "-v",
            "flatten",
            ".env.yaml",
            "-o",
            ".env",
            "--format",
            "json",
            "--sequences",
            "reject",
            "--max-depth",
            "5",
        ]);
        assert!(cli.verbose);
        let Some(Command::Flatten(args)) = cli.command else {
            panic!("expected flatten command");
        };
        assert_eq!(args.input, Some(PathBuf::from(".env.yaml")));
        assert_eq!(args.output, Some(PathBuf::from(".env")));
        assert_eq!(args.format, Some(OutputFormat::Json));
        assert_eq!(args.sequences, Some(SequencePolicy::Reject));
        assert_eq!(args.max_depth, Some(5));
        assert!(args.nulls.is_none());
    }

    #[test]
    fn test_config_subcommand() {
        let cli = Cli::parse_from(["env-flatten", "--config", "x.yaml", "config"]);
        assert_eq!(cli.config.as_deref(), Some("x.yaml"));
        assert!(matches!(cli.command, Some(Command::Config)));
    }

    #[test]
    fn test_invalid_format_rejected() {
        assert!(Cli::try_parse_from(["env-flatten", "flatten", "--format", "xml"]).is_err());
    }
}
