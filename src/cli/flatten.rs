//! Flatten subcommand for env-flatten CLI
//!
//! Reads a JSON or YAML document from a file or stdin and writes the
//! flattened `KEY=VALUE` lines to stdout or a file.

use crate::config::Config;
use crate::error::FlattenResult;
use crate::flatten::{Flattener, NullPolicy, SequencePolicy};
use crate::format::{InputFormat, OutputFormat, parse_auto, parse_document, render};
use anyhow::Context;
use clap::Args;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Input format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputFormatArg {
    /// By file extension, else JSON with YAML fallback
    #[default]
    Auto,
    Json,
    Yaml,
}

impl std::str::FromStr for InputFormatArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(InputFormatArg::Auto),
            "json" => Ok(InputFormatArg::Json),
            "yaml" | "yml" => Ok(InputFormatArg::Yaml),
            _ => Err(format!(
                "Invalid input format '{}'. Valid options: auto, json, yaml",
                s
            )),
        }
    }
}

impl std::fmt::Display for InputFormatArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputFormatArg::Auto => write!(f, "auto"),
            InputFormatArg::Json => write!(f, "json"),
            InputFormatArg::Yaml => write!(f, "yaml"),
        }
    }
}

/// Arguments for the flatten subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct FlattenArgs {
    /// Input document (default: stdin, also `-`)
    #[arg(value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Input format: auto (default), json, or yaml
    #[arg(long, default_value = "auto", value_name = "FORMAT")]
    pub input_format: InputFormatArg,

    /// Output file path (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format: env or json (overrides config)
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Prefix prepended verbatim to every key (overrides config)
    #[arg(long)]
    pub prefix: Option<String>,

    /// Maximum mapping nesting depth (overrides config)
    #[arg(long, value_name = "N")]
    pub max_depth: Option<usize>,

    /// Sequence handling: json or reject (overrides config)
    #[arg(long, value_name = "POLICY")]
    pub sequences: Option<SequencePolicy>,

    /// Null handling: empty or skip (overrides config)
    #[arg(long, value_name = "POLICY")]
    pub nulls: Option<NullPolicy>,

    /// Do not end the output with a newline
    #[arg(long)]
    pub no_trailing_newline: bool,
}

impl FlattenArgs {
    /// Input path, or `None` when reading stdin.
    pub fn input_path(&self) -> Option<&Path> {
        self.input
            .as_deref()
            .filter(|p| p.as_os_str() != "-")
    }

    /// Resolve the input format. `None` means try JSON, then YAML.
    pub fn resolved_input_format(&self) -> Option<InputFormat> {
        match self.input_format {
            InputFormatArg::Json => Some(InputFormat::Json),
            InputFormatArg::Yaml => Some(InputFormat::Yaml),
            InputFormatArg::Auto => self.input_path().and_then(InputFormat::from_path),
        }
    }

    /// Apply command line overrides on top of the loaded config.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(format) = self.format {
            config.output.format = format;
        }
        if let Some(ref prefix) = self.prefix {
            config.flatten.prefix = prefix.clone();
        }
        if let Some(max_depth) = self.max_depth {
            config.flatten.max_depth = max_depth;
        }
        if let Some(sequences) = self.sequences {
            config.flatten.sequences = sequences;
        }
        if let Some(nulls) = self.nulls {
            config.flatten.nulls = nulls;
        }
        if self.no_trailing_newline {
            config.output.trailing_newline = false;
        }
    }

    /// Parse `input`, flatten it with `config`, and render the final text.
    pub fn render(&self, config: &Config, input: &str) -> FlattenResult<String> {
        let document = match self.resolved_input_format() {
            Some(format) => parse_document(input, format)?,
            None => parse_auto(input)?,
        };
        let entries = Flattener::new(config.flatten.clone()).entries(&document)?;

        let mut text = render(&entries, config.output.format);
        if config.output.trailing_newline && !text.is_empty() {
            text.push('\n');
        }
        Ok(text)
    }

    /// Read the input document, flatten it, and write the result to the
    /// output file or `stdout`.
    pub fn execute(
        &self,
        config: &Config,
        stdin: &mut dyn Read,
        stdout: &mut dyn Write,
    ) -> anyhow::Result<()> {
        let input = match self.input_path() {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?,
            None => {
                let mut buf = String::new();
                stdin
                    .read_to_string(&mut buf)
                    .context("failed to read stdin")?;
                buf
            }
        };

        let text = self.render(config, &input)?;

        match self.output {
            Some(ref path) => {
                std::fs::write(path, &text)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                info!("wrote {} bytes to {}", text.len(), path.display());
            }
            None => {
                stdout.write_all(text.as_bytes())?;
                stdout.flush()?;
            }
        }
        Ok(())
    }
}
