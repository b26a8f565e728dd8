// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `procstream`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "procstream",
    version,
    about = "Run a command and stream its stdout/stderr as they arrive.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to a config file (TOML) with `[exec]` and `[command]` sections.
    ///
    /// If omitted, `Procstream.toml` is used when it exists.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Working directory for the command.
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Extra environment variable for the command (repeatable).
    #[arg(long = "env", value_name = "KEY=VALUE", value_parser = parse_env_pair)]
    pub env: Vec<(String, String)>,

    /// Start the command with an empty environment.
    #[arg(long)]
    pub clear_env: bool,

    /// Discard the command's stderr instead of passing it through.
    #[arg(long)]
    pub stdout_only: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PROCSTREAM_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Command and arguments to run; overrides `[command].args`.
    #[arg(last = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

fn parse_env_pair(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{s}'")),
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
