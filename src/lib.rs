// src/lib.rs

//! Asynchronous external-process execution with streamed output.
//!
//! ```no_run
//! use procstream::CommandDescriptor;
//!
//! # async fn demo() -> Result<(), procstream::ExecError> {
//! let text = procstream::execute(CommandDescriptor::new(["echo", "Hello World"]))
//!     .collect_output(false)
//!     .await?;
//! assert_eq!(text.trim(), "Hello World");
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod stream;
pub mod types;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info};

use crate::cli::CliArgs;
use crate::config::{ConfigFile, default_config_path, load_and_validate};

pub use crate::errors::{ExecError, ProcstreamError};
pub use crate::exec::{
    CommandDescriptor, ExecOptions, ExecutableResolver, PathResolver, execute, execute_with, run,
};
pub use crate::stream::{CollectedOutput, Origin, OutputChunk, OutputStream};
pub use crate::types::TerminationOutcome;

/// High-level entry point used by `main.rs`.
///
/// Loads config, runs the command, passes chunks through verbatim, and
/// returns the exit status the binary should use. Ctrl-C cancels the
/// execution.
pub async fn run_cli(args: CliArgs) -> Result<i32> {
    let cfg = load_config(args.config.as_deref())?;

    let mut section = cfg.command.clone();
    if args.clear_env {
        section.clear_env = true;
    }
    if let Some(cwd) = args.cwd.clone() {
        section.cwd = Some(cwd);
    }
    for (key, value) in &args.env {
        section.env.insert(key.clone(), value.clone());
    }

    let override_args = (!args.command.is_empty()).then(|| args.command.clone());
    let descriptor = section.to_descriptor(override_args);
    debug!(args = ?descriptor.args(), cwd = ?descriptor.cwd(), "running command");

    let mut stream = execute_with(descriptor, cfg.exec, Arc::new(PathResolver));
    let mut stdout = tokio::io::stdout();
    let mut stderr = tokio::io::stderr();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut interrupted = false;

    loop {
        tokio::select! {
            item = stream.next() => match item {
                Some(Ok(chunk)) => match chunk.origin() {
                    Origin::Stdout => {
                        stdout.write_all(chunk.bytes()).await.context("writing to stdout")?;
                        stdout.flush().await.context("flushing stdout")?;
                    }
                    Origin::Stderr if !args.stdout_only => {
                        stderr.write_all(chunk.bytes()).await.context("writing to stderr")?;
                        stderr.flush().await.context("flushing stderr")?;
                    }
                    Origin::Stderr => {}
                },
                Some(Err(err)) => {
                    error!(error = %err, "command failed");
                    return Ok(exit_status_for(&err));
                }
                None => {
                    info!("command finished successfully");
                    return Ok(0);
                }
            },

            res = &mut ctrl_c, if !interrupted => {
                interrupted = true;
                if let Err(e) = res {
                    error!(error = %e, "failed to listen for Ctrl+C");
                    continue;
                }
                info!("Ctrl+C received; cancelling command");
                stream.cancel();
            }
        }
    }
}

/// Exit status the binary reports for a failed execution.
pub fn exit_status_for(err: &ExecError) -> i32 {
    match err {
        ExecError::MissingExecutable | ExecError::ExecutableNotFound(_) => 127,
        ExecError::NonZeroExit { code, .. } => *code,
        ExecError::Signaled(signal) => 128 + signal,
        ExecError::Cancelled => 130,
    }
}

/// Explicit path, else `Procstream.toml` if present, else defaults.
fn load_config(path: Option<&Path>) -> Result<ConfigFile> {
    match path {
        Some(path) => load_and_validate(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => {
            let default_path = default_config_path();
            if default_path.is_file() {
                load_and_validate(&default_path)
                    .with_context(|| format!("loading config {}", default_path.display()))
            } else {
                Ok(ConfigFile::default())
            }
        }
    }
}
