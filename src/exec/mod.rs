// src/exec/mod.rs

//! Process execution layer.
//!
//! Starting an execution returns an [`OutputStream`] immediately; the actual
//! work runs on Tokio tasks:
//!
//! - [`resolver`] turns the command token into a path (`PathResolver`, or a
//!   custom [`ExecutableResolver`]).
//! - [`controller`] owns the child process: spawn, termination signal,
//!   reaping.
//! - [`multiplexer`] drains stdout and stderr concurrently into the stream.
//! - [`classify`] turns the termination into success or an [`ExecError`].
//! - [`runner`] is the per-execution task wiring all of the above.
//!
//! All entry points must be called from within a Tokio runtime.
//!
//! [`ExecError`]: crate::errors::ExecError

pub mod classify;
pub mod controller;
pub mod descriptor;
pub mod multiplexer;
pub mod options;
pub mod resolver;
mod runner;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use crate::stream::OutputStream;

pub use descriptor::CommandDescriptor;
pub use options::ExecOptions;
pub use resolver::{ExecutableResolver, PathResolver};

/// Start executing `descriptor` with default options and `PATH` lookup.
pub fn execute(descriptor: CommandDescriptor) -> OutputStream {
    execute_with(descriptor, ExecOptions::default(), Arc::new(PathResolver))
}

/// Start executing `descriptor` with explicit options and resolver.
pub fn execute_with(
    descriptor: CommandDescriptor,
    options: ExecOptions,
    resolver: Arc<dyn ExecutableResolver>,
) -> OutputStream {
    let (tx, rx) = mpsc::channel(options.channel_capacity.max(1));
    let (cancel_tx, cancel_rx) = oneshot::channel();

    tokio::spawn(runner::run_execution(
        descriptor, options, resolver, tx, cancel_rx,
    ));

    OutputStream::new(rx, cancel_tx)
}

/// One-shot helper: run `args` with optional environment and working
/// directory overrides.
///
/// Without `env` the child sees the current process environment.
pub fn run<I, S>(args: I, env: Option<HashMap<String, String>>, cwd: Option<PathBuf>) -> OutputStream
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut descriptor = CommandDescriptor::new(args);
    if let Some(env) = env {
        descriptor = descriptor.with_env(env);
    }
    if let Some(cwd) = cwd {
        descriptor = descriptor.current_dir(cwd);
    }
    execute(descriptor)
}
