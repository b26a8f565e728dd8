// src/exec/runner.rs

//! The per-execution task: resolve, spawn, multiplex, wait, classify.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

use crate::errors::ExecError;
use crate::exec::classify::classify;
use crate::exec::controller::ProcessController;
use crate::exec::multiplexer::{Phase, ReaderConfig, spawn_reader};
use crate::exec::{CommandDescriptor, ExecOptions, ExecutableResolver};
use crate::stream::{Origin, StreamItem};

/// Run one execution to completion and report its verdict on `tx`.
///
/// Success is reported by simply closing the channel; a failure is sent as
/// the final item. Dropping or firing `cancel_rx`'s sender cancels.
pub(crate) async fn run_execution(
    descriptor: CommandDescriptor,
    options: ExecOptions,
    resolver: Arc<dyn ExecutableResolver>,
    tx: mpsc::Sender<StreamItem>,
    cancel_rx: oneshot::Receiver<()>,
) {
    if let Err(err) = run_execution_inner(&descriptor, options, resolver, &tx, cancel_rx).await {
        debug!(args = ?descriptor.args(), error = %err, "execution failed");
        if tx.send(Err(err)).await.is_err() {
            debug!("consumer gone before the verdict was delivered");
        }
    }
}

async fn run_execution_inner(
    descriptor: &CommandDescriptor,
    options: ExecOptions,
    resolver: Arc<dyn ExecutableResolver>,
    tx: &mpsc::Sender<StreamItem>,
    mut cancel_rx: oneshot::Receiver<()>,
) -> Result<(), ExecError> {
    let name = descriptor.program()?;

    // Nothing is spawned yet, so a cancellation here just ends the stream.
    let program = tokio::select! {
        resolved = resolver.resolve(name, descriptor) => resolved?,
        _ = &mut cancel_rx => return Err(ExecError::Cancelled),
    };

    let mut controller = ProcessController::start(
        &program,
        descriptor.program_args(),
        descriptor.env_map(),
        descriptor.cwd(),
    )
    .map_err(|e| {
        warn!(command = %name, error = %e, "failed to spawn process");
        ExecError::ExecutableNotFound(name.to_string())
    })?;

    info!(
        command = %name,
        pid = ?controller.pid(),
        args = ?descriptor.program_args(),
        "execution started"
    );

    let (phase_tx, phase_rx) = watch::channel(Phase::Running);
    let reader_config = ReaderConfig {
        buffer_size: options.read_buffer_size,
        drain_timeout: options.drain_timeout,
    };

    let stdout_reader = controller.take_stdout().map(|pipe| {
        spawn_reader(Origin::Stdout, pipe, tx.clone(), phase_rx.clone(), reader_config, false)
    });
    let stderr_reader = controller.take_stderr().map(|pipe| {
        spawn_reader(Origin::Stderr, pipe, tx.clone(), phase_rx.clone(), reader_config, true)
    });
    drop(phase_rx);

    let mut cancel_seen = false;
    let mut kill_deadline: Option<Instant> = None;

    let outcome = loop {
        tokio::select! {
            biased;

            outcome = controller.await_exit() => break outcome,

            _ = &mut cancel_rx, if !cancel_seen => {
                cancel_seen = true;
                if controller.request_cancellation() {
                    let _ = phase_tx.send(Phase::Cancelled);
                    kill_deadline = options.kill_grace.map(|grace| Instant::now() + grace);
                }
            }

            _ = sleep_until_opt(kill_deadline), if kill_deadline.is_some() => {
                kill_deadline = None;
                controller.escalate();
            }
        }
    };

    let cancelled = controller.cancellation_requested();
    if !cancelled {
        let _ = phase_tx.send(Phase::Exited);
    }

    if let Some(handle) = stdout_reader {
        if let Err(e) = handle.await {
            warn!(error = %e, "stdout reader task failed");
        }
    }
    let stderr = match stderr_reader {
        Some(handle) => handle.await.unwrap_or_else(|e| {
            warn!(error = %e, "stderr reader task failed");
            Vec::new()
        }),
        None => Vec::new(),
    };

    info!(
        command = %name,
        ?outcome,
        cancelled,
        stderr_bytes = stderr.len(),
        "execution finished"
    );

    classify(outcome, cancelled, &stderr)
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}
