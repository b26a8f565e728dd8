// src/exec/controller.rs

//! Owner of a single child process, from spawn to reaping.
//!
//! Every execution builds its own [`ProcessController`]; there is no shared
//! registry of running processes. All methods take `&mut self`, so signal
//! delivery and waiting can never race each other on the same handle.

use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;

use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tracing::{debug, info, warn};

use crate::types::TerminationOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Running,
    /// A termination signal was delivered while the process was running.
    Cancelling,
    Exited(TerminationOutcome),
}

#[derive(Debug)]
pub struct ProcessController {
    child: Child,
    pid: Option<u32>,
    state: State,
    cancelled: bool,
}

impl ProcessController {
    /// Spawn `program` with exactly `env` as its environment.
    ///
    /// stdout and stderr are piped, stdin is null. The child is killed if the
    /// controller is dropped before the process was reaped.
    pub fn start(
        program: &Path,
        args: &[String],
        env: &HashMap<String, String>,
        cwd: Option<&Path>,
    ) -> std::io::Result<Self> {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .env_clear()
            .envs(env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        let child = cmd.spawn()?;
        let pid = child.id();

        info!(program = %program.display(), pid = ?pid, "process spawned");

        Ok(Self {
            child,
            pid,
            state: State::Running,
            cancelled: false,
        })
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.child.stdout.take()
    }

    pub fn take_stderr(&mut self) -> Option<ChildStderr> {
        self.child.stderr.take()
    }

    /// True once a termination signal was delivered to a still-running
    /// process. Stays true after the process is reaped.
    pub fn cancellation_requested(&self) -> bool {
        self.cancelled
    }

    /// Wait for the process to exit.
    ///
    /// Cancel-safe: dropping the future before it completes leaves the
    /// process untouched. A failure of the OS wait itself is reported as
    /// `Exited(-1)`.
    pub async fn await_exit(&mut self) -> TerminationOutcome {
        if let State::Exited(outcome) = self.state {
            return outcome;
        }

        let outcome = match self.child.wait().await {
            Ok(status) => TerminationOutcome::from(status),
            Err(e) => {
                warn!(pid = ?self.pid, error = %e, "waiting for process failed");
                TerminationOutcome::Exited(-1)
            }
        };

        debug!(pid = ?self.pid, ?outcome, "process exited");
        self.state = State::Exited(outcome);
        outcome
    }

    /// Ask the process to terminate.
    ///
    /// Idempotent and non-blocking. If the process has already exited this is
    /// a no-op and the exit is recorded as natural. Returns whether the
    /// process is now being cancelled.
    pub fn request_cancellation(&mut self) -> bool {
        match self.state {
            State::Cancelling => return true,
            State::Exited(_) => return false,
            State::Running => {}
        }

        // Reap first if it is already gone, so we never signal a dead pid.
        match self.child.try_wait() {
            Ok(Some(status)) => {
                let outcome = TerminationOutcome::from(status);
                debug!(pid = ?self.pid, ?outcome, "cancellation raced natural exit");
                self.state = State::Exited(outcome);
                return false;
            }
            Ok(None) => {}
            Err(e) => {
                warn!(pid = ?self.pid, error = %e, "try_wait failed before cancellation");
            }
        }

        info!(pid = ?self.pid, "cancellation requested; sending termination signal");
        self.send_terminate();
        self.state = State::Cancelling;
        self.cancelled = true;
        true
    }

    /// Force-kill a process that ignored the termination signal.
    pub fn escalate(&mut self) {
        if self.state != State::Cancelling {
            return;
        }

        warn!(pid = ?self.pid, "process ignored termination signal; killing");
        if let Err(e) = self.child.start_kill() {
            warn!(pid = ?self.pid, error = %e, "failed to kill process");
        }
    }

    #[cfg(unix)]
    fn send_terminate(&mut self) {
        use nix::sys::signal::{Signal, kill};
        use nix::unistd::Pid;

        let Some(pid) = self.pid else {
            return;
        };

        if let Err(e) = kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
            warn!(pid, error = %e, "failed to send SIGTERM");
        }
    }

    #[cfg(not(unix))]
    fn send_terminate(&mut self) {
        if let Err(e) = self.child.start_kill() {
            warn!(pid = ?self.pid, error = %e, "failed to kill process");
        }
    }
}
