use std::process::ExitStatus;

/// How the OS reports the end of a child process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationOutcome {
    /// Normal exit with the given status code.
    Exited(i32),
    /// Killed by the given signal number.
    Signaled(i32),
}

impl TerminationOutcome {
    pub fn success(self) -> bool {
        self == TerminationOutcome::Exited(0)
    }
}

impl From<ExitStatus> for TerminationOutcome {
    fn from(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return TerminationOutcome::Exited(code);
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return TerminationOutcome::Signaled(signal);
            }
        }

        TerminationOutcome::Exited(-1)
    }
}
