// src/exec/classify.rs

//! Map a finished process onto the closed [`ExecError`] taxonomy.

use crate::errors::ExecError;
use crate::types::TerminationOutcome;

/// Decide how an execution ends.
///
/// Cancellation wins over whatever the OS reports, provided it was acted on
/// while the process was still running. Otherwise the outcome alone decides:
/// exit 0 is success, any other code is `NonZeroExit` carrying the full
/// stderr text, and a signal is `Signaled`.
pub fn classify(
    outcome: TerminationOutcome,
    cancelled: bool,
    stderr: &[u8],
) -> Result<(), ExecError> {
    if cancelled {
        return Err(ExecError::Cancelled);
    }

    match outcome {
        TerminationOutcome::Exited(0) => Ok(()),
        TerminationOutcome::Exited(code) => Err(ExecError::NonZeroExit {
            code,
            stderr: String::from_utf8_lossy(stderr).into_owned(),
        }),
        TerminationOutcome::Signaled(signal) => Err(ExecError::Signaled(signal)),
    }
}
