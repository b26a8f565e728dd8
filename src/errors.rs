// src/errors.rs

//! Crate-wide error types.
//!
//! - [`ExecError`] is the closed set of ways a single execution can end
//!   abnormally. It only ever reaches a caller as the terminal item of an
//!   [`OutputStream`](crate::stream::OutputStream).
//! - [`ProcstreamError`] covers everything around the engine: config files,
//!   IO, and the binary front-end.

use thiserror::Error;

/// Terminal failure of one execution.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecError {
    /// The argument vector was empty; there was nothing to run.
    #[error("no executable given (empty argument vector)")]
    MissingExecutable,

    /// The command could not be resolved or started.
    #[error("executable not found: {0}")]
    ExecutableNotFound(String),

    /// The process exited on its own with a non-zero status.
    #[error("process exited with status {code}: {stderr}")]
    NonZeroExit { code: i32, stderr: String },

    /// The process was killed by a signal it did not handle.
    #[error("process terminated by signal {0}")]
    Signaled(i32),

    /// The consumer asked for the execution to stop.
    #[error("execution cancelled")]
    Cancelled,
}

impl ExecError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ExecError::Cancelled)
    }

    /// Exit code for `NonZeroExit`, `None` otherwise.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ExecError::NonZeroExit { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Accumulated stderr text for `NonZeroExit`, `None` otherwise.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            ExecError::NonZeroExit { stderr, .. } => Some(stderr.as_str()),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum ProcstreamError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ProcstreamError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_zero_exit_exposes_code_and_stderr() {
        let err = ExecError::NonZeroExit {
            code: 2,
            stderr: "boom\n".to_string(),
        };
        assert_eq!(err.exit_code(), Some(2));
        assert_eq!(err.stderr(), Some("boom\n"));
        assert!(!err.is_cancelled());
        assert!(err.to_string().contains("status 2"));
    }

    #[test]
    fn cancelled_is_distinct_from_signaled() {
        assert!(ExecError::Cancelled.is_cancelled());
        assert!(!ExecError::Signaled(15).is_cancelled());
        assert_eq!(ExecError::Signaled(15).exit_code(), None);
    }
}
