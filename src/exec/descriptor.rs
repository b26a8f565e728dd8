// src/exec/descriptor.rs

//! The immutable description of one command to execute.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::errors::ExecError;

/// Argument vector, environment, and optional working directory for one
/// execution.
///
/// The first argument is the command name (or path); the rest are passed to
/// the child untouched. The environment is passed *exactly* as stored here:
/// the child does not additionally inherit anything from the parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDescriptor {
    args: Vec<String>,
    env: HashMap<String, String>,
    cwd: Option<PathBuf>,
}

impl CommandDescriptor {
    /// New descriptor whose environment is a snapshot of the current process
    /// environment.
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            env: std::env::vars().collect(),
            cwd: None,
        }
    }

    /// Replace the whole environment.
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }

    /// Add or override a single environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn env_remove(mut self, key: &str) -> Self {
        self.env.remove(key);
        self
    }

    /// Run the command in `dir` instead of the caller's working directory.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn env_map(&self) -> &HashMap<String, String> {
        &self.env
    }

    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// The command token, or `MissingExecutable` for an empty argument vector.
    pub fn program(&self) -> Result<&str, ExecError> {
        self.args
            .first()
            .map(String::as_str)
            .ok_or(ExecError::MissingExecutable)
    }

    /// Arguments after the command token.
    pub fn program_args(&self) -> &[String] {
        self.args.get(1..).unwrap_or(&[])
    }
}
