// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::exec::{CommandDescriptor, ExecOptions};

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [exec]
/// channel_capacity = 64
/// read_buffer_size = 8192
/// drain_timeout = "100ms"
/// kill_grace = "2s"
///
/// [command]
/// args = ["cargo", "build"]
/// cwd = "."
///
/// [command.env]
/// RUST_LOG = "info"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub exec: ExecSection,

    #[serde(default)]
    pub command: CommandSection,
}

/// `[exec]` section. Durations are strings like `"250ms"` or `"2s"`.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecSection {
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    #[serde(default = "default_read_buffer_size")]
    pub read_buffer_size: usize,

    #[serde(default = "default_drain_timeout")]
    pub drain_timeout: String,

    /// `"none"` disables SIGKILL escalation.
    #[serde(default = "default_kill_grace")]
    pub kill_grace: String,
}

fn default_channel_capacity() -> usize {
    64
}

fn default_read_buffer_size() -> usize {
    8 * 1024
}

fn default_drain_timeout() -> String {
    "100ms".to_string()
}

fn default_kill_grace() -> String {
    "2s".to_string()
}

impl Default for ExecSection {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
            read_buffer_size: default_read_buffer_size(),
            drain_timeout: default_drain_timeout(),
            kill_grace: default_kill_grace(),
        }
    }
}

/// `[command]` section: an optional default command to run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CommandSection {
    #[serde(default)]
    pub args: Vec<String>,

    /// Variables added on top of the base environment.
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    #[serde(default)]
    pub cwd: Option<PathBuf>,

    /// Start from an empty environment instead of the current one.
    #[serde(default)]
    pub clear_env: bool,
}

impl CommandSection {
    /// Build a descriptor, using `args` instead of the configured ones when
    /// given.
    pub fn to_descriptor(&self, args: Option<Vec<String>>) -> CommandDescriptor {
        let args = args.unwrap_or_else(|| self.args.clone());
        let mut descriptor = CommandDescriptor::new(args);

        if self.clear_env {
            descriptor = descriptor.with_env(Default::default());
        }
        for (key, value) in &self.env {
            descriptor = descriptor.env(key.clone(), value.clone());
        }
        if let Some(ref cwd) = self.cwd {
            descriptor = descriptor.current_dir(cwd.clone());
        }

        descriptor
    }
}

/// Validated configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    pub exec: ExecOptions,
    pub command: CommandSection,
}
