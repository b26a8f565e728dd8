// src/exec/options.rs

use std::time::Duration;

/// Tuning knobs for one execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecOptions {
    /// Chunks buffered between the pipe readers and the consumer.
    pub channel_capacity: usize,
    /// Upper bound on the size of a single chunk.
    pub read_buffer_size: usize,
    /// After exit, a pipe that stays idle this long is closed even if some
    /// descendant still holds its write end.
    pub drain_timeout: Duration,
    /// After a cancellation, force-kill the process if it has not exited
    /// within this period. `None` never escalates.
    pub kill_grace: Option<Duration>,
}

impl Default for ExecOptions {
    fn default() -> Self {
        Self {
            channel_capacity: 64,
            read_buffer_size: 8 * 1024,
            drain_timeout: Duration::from_millis(100),
            kill_grace: Some(Duration::from_secs(2)),
        }
    }
}
