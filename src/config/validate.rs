// src/config/validate.rs

use std::time::Duration;

use crate::config::model::{ConfigFile, ExecSection, RawConfigFile};
use crate::errors::{ProcstreamError, Result};
use crate::exec::ExecOptions;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = ProcstreamError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let exec = validate_exec_section(&raw.exec)?;
        Ok(ConfigFile {
            exec,
            command: raw.command,
        })
    }
}

fn validate_exec_section(section: &ExecSection) -> Result<ExecOptions> {
    if section.channel_capacity == 0 {
        return Err(ProcstreamError::ConfigError(
            "[exec].channel_capacity must be >= 1 (got 0)".to_string(),
        ));
    }
    if section.read_buffer_size == 0 {
        return Err(ProcstreamError::ConfigError(
            "[exec].read_buffer_size must be >= 1 (got 0)".to_string(),
        ));
    }

    let drain_timeout = parse_duration(&section.drain_timeout).map_err(|e| {
        ProcstreamError::ConfigError(format!("[exec].drain_timeout: {e}"))
    })?;

    let kill_grace = if section.kill_grace.trim().eq_ignore_ascii_case("none") {
        None
    } else {
        Some(parse_duration(&section.kill_grace).map_err(|e| {
            ProcstreamError::ConfigError(format!("[exec].kill_grace: {e}"))
        })?)
    };

    Ok(ExecOptions {
        channel_capacity: section.channel_capacity,
        read_buffer_size: section.read_buffer_size,
        drain_timeout,
        kill_grace,
    })
}

/// Parse a simple duration string like `"3s"`, `"250ms"`, `"1m"`, `"2h"`.
pub fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    match unit.as_str() {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        "m" => Ok(Duration::from_secs(value * 60)),
        "h" => Ok(Duration::from_secs(value * 60 * 60)),
        _ => Err(format!(
            "unsupported duration unit '{}'; expected ms, s, m, or h",
            unit
        )),
    }
}
