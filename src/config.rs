//! Configuration types for the idlewatch detector.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default probe interval when the caller supplies none (or a non-positive
/// value), in milliseconds.
pub const DEFAULT_INTERVAL_MS: i64 = 5000;

/// Environment variable that enables transition tracing when set to a
/// non-zero integer value.
pub const TRACE_ENV_VAR: &str = "IDLEWATCH_TRACE";

/// Configuration for the idle detector.
///
/// This struct can be deserialized from TOML, YAML, JSON, or environment
/// variables using figment.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct IdleWatchConfig {
    /// Debounce interval in milliseconds. `None` or any value <= 0 falls
    /// back to [`DEFAULT_INTERVAL_MS`]; inputs are sanitized, never rejected.
    #[serde(default)]
    pub interval_ms: Option<i64>,

    /// Whether to trace state transitions. `None` defers to the
    /// [`TRACE_ENV_VAR`] environment toggle, read once at build time.
    #[serde(default)]
    pub trace: Option<bool>,
}

impl IdleWatchConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the effective debounce interval.
    ///
    /// Non-positive or missing values become the 5000 ms default.
    pub fn effective_interval(&self) -> Duration {
        Duration::from_millis(sanitize_interval(self.interval_ms) as u64)
    }

    /// Get the effective trace flag, consulting the environment toggle when
    /// no explicit value was configured.
    pub fn effective_trace(&self) -> bool {
        self.trace.unwrap_or_else(trace_enabled_from_env)
    }
}

/// Replace a non-positive or missing interval with the default.
pub(crate) fn sanitize_interval(interval_ms: Option<i64>) -> i64 {
    match interval_ms {
        Some(ms) if ms > 0 => ms,
        _ => DEFAULT_INTERVAL_MS,
    }
}

/// Read the trace toggle from the environment.
///
/// Matches C `atoi` semantics: the longest leading integer prefix is parsed
/// and any non-zero result enables tracing. Absent, zero, or non-numeric
/// values disable it; malformed input is never an error.
pub(crate) fn trace_enabled_from_env() -> bool {
    std::env::var(TRACE_ENV_VAR)
        .map(|v| parse_trace_value(&v))
        .unwrap_or(false)
}

fn parse_trace_value(value: &str) -> bool {
    let trimmed = value.trim_start();
    let mut end = 0;
    for (i, c) in trimmed.char_indices() {
        if c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+')) {
            end = i + c.len_utf8();
        } else {
            break;
        }
    }
    trimmed[..end].parse::<i64>().map(|v| v != 0).unwrap_or(false)
}
