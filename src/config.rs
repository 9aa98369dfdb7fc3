//! Session configuration loaded from environment variables.
//!
//! Every knob has a default matching the documented behavior; a missing or
//! unparsable variable silently falls back to it.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

use notes::coalesce::CoalesceConfig;
use notes::consts::{COMMIT_IDLE_MS, COMMIT_MAX_WAIT_MS, PRESENCE_MIN_DELTA, PRESENCE_TICK_MS, PRESENCE_TTL_MS};
use notes::doc::PlacementArea;

const DEFAULT_PRESENCE_TTL_SECS: u64 = PRESENCE_TTL_MS.unsigned_abs() / 1000;
const DEFAULT_WRITE_QUEUE_CAPACITY: usize = 256;
const DEFAULT_EVENT_QUEUE_CAPACITY: usize = 1024;
const DEFAULT_VIEWPORT_WIDTH: f64 = 1280.0;
const DEFAULT_VIEWPORT_HEIGHT: f64 = 800.0;

/// Tuning knobs for one session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    /// Text edit coalescing.
    pub coalesce: CoalesceConfig,
    /// Period of the presence sampling tick.
    pub presence_tick: Duration,
    /// Per-axis pointer displacement required before a presence write.
    pub presence_min_delta: f64,
    /// Peers not seen for this long are hidden.
    pub presence_ttl: Duration,
    /// Bounded capacity of the outbound write queue.
    pub write_queue_capacity: usize,
    /// Bounded capacity of the inbound event queue.
    pub event_queue_capacity: usize,
    /// Area new notes are scattered over.
    pub placement: PlacementArea,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            coalesce: CoalesceConfig::default(),
            presence_tick: Duration::from_millis(PRESENCE_TICK_MS),
            presence_min_delta: PRESENCE_MIN_DELTA,
            presence_ttl: Duration::from_secs(DEFAULT_PRESENCE_TTL_SECS),
            write_queue_capacity: DEFAULT_WRITE_QUEUE_CAPACITY,
            event_queue_capacity: DEFAULT_EVENT_QUEUE_CAPACITY,
            placement: PlacementArea { width: DEFAULT_VIEWPORT_WIDTH, height: DEFAULT_VIEWPORT_HEIGHT },
        }
    }
}

impl SessionConfig {
    /// Build a config from `NOTEBOARD_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            coalesce: CoalesceConfig {
                idle: Duration::from_millis(env_parse("NOTEBOARD_COMMIT_IDLE_MS", COMMIT_IDLE_MS)),
                max_wait: Duration::from_millis(env_parse("NOTEBOARD_COMMIT_MAX_WAIT_MS", COMMIT_MAX_WAIT_MS)),
            },
            presence_tick: Duration::from_millis(env_parse("NOTEBOARD_PRESENCE_TICK_MS", PRESENCE_TICK_MS).max(1)),
            presence_min_delta: env_parse("NOTEBOARD_PRESENCE_MIN_DELTA", PRESENCE_MIN_DELTA),
            presence_ttl: Duration::from_secs(env_parse("NOTEBOARD_PRESENCE_TTL_SECS", DEFAULT_PRESENCE_TTL_SECS)),
            write_queue_capacity: env_parse("NOTEBOARD_WRITE_QUEUE_CAPACITY", DEFAULT_WRITE_QUEUE_CAPACITY).max(1),
            event_queue_capacity: env_parse("NOTEBOARD_EVENT_QUEUE_CAPACITY", DEFAULT_EVENT_QUEUE_CAPACITY).max(1),
            placement: PlacementArea {
                width: env_parse("NOTEBOARD_VIEWPORT_WIDTH", DEFAULT_VIEWPORT_WIDTH),
                height: env_parse("NOTEBOARD_VIEWPORT_HEIGHT", DEFAULT_VIEWPORT_HEIGHT),
            },
        }
    }
}

/// Parse `key` from the environment, falling back to `default`.
pub fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

/// Non-empty string variable, if set.
#[must_use]
pub fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
