//! Session time source.
//!
//! Two clocks are needed: a monotonic `Instant` for coalescer deadlines and
//! epoch milliseconds for row timestamps. Both are derived from tokio's clock
//! so paused-time tests move them together.

use std::time::{SystemTime, UNIX_EPOCH};

use tokio::time::Instant;

#[derive(Debug, Clone, Copy)]
pub struct SessionClock {
    origin: Instant,
    origin_ms: i64,
}

impl SessionClock {
    #[must_use]
    pub fn start() -> Self {
        let origin_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX));
        Self { origin: Instant::now(), origin_ms }
    }

    /// Monotonic now, as a std instant for the pure core.
    #[must_use]
    pub fn now(&self) -> std::time::Instant {
        self.origin.into_std() + self.origin.elapsed()
    }

    /// Wall-clock now in epoch milliseconds.
    #[must_use]
    pub fn now_ms(&self) -> i64 {
        let elapsed = i64::try_from(self.origin.elapsed().as_millis()).unwrap_or(i64::MAX);
        self.origin_ms.saturating_add(elapsed)
    }
}
