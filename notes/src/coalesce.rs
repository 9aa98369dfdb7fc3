//! Debounce/coalesce for values that change many times per second.
//!
//! DESIGN
//! ======
//! Each logical target (one note's text, one note's size, the local pointer)
//! keeps a single pending value and at most one deadline:
//! - a proposal made `max_wait` or longer after the last commit (or before any
//!   commit) commits immediately;
//! - otherwise the proposal replaces the pending value and (re)arms a deadline
//!   `idle` from now; superseded values are never written;
//! - when the deadline passes, `poll` commits the pending value;
//! - `flush` commits right away (focus loss, gesture end).
//!
//! Time is passed in explicitly. The session loop sleeps until
//! [`CoalescerSet::next_deadline`] and then polls, so there is exactly one
//! logical timer per target and a new value replaces it instead of stacking.

#[cfg(test)]
#[path = "coalesce_test.rs"]
mod coalesce_test;

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use crate::consts::{COMMIT_IDLE_MS, COMMIT_MAX_WAIT_MS};

/// Timing knobs for one coalescer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoalesceConfig {
    /// Quiet period after the latest proposal before the pending value commits.
    pub idle: Duration,
    /// Time since the last commit after which a proposal commits immediately.
    pub max_wait: Duration,
}

impl Default for CoalesceConfig {
    fn default() -> Self {
        Self { idle: Duration::from_millis(COMMIT_IDLE_MS), max_wait: Duration::from_millis(COMMIT_MAX_WAIT_MS) }
    }
}

/// Coalescer for a single logical target.
#[derive(Debug, Clone)]
pub struct Coalescer<V> {
    config: CoalesceConfig,
    pending: Option<V>,
    last_commit: Option<Instant>,
    deadline: Option<Instant>,
}

impl<V> Coalescer<V> {
    #[must_use]
    pub fn new(config: CoalesceConfig) -> Self {
        Self { config, pending: None, last_commit: None, deadline: None }
    }

    /// Record a new value. Returns it back if it must be committed now.
    pub fn propose(&mut self, value: V, now: Instant) -> Option<V> {
        self.pending = Some(value);
        let overdue = self
            .last_commit
            .is_none_or(|at| now.saturating_duration_since(at) >= self.config.max_wait);
        if overdue {
            return self.commit(now);
        }
        self.deadline = Some(now + self.config.idle);
        None
    }

    /// Commit the pending value if the deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<V> {
        match self.deadline {
            Some(deadline) if now >= deadline => self.commit(now),
            _ => None,
        }
    }

    /// Cancel the deadline and commit the pending value, if any.
    pub fn flush(&mut self, now: Instant) -> Option<V> {
        self.commit(now)
    }

    /// Drop the pending value without committing it.
    pub fn cancel(&mut self) -> Option<V> {
        self.deadline = None;
        self.pending.take()
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    #[must_use]
    pub fn pending(&self) -> Option<&V> {
        self.pending.as_ref()
    }

    fn commit(&mut self, now: Instant) -> Option<V> {
        self.deadline = None;
        let value = self.pending.take()?;
        self.last_commit = Some(now);
        Some(value)
    }
}

/// One coalescer per target key, sharing a config.
#[derive(Debug, Clone)]
pub struct CoalescerSet<K, V> {
    config: CoalesceConfig,
    targets: HashMap<K, Coalescer<V>>,
}

impl<K: Eq + Hash + Clone, V> CoalescerSet<K, V> {
    #[must_use]
    pub fn new(config: CoalesceConfig) -> Self {
        Self { config, targets: HashMap::new() }
    }

    /// Propose a value for `key`. Returns the value if it must be committed now.
    pub fn propose(&mut self, key: K, value: V, now: Instant) -> Option<V> {
        let config = self.config;
        self.targets
            .entry(key)
            .or_insert_with(|| Coalescer::new(config))
            .propose(value, now)
    }

    /// Commit every target whose deadline has passed.
    pub fn poll_due(&mut self, now: Instant) -> Vec<(K, V)> {
        self.targets
            .iter_mut()
            .filter_map(|(key, c)| c.poll(now).map(|v| (key.clone(), v)))
            .collect()
    }

    /// Flush one target.
    pub fn flush(&mut self, key: &K, now: Instant) -> Option<V> {
        self.targets.get_mut(key)?.flush(now)
    }

    /// Flush every target with a pending value.
    pub fn flush_all(&mut self, now: Instant) -> Vec<(K, V)> {
        self.targets
            .iter_mut()
            .filter_map(|(key, c)| c.flush(now).map(|v| (key.clone(), v)))
            .collect()
    }

    /// Forget a target entirely, discarding any pending value.
    pub fn forget(&mut self, key: &K) -> Option<V> {
        self.targets.remove(key)?.cancel()
    }

    /// Earliest armed deadline across all targets.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.targets.values().filter_map(Coalescer::deadline).min()
    }

    #[must_use]
    pub fn pending(&self, key: &K) -> Option<&V> {
        self.targets.get(key)?.pending()
    }
}
