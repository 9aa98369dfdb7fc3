//! Pointer presence: local sampling and the renderable peer set.
//!
//! Publishing is throttled twice. Pointer moves only record the latest
//! position; a periodic tick then publishes it, and only when it has moved more
//! than the minimum delta on some axis since the last publication. Both the
//! latest and the published position start at the origin.
//!
//! Consuming is a read-time filter. Rows are never deleted; a row simply stops
//! being rendered once it is older than the TTL.

#[cfg(test)]
#[path = "presence_test.rs"]
mod presence_test;

use serde::Serialize;

use crate::consts::{PEER_INITIALS_LEN, PEER_LABEL_LEN, PRESENCE_MIN_DELTA};
use crate::doc::{ActorId, Point};
use crate::row::PresenceRow;

/// Cursor colors, indexed by the peer id hash.
pub const PEER_PALETTE: [&str; 10] = [
    "#f59e42", "#3b82f6", "#10b981", "#f43f5e", "#a21caf", "#eab308", "#6366f1", "#14b8a6", "#ef4444", "#8b5cf6",
];

// =============================================================================
// SAMPLING
// =============================================================================

/// Latest vs. last published pointer position for the local actor.
#[derive(Debug, Clone, PartialEq)]
pub struct PresenceSampler {
    latest: Point,
    published: Point,
    min_delta: f64,
}

impl Default for PresenceSampler {
    fn default() -> Self {
        Self::new(PRESENCE_MIN_DELTA)
    }
}

impl PresenceSampler {
    #[must_use]
    pub fn new(min_delta: f64) -> Self {
        Self { latest: Point::default(), published: Point::default(), min_delta }
    }

    /// Remember the pointer position. Never writes.
    pub fn record(&mut self, point: Point) {
        self.latest = point;
    }

    /// Called on each tick. Returns the position to publish, if it moved far enough.
    ///
    /// Nothing is marked as published until [`Self::mark_published`], so a
    /// write that never went out is retried on the next tick.
    #[must_use]
    pub fn due(&self) -> Option<Point> {
        let dx = (self.latest.x - self.published.x).abs();
        let dy = (self.latest.y - self.published.y).abs();
        (dx > self.min_delta || dy > self.min_delta).then_some(self.latest)
    }

    /// Record that `point` was handed to the store.
    pub fn mark_published(&mut self, point: Point) {
        self.published = point;
    }

    #[must_use]
    pub fn latest(&self) -> Point {
        self.latest
    }

    #[must_use]
    pub fn published(&self) -> Point {
        self.published
    }
}

// =============================================================================
// PEERS
// =============================================================================

/// A peer cursor ready to draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Peer {
    pub user_id: ActorId,
    pub position: Point,
    pub color: &'static str,
    /// Short id shown next to the cursor.
    pub label: String,
    /// Upper-cased initials for the avatar bubble.
    pub initials: String,
    pub updated_at: i64,
}

impl Peer {
    fn from_row(row: &PresenceRow) -> Self {
        Self {
            user_id: ActorId::new(row.user_id.clone()),
            position: Point::new(row.x, row.y),
            color: peer_color(&row.user_id),
            label: row.user_id.chars().take(PEER_LABEL_LEN).collect(),
            initials: row.user_id.chars().take(PEER_INITIALS_LEN).collect::<String>().to_uppercase(),
            updated_at: row.updated_at,
        }
    }
}

/// Peers to render: everyone but `self_id` seen within `ttl_ms` of `now_ms`.
///
/// Invalid rows are skipped. The result is ordered by user id so it is stable
/// across snapshots.
#[must_use]
pub fn visible_peers(rows: &[PresenceRow], self_id: Option<&ActorId>, now_ms: i64, ttl_ms: i64) -> Vec<Peer> {
    let cutoff = now_ms - ttl_ms;
    let mut peers: Vec<Peer> = rows
        .iter()
        .filter(|row| row.validate().is_ok())
        .filter(|row| self_id.is_none_or(|me| me.as_str() != row.user_id))
        .filter(|row| row.updated_at > cutoff)
        .map(Peer::from_row)
        .collect();
    peers.sort_by(|a, b| a.user_id.cmp(&b.user_id));
    peers
}

/// 31-multiplier string hash over UTF-16 code units, with 32-bit shift semantics.
///
/// Matches the hash every other client uses so a peer gets the same color everywhere.
#[must_use]
pub fn peer_hash(user_id: &str) -> i64 {
    user_id.encode_utf16().fold(0_i64, |hash, unit| {
        #[allow(clippy::cast_possible_truncation)]
        let shifted = i64::from((hash as i32).wrapping_shl(5));
        i64::from(unit) + (shifted - hash)
    })
}

/// Deterministic cursor color for a peer id.
#[must_use]
pub fn peer_color(user_id: &str) -> &'static str {
    #[allow(clippy::cast_possible_truncation)]
    let index = (peer_hash(user_id).unsigned_abs() % PEER_PALETTE.len() as u64) as usize;
    PEER_PALETTE[index]
}

/// Header text for the collaborator count.
#[must_use]
pub fn collaborator_label(count: usize) -> String {
    if count == 1 { "1 Collaborator".to_owned() } else { format!("{count} Collaborators") }
}
