//! Shared numeric constants for the notes crate.

// ── Note geometry ───────────────────────────────────────────────

/// Smallest width a note can be resized to, in world units.
pub const MIN_NOTE_WIDTH: f64 = 150.0;

/// Smallest height a note can be resized to, in world units.
pub const MIN_NOTE_HEIGHT: f64 = 100.0;

/// Width and height of a freshly added note.
pub const DEFAULT_NOTE_SIZE: f64 = 200.0;

/// Text placed in a freshly added note.
pub const DEFAULT_NOTE_CONTENT: &str = "New note";

// ── Stacking ────────────────────────────────────────────────────

/// Largest `z_index` a stored note may carry. Leaves headroom so raising
/// and adding on top never overflow.
pub const MAX_Z_INDEX: i64 = 1 << 48;

/// Smallest `z_index` a stored note may carry.
pub const MIN_Z_INDEX: i64 = -MAX_Z_INDEX;

// ── Placement ───────────────────────────────────────────────────

/// Left/top margin kept free when picking a random spot for a new note.
pub const PLACEMENT_MARGIN: f64 = 100.0;

/// Right/bottom gutter between a new note and the placement area edge.
pub const PLACEMENT_GUTTER: f64 = 20.0;

// ── Zoom ────────────────────────────────────────────────────────

/// Lower bound of the view zoom level.
pub const MIN_ZOOM: f64 = 0.5;

/// Upper bound of the view zoom level.
pub const MAX_ZOOM: f64 = 2.0;

/// Zoom change applied by one zoom-in / zoom-out step.
pub const ZOOM_STEP: f64 = 0.1;

// ── Coalescing ──────────────────────────────────────────────────

/// Idle time after the latest edit before the pending value commits.
pub const COMMIT_IDLE_MS: u64 = 500;

/// Time since the last commit after which a new edit commits immediately.
pub const COMMIT_MAX_WAIT_MS: u64 = 1000;

// ── Presence ────────────────────────────────────────────────────

/// Period of the pointer sampling tick.
pub const PRESENCE_TICK_MS: u64 = 500;

/// Per-axis displacement that must be exceeded before a new pointer sample is published.
pub const PRESENCE_MIN_DELTA: f64 = 20.0;

/// Presence rows older than this are hidden from the peer set.
pub const PRESENCE_TTL_MS: i64 = 5 * 60 * 1000;

/// Characters of the peer id shown on the cursor label.
pub const PEER_LABEL_LEN: usize = 6;

/// Characters of the peer id shown in the avatar bubble.
pub const PEER_INITIALS_LEN: usize = 2;
