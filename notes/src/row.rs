//! Store rows: the fixed-field records that cross the replication boundary.
//!
//! Rows mirror the replicated store's tables column for column. They are
//! converted into domain types exactly once, here, so the rest of the engine
//! never sees an unvalidated payload. Conversion rejects unknown colors,
//! non-finite numbers, out-of-range stacking values, and malformed ids; undersized notes are floored rather
//! than rejected because an older client may have written them.

#[cfg(test)]
#[path = "row_test.rs"]
mod row_test;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::{MAX_Z_INDEX, MIN_Z_INDEX};
use crate::doc::{ActorId, Note, NoteColor, Point, Size};

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RowError {
    #[error("invalid note id: {0:?}")]
    InvalidId(String),
    #[error("unknown note color: {0:?}")]
    UnknownColor(String),
    #[error("field {field} is not a finite number")]
    NonFinite { field: &'static str },
    #[error("field {field} value {value} is out of range")]
    OutOfRange { field: &'static str, value: i64 },
    #[error("field {field} must not be empty")]
    Empty { field: &'static str },
    #[error("malformed row payload: {0}")]
    Payload(#[from] serde_json::Error),
}

// =============================================================================
// NOTE ROW
// =============================================================================

/// One row of the replicated `notes` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteRow {
    pub id: String,
    pub content: String,
    pub position_x: f64,
    pub position_y: f64,
    pub size_width: f64,
    pub size_height: f64,
    pub z_index: i64,
    pub color: String,
    pub created_by: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl NoteRow {
    /// Parse a loosely-typed payload (as delivered by a live query) into a row.
    ///
    /// # Errors
    ///
    /// Returns [`RowError::Payload`] if a column is missing or has the wrong type.
    pub fn from_value(value: serde_json::Value) -> Result<Self, RowError> {
        Ok(serde_json::from_value(value)?)
    }
}

impl From<&Note> for NoteRow {
    fn from(note: &Note) -> Self {
        Self {
            id: note.id.to_string(),
            content: note.content.clone(),
            position_x: note.position.x,
            position_y: note.position.y,
            size_width: note.size.width,
            size_height: note.size.height,
            z_index: note.z_index,
            color: note.color.as_str().to_owned(),
            created_by: note.owner.as_str().to_owned(),
            created_at: note.created_at,
            updated_at: note.updated_at,
        }
    }
}

impl TryFrom<NoteRow> for Note {
    type Error = RowError;

    fn try_from(row: NoteRow) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&row.id).map_err(|_| RowError::InvalidId(row.id.clone()))?;
        let color = NoteColor::parse(&row.color).ok_or_else(|| RowError::UnknownColor(row.color.clone()))?;
        if row.created_by.is_empty() {
            return Err(RowError::Empty { field: "created_by" });
        }
        let position = Point::new(finite("position_x", row.position_x)?, finite("position_y", row.position_y)?);
        let size = Size::floored(finite("size_width", row.size_width)?, finite("size_height", row.size_height)?);
        if !(MIN_Z_INDEX..=MAX_Z_INDEX).contains(&row.z_index) {
            return Err(RowError::OutOfRange { field: "z_index", value: row.z_index });
        }

        Ok(Self {
            id,
            content: row.content,
            color,
            position,
            size,
            z_index: row.z_index,
            owner: ActorId::new(row.created_by),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// =============================================================================
// PRESENCE ROW
// =============================================================================

/// One row of the replicated `presence` table, keyed by `user_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceRow {
    pub user_id: String,
    pub x: f64,
    pub y: f64,
    pub updated_at: i64,
}

impl PresenceRow {
    /// Build a presence row for `actor` at `point`.
    #[must_use]
    pub fn new(actor: &ActorId, point: Point, now_ms: i64) -> Self {
        Self { user_id: actor.as_str().to_owned(), x: point.x, y: point.y, updated_at: now_ms }
    }

    /// Check the row before it is trusted for rendering.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty `user_id` or non-finite coordinates.
    pub fn validate(&self) -> Result<(), RowError> {
        if self.user_id.is_empty() {
            return Err(RowError::Empty { field: "user_id" });
        }
        finite("x", self.x)?;
        finite("y", self.y)?;
        Ok(())
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Convert a batch of rows, keeping the valid ones and returning the rejects.
#[must_use]
pub fn notes_from_rows<I>(rows: I) -> (Vec<Note>, Vec<RowError>)
where
    I: IntoIterator<Item = NoteRow>,
{
    let mut notes = Vec::new();
    let mut rejected = Vec::new();
    for row in rows {
        match Note::try_from(row) {
            Ok(note) => notes.push(note),
            Err(e) => rejected.push(e),
        }
    }
    (notes, rejected)
}

fn finite(field: &'static str, value: f64) -> Result<f64, RowError> {
    if value.is_finite() { Ok(value) } else { Err(RowError::NonFinite { field }) }
}
