//! Document model: notes, their geometry, and the actors that own them.
//!
//! This module defines the core data types that describe what is on the canvas
//! (`Note`, `NoteColor`), the geometry they carry (`Point`, `Size`), and the
//! identity of the actor that created them (`ActorId`). Notes enter this layer
//! from two directions: from the replicated store (validated in [`crate::row`])
//! and from local gestures (built with [`Note::new`]).

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::{
    DEFAULT_NOTE_CONTENT, DEFAULT_NOTE_SIZE, MAX_Z_INDEX, MIN_NOTE_HEIGHT, MIN_NOTE_WIDTH, PLACEMENT_GUTTER, PLACEMENT_MARGIN,
};

/// Unique identifier for a note.
pub type NoteId = Uuid;

/// Durable identifier of an actor (signed-in user).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActorId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// The fixed palette a note can be painted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteColor {
    #[default]
    Yellow,
    Pink,
    Blue,
    Green,
}

impl NoteColor {
    /// Every color, in toolbar order.
    pub const ALL: [Self; 4] = [Self::Yellow, Self::Pink, Self::Blue, Self::Green];

    /// Wire name used in store rows.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yellow => "yellow",
            Self::Pink => "pink",
            Self::Blue => "blue",
            Self::Green => "green",
        }
    }

    /// Parse a wire name. Returns `None` for anything outside the palette.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }
}

/// A point in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Width and height of a note. Always at least the minimum note size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    /// Build a size, flooring each axis at the minimum note dimensions.
    #[must_use]
    pub fn floored(width: f64, height: f64) -> Self {
        Self { width: width.max(MIN_NOTE_WIDTH), height: height.max(MIN_NOTE_HEIGHT) }
    }
}

impl Default for Size {
    fn default() -> Self {
        Self { width: DEFAULT_NOTE_SIZE, height: DEFAULT_NOTE_SIZE }
    }
}

/// A note as held by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Unique identifier for this note.
    pub id: NoteId,
    /// Free text shown on the note.
    pub content: String,
    /// Palette color.
    pub color: NoteColor,
    /// Top-left corner in world coordinates.
    pub position: Point,
    /// Bounding box dimensions.
    pub size: Size,
    /// Stacking order; higher values are drawn above lower values.
    pub z_index: i64,
    /// Actor that created the note. Never changes.
    pub owner: ActorId,
    /// Creation time, epoch milliseconds.
    pub created_at: i64,
    /// Last modification time, epoch milliseconds.
    pub updated_at: i64,
}

impl Note {
    /// Build a fresh note with the default content and size.
    #[must_use]
    pub fn new(owner: ActorId, color: NoteColor, position: Point, z_index: i64, now_ms: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: DEFAULT_NOTE_CONTENT.to_owned(),
            color,
            position,
            size: Size::default(),
            z_index,
            owner,
            created_at: now_ms,
            updated_at: now_ms,
        }
    }

    /// Same note with `updated_at` bumped.
    #[must_use]
    pub fn touched(mut self, now_ms: i64) -> Self {
        self.updated_at = now_ms;
        self
    }
}

/// Stacking value for a note added on top of `notes`: `max(z, 0) + 1`,
/// capped at [`MAX_Z_INDEX`]. At the cap the new note ties with the top.
#[must_use]
pub fn next_z_index<'a>(notes: impl IntoIterator<Item = &'a Note>) -> i64 {
    notes.into_iter().map(|n| n.z_index).fold(0, i64::max).saturating_add(1).min(MAX_Z_INDEX)
}

/// Area new notes are scattered over, usually the visible viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementArea {
    pub width: f64,
    pub height: f64,
}

impl PlacementArea {
    /// Pick a random top-left corner so a note of `size` lands fully inside the area.
    ///
    /// Coordinates are whole numbers in `[margin, max(extent - size - gutter, margin)]`.
    pub fn random_position<R: Rng + ?Sized>(&self, rng: &mut R, size: Size) -> Point {
        let max_x = (self.width - size.width - PLACEMENT_GUTTER).max(PLACEMENT_MARGIN);
        let max_y = (self.height - size.height - PLACEMENT_GUTTER).max(PLACEMENT_MARGIN);
        Point::new(pick(rng, max_x), pick(rng, max_y))
    }
}

fn pick<R: Rng + ?Sized>(rng: &mut R, max: f64) -> f64 {
    let span = (max - PLACEMENT_MARGIN).floor();
    if span < 1.0 {
        return PLACEMENT_MARGIN;
    }
    PLACEMENT_MARGIN + rng.random_range(0.0..span).floor()
}
