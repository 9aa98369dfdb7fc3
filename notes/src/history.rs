//! Note history: a reducer over the session's notes with linear undo/redo.
//!
//! DESIGN
//! ======
//! `reduce` is a pure transition `(HistoryState, HistoryAction) -> HistoryState`.
//! Content actions (add/update/delete) snapshot the full note set onto `past`
//! and clear `future`; view actions (color/zoom) never touch history. Undo and
//! redo move whole snapshots between the two stacks, so the timeline is always
//! linear: there is no way to produce a redo branch.
//!
//! STALE TARGETS
//! =============
//! An update or delete naming an id that is not present returns the state
//! unchanged and pushes no snapshot. Undo after such a no-op therefore restores
//! the state before the last *effective* mutation. Adding an id that is already
//! present is treated the same way.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use std::collections::VecDeque;

use serde::Serialize;

use crate::consts::{MAX_ZOOM, MIN_ZOOM, ZOOM_STEP};
use crate::doc::{Note, NoteColor, NoteId};

/// The closed set of actions the reducer understands.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryAction {
    Add(Note),
    Update(Note),
    Delete(NoteId),
    SetColor(NoteColor),
    SetZoom(f64),
    Undo,
    Redo,
}

impl HistoryAction {
    /// Whether the action changes note content (and therefore history).
    #[must_use]
    pub fn is_content(&self) -> bool {
        matches!(self, Self::Add(_) | Self::Update(_) | Self::Delete(_))
    }
}

/// Purely local view settings. Not part of history, not replicated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewState {
    pub selected_color: NoteColor,
    pub zoom_level: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self { selected_color: NoteColor::default(), zoom_level: 1.0 }
    }
}

impl ViewState {
    /// Zoom level one step in, clamped to the allowed range.
    #[must_use]
    pub fn zoomed_in(&self) -> f64 {
        clamp_zoom(self.zoom_level + ZOOM_STEP)
    }

    /// Zoom level one step out, clamped to the allowed range.
    #[must_use]
    pub fn zoomed_out(&self) -> f64 {
        clamp_zoom(self.zoom_level - ZOOM_STEP)
    }

    /// Zoom level as a rounded percentage for the toolbar label.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn zoom_percent(&self) -> i64 {
        (self.zoom_level * 100.0).round() as i64
    }
}

/// Clamp a requested zoom into `[MIN_ZOOM, MAX_ZOOM]`. Non-finite input resets to 1.0.
#[must_use]
pub fn clamp_zoom(level: f64) -> f64 {
    if level.is_finite() { level.clamp(MIN_ZOOM, MAX_ZOOM) } else { 1.0 }
}

/// Past and future snapshots of the note set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    /// Snapshots taken before each content action, oldest first.
    pub past: Vec<Vec<Note>>,
    /// Snapshots undone, most recently undone first.
    pub future: VecDeque<Vec<Note>>,
}

/// Full reducer state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryState {
    pub notes: Vec<Note>,
    pub view: ViewState,
    pub history: History,
}

impl HistoryState {
    fn position(&self, id: &NoteId) -> Option<usize> {
        self.notes.iter().position(|n| n.id == *id)
    }

    fn push_snapshot(&mut self) {
        self.history.past.push(self.notes.clone());
        self.history.future.clear();
    }
}

/// Apply one action. Pure: the same state and action always yield the same result.
#[must_use]
pub fn reduce(mut state: HistoryState, action: HistoryAction) -> HistoryState {
    match action {
        HistoryAction::Add(note) => {
            if state.position(&note.id).is_some() {
                return state;
            }
            state.push_snapshot();
            state.notes.push(note);
        }
        HistoryAction::Update(note) => {
            let Some(index) = state.position(&note.id) else {
                return state;
            };
            state.push_snapshot();
            state.notes[index] = note;
        }
        HistoryAction::Delete(id) => {
            let Some(index) = state.position(&id) else {
                return state;
            };
            state.push_snapshot();
            state.notes.remove(index);
        }
        HistoryAction::SetColor(color) => {
            state.view.selected_color = color;
        }
        HistoryAction::SetZoom(level) => {
            state.view.zoom_level = clamp_zoom(level);
        }
        HistoryAction::Undo => {
            let Some(previous) = state.history.past.pop() else {
                return state;
            };
            let replaced = std::mem::replace(&mut state.notes, previous);
            state.history.future.push_front(replaced);
        }
        HistoryAction::Redo => {
            let Some(next) = state.history.future.pop_front() else {
                return state;
            };
            let replaced = std::mem::replace(&mut state.notes, next);
            state.history.past.push(replaced);
        }
    }
    state
}

/// Owned per-session history store. Actions are applied strictly in dispatch order.
#[derive(Debug, Default)]
pub struct HistoryStore {
    state: HistoryState,
}

impl HistoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `action`. Returns `true` if it was a content action that took
    /// effect or an undo/redo that moved through history.
    pub fn dispatch(&mut self, action: HistoryAction) -> bool {
        let before_len = (self.state.history.past.len(), self.state.history.future.len());
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, action);
        let after_len = (self.state.history.past.len(), self.state.history.future.len());
        before_len != after_len
    }

    /// Seed the current set with notes that are not yet known, without touching history.
    ///
    /// Used once when a session first sees the remote note set, so notes the
    /// actor created in an earlier session can be edited and undone.
    pub fn hydrate(&mut self, notes: impl IntoIterator<Item = Note>) {
        for note in notes {
            if self.state.position(&note.id).is_none() {
                self.state.notes.push(note);
            }
        }
    }

    #[must_use]
    pub fn state(&self) -> &HistoryState {
        &self.state
    }

    #[must_use]
    pub fn notes(&self) -> &[Note] {
        &self.state.notes
    }

    #[must_use]
    pub fn view(&self) -> ViewState {
        self.state.view
    }

    #[must_use]
    pub fn note(&self, id: &NoteId) -> Option<&Note> {
        self.state.notes.iter().find(|n| n.id == *id)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.state.history.past.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.state.history.future.is_empty()
    }

    /// `(past, future)` stack depths.
    #[must_use]
    pub fn depth(&self) -> (usize, usize) {
        (self.state.history.past.len(), self.state.history.future.len())
    }
}
