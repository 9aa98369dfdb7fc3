//! Gesture state machine: dragging, resizing, and editing a single note.
//!
//! This module replaces ad hoc listener add/remove pairs with one lifecycle.
//! `GestureMachine` is either `Idle` or tracking exactly one gesture on one
//! note. Entering a gesture acquires a [`ListenerLease`] from the host (the
//! document-level pointer listeners); the lease lives inside the active state
//! and detaches on drop, so every exit path releases it: `end`, starting a new
//! gesture, or dropping the machine when the session is torn down.
//!
//! Every entry point runs the ownership gate. A refused gesture leaves the
//! machine untouched.

#[cfg(test)]
#[path = "gesture_test.rs"]
mod gesture_test;

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::doc::{ActorId, Note, NoteId, Point, Size};
use crate::gate::authorize;

/// Which kind of gesture is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GestureKind {
    Drag,
    Resize,
    Edit,
}

/// Receives listener attach/detach notifications for the lifetime of a gesture.
pub trait ListenerHost: Send + Sync {
    fn attach(&self, kind: GestureKind);
    fn detach(&self, kind: GestureKind);
}

/// Host for headless sessions with no listeners to manage.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoListeners;

impl ListenerHost for NoListeners {
    fn attach(&self, _kind: GestureKind) {}
    fn detach(&self, _kind: GestureKind) {}
}

/// Listeners attached for exactly one gesture. Detaches on drop.
pub struct ListenerLease {
    host: Arc<dyn ListenerHost>,
    kind: GestureKind,
}

impl ListenerLease {
    #[must_use]
    pub fn acquire(host: &Arc<dyn ListenerHost>, kind: GestureKind) -> Self {
        host.attach(kind);
        Self { host: Arc::clone(host), kind }
    }
}

impl Drop for ListenerLease {
    fn drop(&mut self) {
        self.host.detach(self.kind);
    }
}

impl fmt::Debug for ListenerLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerLease").field("kind", &self.kind).finish()
    }
}

/// Internal state of the machine.
///
/// Each active variant carries the working copy of the note and the lease.
#[derive(Debug, Default)]
pub enum GestureState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// Moving a note with the pointer.
    Dragging {
        note: Note,
        /// Pointer position at the previous event, used to compute deltas.
        last_pointer: Point,
        lease: ListenerLease,
    },
    /// Resizing a note from its bottom-right handle.
    Resizing { note: Note, lease: ListenerLease },
    /// Editing the note's text.
    Editing { note: Note, lease: ListenerLease },
}

/// A finished gesture and the terminal value it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Ended {
    pub kind: GestureKind,
    pub note: Note,
}

/// Result of trying to start a gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum Begin {
    /// The gate refused; nothing changed.
    Refused,
    /// The gesture started. Carries the gesture it displaced, if one was active.
    Started { previous: Option<Ended> },
}

/// Drag / resize / edit lifecycle for the local actor.
pub struct GestureMachine {
    host: Arc<dyn ListenerHost>,
    state: GestureState,
}

impl GestureMachine {
    #[must_use]
    pub fn new(host: Arc<dyn ListenerHost>) -> Self {
        Self { host, state: GestureState::Idle }
    }

    /// Start a gesture on `note` if `actor` owns it.
    pub fn begin(&mut self, kind: GestureKind, note: Note, pointer: Point, actor: Option<&ActorId>) -> Begin {
        if !actor.is_some_and(|a| authorize(&note, a)) {
            return Begin::Refused;
        }
        let previous = self.end();
        let lease = ListenerLease::acquire(&self.host, kind);
        self.state = match kind {
            GestureKind::Drag => GestureState::Dragging { note, last_pointer: pointer, lease },
            GestureKind::Resize => GestureState::Resizing { note, lease },
            GestureKind::Edit => GestureState::Editing { note, lease },
        };
        Begin::Started { previous }
    }

    /// Feed a pointer move. Returns the updated working note for drag/resize.
    pub fn pointer_move(&mut self, pointer: Point) -> Option<&Note> {
        match &mut self.state {
            GestureState::Dragging { note, last_pointer, .. } => {
                let dx = pointer.x - last_pointer.x;
                let dy = pointer.y - last_pointer.y;
                note.position = Point::new((note.position.x + dx).max(0.0), (note.position.y + dy).max(0.0));
                *last_pointer = pointer;
                Some(note)
            }
            GestureState::Resizing { note, .. } => {
                note.size = Size::floored(pointer.x - note.position.x, pointer.y - note.position.y);
                Some(note)
            }
            GestureState::Idle | GestureState::Editing { .. } => None,
        }
    }

    /// Replace the text of the note being edited.
    pub fn type_text(&mut self, text: &str) -> Option<&Note> {
        match &mut self.state {
            GestureState::Editing { note, .. } => {
                text.clone_into(&mut note.content);
                Some(note)
            }
            _ => None,
        }
    }

    /// Finish the active gesture, releasing its listeners.
    pub fn end(&mut self) -> Option<Ended> {
        match std::mem::take(&mut self.state) {
            GestureState::Idle => None,
            GestureState::Dragging { note, .. } => Some(Ended { kind: GestureKind::Drag, note }),
            GestureState::Resizing { note, .. } => Some(Ended { kind: GestureKind::Resize, note }),
            GestureState::Editing { note, .. } => Some(Ended { kind: GestureKind::Edit, note }),
        }
    }

    /// Finish the gesture only if it targets `id` (the note vanished remotely, for example).
    pub fn end_if_targets(&mut self, id: &NoteId) -> Option<Ended> {
        if self.active_id() == Some(*id) { self.end() } else { None }
    }

    /// Kind of the active gesture.
    #[must_use]
    pub fn kind(&self) -> Option<GestureKind> {
        match self.state {
            GestureState::Idle => None,
            GestureState::Dragging { .. } => Some(GestureKind::Drag),
            GestureState::Resizing { .. } => Some(GestureKind::Resize),
            GestureState::Editing { .. } => Some(GestureKind::Edit),
        }
    }

    /// Working copy of the note under the active gesture.
    #[must_use]
    pub fn active_note(&self) -> Option<&Note> {
        match &self.state {
            GestureState::Idle => None,
            GestureState::Dragging { note, .. }
            | GestureState::Resizing { note, .. }
            | GestureState::Editing { note, .. } => Some(note),
        }
    }

    #[must_use]
    pub fn active_id(&self) -> Option<NoteId> {
        self.active_note().map(|n| n.id)
    }

    #[must_use]
    pub fn state(&self) -> &GestureState {
        &self.state
    }
}

impl fmt::Debug for GestureMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GestureMachine").field("state", &self.state).finish_non_exhaustive()
    }
}
