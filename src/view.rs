//! Render model published by a session.

use notes::doc::{ActorId, Note, NoteId};
use notes::gate::Appearance;
use notes::gesture::GestureKind;
use notes::history::ViewState;
use notes::presence::{Peer, collaborator_label};
use serde::Serialize;

/// One note as the UI should draw it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteView {
    #[serde(flatten)]
    pub note: Note,
    pub appearance: Appearance,
    /// Gesture the local actor currently has on this note.
    pub gesture: Option<GestureKind>,
}

/// Everything a board UI needs, bottom-most note first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoardView {
    pub actor: Option<ActorId>,
    pub notes: Vec<NoteView>,
    pub peers: Vec<Peer>,
    pub collaborators: String,
    pub view: ViewState,
    pub zoom_percent: i64,
    pub can_undo: bool,
    pub can_redo: bool,
}

impl BoardView {
    #[must_use]
    pub fn note(&self, id: &NoteId) -> Option<&NoteView> {
        self.notes.iter().find(|n| n.note.id == *id)
    }

    #[must_use]
    pub fn peer(&self, user_id: &str) -> Option<&Peer> {
        self.peers.iter().find(|p| p.user_id.as_str() == user_id)
    }

    pub(crate) fn with_peers(mut self, peers: Vec<Peer>) -> Self {
        self.collaborators = collaborator_label(peers.len());
        self.peers = peers;
        self
    }
}
