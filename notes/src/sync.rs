//! Reconciliation between the remote note stream and local optimistic state.
//!
//! DESIGN
//! ======
//! Three layers decide what a note looks like on screen, highest first:
//!
//! 1. **Override**: the working copy of a note under an active local gesture.
//!    Incoming remote values for that note are ignored until the gesture ends.
//! 2. **Echo**: a local write that has been sent but not yet seen in a remote
//!    snapshot. Upsert echoes clear once the remote row equals the echo or is
//!    strictly newer; delete tombstones clear once a snapshot no longer
//!    carries the id. An older local write landing never clears a newer echo
//!    that carries the same timestamp.
//! 3. **Remote**: the latest live-query snapshot, adopted verbatim.
//!
//! Stacking is by `z_index`, ties broken by raise recency so a note raised a
//! moment ago sits above an equal-z note raised earlier.

#[cfg(test)]
#[path = "sync_test.rs"]
mod sync_test;

use std::collections::HashMap;

use crate::consts::MAX_Z_INDEX;
use crate::doc::{Note, NoteId};

#[derive(Debug, Clone, PartialEq)]
enum Echo {
    Upsert(Note),
    Deleted,
}

/// Per-session merge of remote snapshots, local echoes, and gesture overrides.
#[derive(Debug, Default)]
pub struct SyncBridge {
    remote: HashMap<NoteId, Note>,
    overrides: HashMap<NoteId, Note>,
    echoes: HashMap<NoteId, Echo>,
    raised: HashMap<NoteId, u64>,
    raise_seq: u64,
    snapshots: u64,
}

impl SyncBridge {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the remote layer with a fresh snapshot.
    ///
    /// Returns `true` for the first snapshot the bridge has seen.
    pub fn apply_remote_snapshot(&mut self, notes: Vec<Note>) -> bool {
        self.remote = notes.into_iter().map(|n| (n.id, n)).collect();
        let remote = &self.remote;
        self.echoes.retain(|id, echo| match echo {
            Echo::Upsert(local) => remote.get(id).is_none_or(|r| r != local && r.updated_at <= local.updated_at),
            Echo::Deleted => remote.contains_key(id),
        });
        self.raised.retain(|id, _| remote.contains_key(id) || self.echoes.contains_key(id));
        self.snapshots += 1;
        self.snapshots == 1
    }

    /// Whether any remote snapshot has arrived yet.
    #[must_use]
    pub fn has_snapshot(&self) -> bool {
        self.snapshots > 0
    }

    /// Start ignoring remote values for `note.id`.
    pub fn begin_override(&mut self, note: Note) {
        self.overrides.insert(note.id, note);
    }

    /// Update the working copy. Ignored if no override is active for the note.
    pub fn update_override(&mut self, note: &Note) {
        if let Some(slot) = self.overrides.get_mut(&note.id) {
            slot.clone_from(note);
        }
    }

    /// Stop overriding `id`. Returns the last working copy.
    pub fn end_override(&mut self, id: &NoteId) -> Option<Note> {
        self.overrides.remove(id)
    }

    #[must_use]
    pub fn is_overridden(&self, id: &NoteId) -> bool {
        self.overrides.contains_key(id)
    }

    /// Show a local insert/update until the remote stream catches up.
    pub fn record_echo(&mut self, note: Note) {
        self.echoes.insert(note.id, Echo::Upsert(note));
    }

    /// Hide a locally deleted note until the remote stream drops it.
    pub fn record_delete(&mut self, id: NoteId) {
        self.overrides.remove(&id);
        self.echoes.insert(id, Echo::Deleted);
    }

    /// Forget the echo for `id`, falling back to the remote value (a write was refused).
    pub fn drop_echo(&mut self, id: &NoteId) -> bool {
        self.echoes.remove(id).is_some()
    }

    /// Whether a local write for `id` has not yet been seen remotely.
    #[must_use]
    pub fn has_echo(&self, id: &NoteId) -> bool {
        self.echoes.contains_key(id)
    }

    #[must_use]
    pub fn pending_echoes(&self) -> usize {
        self.echoes.len()
    }

    /// The note as currently rendered, if it is visible.
    #[must_use]
    pub fn note(&self, id: &NoteId) -> Option<&Note> {
        if let Some(note) = self.overrides.get(id) {
            return Some(note);
        }
        match self.echoes.get(id) {
            Some(Echo::Upsert(note)) => Some(note),
            Some(Echo::Deleted) => None,
            None => self.remote.get(id),
        }
    }

    /// The note as last delivered by the remote stream, ignoring local layers.
    #[must_use]
    pub fn remote_note(&self, id: &NoteId) -> Option<&Note> {
        self.remote.get(id)
    }

    /// Every visible note, bottom of the stack first.
    #[must_use]
    pub fn rendered(&self) -> Vec<Note> {
        let mut ids: Vec<NoteId> = self.remote.keys().copied().collect();
        ids.extend(self.echoes.keys().filter(|id| !self.remote.contains_key(id)).copied());
        let mut notes: Vec<Note> = ids.iter().filter_map(|id| self.note(id)).cloned().collect();
        notes.sort_by(|a, b| {
            a.z_index
                .cmp(&b.z_index)
                .then_with(|| self.raise_rank(&a.id).cmp(&self.raise_rank(&b.id)))
                .then_with(|| a.created_at.cmp(&b.created_at))
                .then_with(|| a.id.cmp(&b.id))
        });
        notes
    }

    /// Highest visible `z_index`, or `None` for an empty board.
    #[must_use]
    pub fn max_z_index(&self) -> Option<i64> {
        self.rendered().iter().map(|n| n.z_index).max()
    }

    /// Bring `id` to the front.
    ///
    /// Returns the raised copy (not yet written anywhere) when the note was
    /// below the current maximum; `None` when it is unknown, already on top,
    /// or the stack has reached [`MAX_Z_INDEX`].
    pub fn raise(&mut self, id: &NoteId) -> Option<Note> {
        let current = self.note(id)?.clone();
        let max = self.max_z_index()?;
        if current.z_index >= max {
            return None;
        }
        let z_index = max.checked_add(1).filter(|z| *z <= MAX_Z_INDEX)?;
        self.raise_seq += 1;
        self.raised.insert(*id, self.raise_seq);
        Some(Note { z_index, ..current })
    }

    fn raise_rank(&self, id: &NoteId) -> u64 {
        self.raised.get(id).copied().unwrap_or(0)
    }
}
