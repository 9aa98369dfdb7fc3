//! Ownership gate for note mutations.
//!
//! Only a note's creator may move, resize, edit, restack, or delete it. The
//! gate is advisory: it suppresses gestures before they start. The replicated
//! store enforces the same rule on its side, so a hostile client that skips
//! this check is still refused.

#[cfg(test)]
#[path = "gate_test.rs"]
mod gate_test;

use serde::Serialize;

use crate::doc::{ActorId, Note};
use crate::identity::IdentityLookup;

/// Opacity of a foreign note the pointer is not over.
pub const DIMMED_OPACITY: f64 = 0.5;

/// `true` iff `actor` created `note`.
#[must_use]
pub fn authorize(note: &Note, actor: &ActorId) -> bool {
    note.owner == *actor
}

/// How a note should be presented to the current actor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Appearance {
    /// Gestures on this note are suppressed.
    pub read_only: bool,
    /// 1.0 for owned or hovered notes, dimmed otherwise.
    pub opacity: f64,
}

/// Ownership check bound to an identity source.
#[derive(Debug, Clone)]
pub struct MutationGate<I> {
    identity: I,
}

impl<I: IdentityLookup> MutationGate<I> {
    #[must_use]
    pub fn new(identity: I) -> Self {
        Self { identity }
    }

    /// The acting identity, if any.
    #[must_use]
    pub fn actor(&self) -> Option<ActorId> {
        self.identity.current_actor()
    }

    /// Whether the current actor may mutate `note`. Always `false` without an identity.
    #[must_use]
    pub fn authorize(&self, note: &Note) -> bool {
        self.actor().is_some_and(|actor| authorize(note, &actor))
    }

    /// Presentation of `note` for the current actor.
    #[must_use]
    pub fn appearance(&self, note: &Note, hovered: bool) -> Appearance {
        let owned = self.authorize(note);
        Appearance { read_only: !owned, opacity: if owned || hovered { 1.0 } else { DIMMED_OPACITY } }
    }
}
