#![allow(clippy::float_cmp)]

use super::*;
use crate::doc::{NoteColor, Point};
use crate::identity::{SharedIdentity, StaticIdentity};

fn note_by(owner: &str) -> Note {
    Note::new(ActorId::from(owner), NoteColor::Blue, Point::new(0.0, 0.0), 1, 0)
}

#[test]
fn owner_is_authorized() {
    assert!(authorize(&note_by("alice"), &ActorId::from("alice")));
}

#[test]
fn other_actor_is_refused() {
    assert!(!authorize(&note_by("alice"), &ActorId::from("bob")));
}

#[test]
fn gate_without_identity_refuses_everything() {
    let gate = MutationGate::new(StaticIdentity::anonymous());
    assert!(gate.actor().is_none());
    assert!(!gate.authorize(&note_by("alice")));
}

#[test]
fn gate_follows_identity_changes() {
    let identity = SharedIdentity::new(None);
    let gate = MutationGate::new(identity.clone());
    let note = note_by("alice");
    assert!(!gate.authorize(&note));

    identity.set(Some(ActorId::from("alice")));
    assert!(gate.authorize(&note));

    identity.set(Some(ActorId::from("bob")));
    assert!(!gate.authorize(&note));
}

#[test]
fn owned_note_is_editable_and_opaque() {
    let gate = MutationGate::new(StaticIdentity::signed_in(ActorId::from("alice")));
    let look = gate.appearance(&note_by("alice"), false);
    assert!(!look.read_only);
    assert_eq!(look.opacity, 1.0);
}

#[test]
fn foreign_note_is_dimmed_until_hovered() {
    let gate = MutationGate::new(StaticIdentity::signed_in(ActorId::from("bob")));
    let note = note_by("alice");

    let idle = gate.appearance(&note, false);
    assert!(idle.read_only);
    assert_eq!(idle.opacity, DIMMED_OPACITY);

    let hovered = gate.appearance(&note, true);
    assert!(hovered.read_only);
    assert_eq!(hovered.opacity, 1.0);
}
