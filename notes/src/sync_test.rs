use super::*;
use crate::consts::MAX_Z_INDEX;
use crate::doc::{ActorId, NoteColor, Point};

fn note(z: i64, updated_at: i64) -> Note {
    let mut n = Note::new(ActorId::from("alice"), NoteColor::Pink, Point::new(0.0, 0.0), z, 0);
    n.updated_at = updated_at;
    n
}

fn ids(notes: &[Note]) -> Vec<NoteId> {
    notes.iter().map(|n| n.id).collect()
}

// =============================================================
// Remote snapshots
// =============================================================

#[test]
fn first_snapshot_is_reported_once() {
    let mut bridge = SyncBridge::new();
    assert!(bridge.apply_remote_snapshot(vec![]));
    assert!(!bridge.apply_remote_snapshot(vec![]));
}

#[test]
fn remote_values_are_adopted_verbatim() {
    let mut bridge = SyncBridge::new();
    let mut n = note(1, 10);
    bridge.apply_remote_snapshot(vec![n.clone()]);
    n.position = Point::new(300.0, 40.0);
    n.content = "moved elsewhere".to_owned();
    bridge.apply_remote_snapshot(vec![n.clone()]);
    assert_eq!(bridge.rendered(), vec![n]);
}

#[test]
fn rendered_is_sorted_by_z_index() {
    let mut bridge = SyncBridge::new();
    let low = note(1, 0);
    let high = note(7, 0);
    let mid = note(3, 0);
    bridge.apply_remote_snapshot(vec![high.clone(), low.clone(), mid.clone()]);
    assert_eq!(ids(&bridge.rendered()), vec![low.id, mid.id, high.id]);
}

// =============================================================
// Overrides
// =============================================================

#[test]
fn remote_update_is_ignored_mid_gesture() {
    let mut bridge = SyncBridge::new();
    let n = note(1, 10);
    bridge.apply_remote_snapshot(vec![n.clone()]);

    let mut dragged = n.clone();
    bridge.begin_override(dragged.clone());
    dragged.position = Point::new(50.0, 60.0);
    bridge.update_override(&dragged);

    let mut remote = n.clone();
    remote.position = Point::new(900.0, 900.0);
    remote.updated_at = 20;
    bridge.apply_remote_snapshot(vec![remote.clone()]);
    assert_eq!(bridge.note(&n.id).map(|x| x.position), Some(Point::new(50.0, 60.0)));

    assert_eq!(bridge.end_override(&n.id), Some(dragged));
    assert_eq!(bridge.note(&n.id), Some(&remote));
}

#[test]
fn update_without_override_is_ignored() {
    let mut bridge = SyncBridge::new();
    let n = note(1, 0);
    bridge.update_override(&n);
    assert!(!bridge.is_overridden(&n.id));
    assert!(bridge.rendered().is_empty());
}

// =============================================================
// Echoes
// =============================================================

#[test]
fn upsert_echo_shows_until_remote_catches_up() {
    let mut bridge = SyncBridge::new();
    bridge.apply_remote_snapshot(vec![]);
    let n = note(1, 100);
    bridge.record_echo(n.clone());
    assert_eq!(bridge.rendered(), vec![n.clone()]);

    bridge.apply_remote_snapshot(vec![]);
    assert_eq!(bridge.pending_echoes(), 1);

    bridge.apply_remote_snapshot(vec![n.clone()]);
    assert_eq!(bridge.pending_echoes(), 0);
    assert_eq!(bridge.rendered(), vec![n]);
}

#[test]
fn stale_remote_row_does_not_replace_newer_echo() {
    let mut bridge = SyncBridge::new();
    let old = note(1, 100);
    bridge.apply_remote_snapshot(vec![old.clone()]);

    let mut newer = old.clone();
    newer.content = "typed".to_owned();
    newer.updated_at = 200;
    bridge.record_echo(newer.clone());

    bridge.apply_remote_snapshot(vec![old]);
    assert_eq!(bridge.note(&newer.id), Some(&newer));
}

#[test]
fn same_millisecond_writes_keep_the_newer_echo() {
    let mut bridge = SyncBridge::new();
    let base = note(1, 100);
    bridge.apply_remote_snapshot(vec![base.clone()]);

    // Raise then drag end, both stamped at 200.
    let raised = Note { z_index: 2, updated_at: 200, ..base.clone() };
    let dropped = Note { position: Point::new(80.0, 90.0), ..raised.clone() };
    bridge.record_echo(raised.clone());
    bridge.record_echo(dropped.clone());

    bridge.apply_remote_snapshot(vec![raised]);
    assert_eq!(bridge.pending_echoes(), 1);
    assert_eq!(bridge.note(&base.id), Some(&dropped));

    bridge.apply_remote_snapshot(vec![dropped.clone()]);
    assert!(!bridge.has_echo(&base.id));
    assert_eq!(bridge.note(&base.id), Some(&dropped));
}

#[test]
fn strictly_newer_remote_row_clears_echo() {
    let mut bridge = SyncBridge::new();
    let base = note(1, 100);
    bridge.apply_remote_snapshot(vec![base.clone()]);
    let local = Note { content: "mine".to_owned(), updated_at: 200, ..base.clone() };
    bridge.record_echo(local);

    let theirs = Note { content: "theirs".to_owned(), updated_at: 201, ..base.clone() };
    bridge.apply_remote_snapshot(vec![theirs.clone()]);
    assert_eq!(bridge.note(&base.id), Some(&theirs));
}

#[test]
fn delete_tombstone_hides_note_until_remote_drops_it() {
    let mut bridge = SyncBridge::new();
    let n = note(1, 0);
    bridge.apply_remote_snapshot(vec![n.clone()]);
    bridge.record_delete(n.id);
    assert!(bridge.rendered().is_empty());

    bridge.apply_remote_snapshot(vec![n.clone()]);
    assert!(bridge.rendered().is_empty());

    bridge.apply_remote_snapshot(vec![]);
    assert_eq!(bridge.pending_echoes(), 0);
}

#[test]
fn dropped_echo_falls_back_to_remote() {
    let mut bridge = SyncBridge::new();
    let n = note(1, 0);
    bridge.apply_remote_snapshot(vec![n.clone()]);
    let mut local = n.clone();
    local.content = "refused".to_owned();
    local.updated_at = 5;
    bridge.record_echo(local);
    assert!(bridge.drop_echo(&n.id));
    assert_eq!(bridge.note(&n.id), Some(&n));
}

// =============================================================
// Raise
// =============================================================

#[test]
fn raise_below_max_goes_to_max_plus_one() {
    let mut bridge = SyncBridge::new();
    let a = note(3, 0);
    let b = note(5, 0);
    bridge.apply_remote_snapshot(vec![a.clone(), b]);
    let raised = bridge.raise(&a.id).unwrap();
    assert_eq!(raised.z_index, 6);
    assert_eq!(raised.id, a.id);
}

#[test]
fn raising_the_top_note_is_a_noop() {
    let mut bridge = SyncBridge::new();
    let a = note(3, 0);
    let b = note(5, 0);
    bridge.apply_remote_snapshot(vec![a, b.clone()]);
    assert!(bridge.raise(&b.id).is_none());
}

#[test]
fn raising_the_top_of_a_negative_stack_is_a_noop() {
    let mut bridge = SyncBridge::new();
    let low = note(-3, 0);
    let top = note(-1, 0);
    bridge.apply_remote_snapshot(vec![low.clone(), top.clone()]);
    assert_eq!(bridge.max_z_index(), Some(-1));
    assert!(bridge.raise(&top.id).is_none());
    assert_eq!(bridge.raise(&low.id).map(|n| n.z_index), Some(0));
}

#[test]
fn empty_board_has_no_max() {
    assert_eq!(SyncBridge::new().max_z_index(), None);
}

#[test]
fn raise_stops_at_the_ceiling() {
    let mut bridge = SyncBridge::new();
    let low = note(1, 0);
    let capped = note(MAX_Z_INDEX, 0);
    bridge.apply_remote_snapshot(vec![low.clone(), capped]);
    assert!(bridge.raise(&low.id).is_none());

    let wild = note(i64::MAX, 0);
    bridge.apply_remote_snapshot(vec![low.clone(), wild]);
    assert!(bridge.raise(&low.id).is_none());
}

#[test]
fn raise_unknown_note_is_a_noop() {
    let mut bridge = SyncBridge::new();
    assert!(bridge.raise(&NoteId::new_v4()).is_none());
}

#[test]
fn equal_z_ties_break_by_raise_recency() {
    let mut bridge = SyncBridge::new();
    let a = note(1, 0);
    let b = note(1, 0);
    let top = note(2, 0);
    bridge.apply_remote_snapshot(vec![a.clone(), b.clone(), top.clone()]);

    // Both raised to 3 by two sessions racing; the later raise renders on top.
    let mut a3 = bridge.raise(&a.id).unwrap();
    a3.updated_at = 1;
    let mut b3 = bridge.raise(&b.id).unwrap();
    b3.z_index = a3.z_index;
    b3.updated_at = 1;
    bridge.apply_remote_snapshot(vec![a3.clone(), b3.clone(), top.clone()]);
    assert_eq!(ids(&bridge.rendered()), vec![top.id, a3.id, b3.id]);
}
