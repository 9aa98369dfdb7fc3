#![allow(clippy::float_cmp)]

use std::sync::Mutex;

use super::*;
use crate::doc::NoteColor;

/// Records attach/detach calls so tests can check listeners never leak.
#[derive(Default)]
struct Recorder {
    log: Mutex<Vec<(&'static str, GestureKind)>>,
}

impl Recorder {
    fn attached(&self) -> usize {
        let log = self.log.lock().unwrap();
        let on = log.iter().filter(|(op, _)| *op == "attach").count();
        let off = log.iter().filter(|(op, _)| *op == "detach").count();
        on - off
    }

    fn events(&self) -> Vec<(&'static str, GestureKind)> {
        self.log.lock().unwrap().clone()
    }
}

impl ListenerHost for Recorder {
    fn attach(&self, kind: GestureKind) {
        self.log.lock().unwrap().push(("attach", kind));
    }

    fn detach(&self, kind: GestureKind) {
        self.log.lock().unwrap().push(("detach", kind));
    }
}

fn alice() -> ActorId {
    ActorId::from("alice")
}

fn note_at(x: f64, y: f64) -> Note {
    Note::new(alice(), NoteColor::Yellow, Point::new(x, y), 1, 0)
}

fn machine() -> (Arc<Recorder>, GestureMachine) {
    let recorder = Arc::new(Recorder::default());
    let host: Arc<dyn ListenerHost> = recorder.clone();
    (recorder, GestureMachine::new(host))
}

// =============================================================
// Gate
// =============================================================

#[test]
fn foreign_note_refuses_every_gesture() {
    let (recorder, mut m) = machine();
    let bob = ActorId::from("bob");
    for kind in [GestureKind::Drag, GestureKind::Resize, GestureKind::Edit] {
        assert_eq!(m.begin(kind, note_at(10.0, 10.0), Point::default(), Some(&bob)), Begin::Refused);
    }
    assert!(m.kind().is_none());
    assert!(recorder.events().is_empty());
}

#[test]
fn anonymous_actor_is_refused() {
    let (_, mut m) = machine();
    assert_eq!(m.begin(GestureKind::Drag, note_at(0.0, 0.0), Point::default(), None), Begin::Refused);
}

// =============================================================
// Drag
// =============================================================

#[test]
fn drag_applies_pointer_deltas() {
    let (_, mut m) = machine();
    m.begin(GestureKind::Drag, note_at(100.0, 100.0), Point::new(110.0, 120.0), Some(&alice()));
    let moved = m.pointer_move(Point::new(140.0, 100.0)).cloned().unwrap();
    assert_eq!(moved.position, Point::new(130.0, 80.0));
    let moved = m.pointer_move(Point::new(150.0, 110.0)).cloned().unwrap();
    assert_eq!(moved.position, Point::new(140.0, 90.0));
}

#[test]
fn drag_clamps_at_origin() {
    let (_, mut m) = machine();
    m.begin(GestureKind::Drag, note_at(10.0, 5.0), Point::new(50.0, 50.0), Some(&alice()));
    let moved = m.pointer_move(Point::new(0.0, 0.0)).cloned().unwrap();
    assert_eq!(moved.position, Point::new(0.0, 0.0));
}

#[test]
fn drag_end_returns_terminal_note() {
    let (_, mut m) = machine();
    let note = note_at(0.0, 0.0);
    let id = note.id;
    m.begin(GestureKind::Drag, note, Point::new(0.0, 0.0), Some(&alice()));
    m.pointer_move(Point::new(25.0, 35.0));
    let ended = m.end().unwrap();
    assert_eq!(ended.kind, GestureKind::Drag);
    assert_eq!(ended.note.id, id);
    assert_eq!(ended.note.position, Point::new(25.0, 35.0));
    assert!(m.end().is_none());
}

// =============================================================
// Resize
// =============================================================

#[test]
fn resize_follows_pointer_from_origin() {
    let (_, mut m) = machine();
    m.begin(GestureKind::Resize, note_at(100.0, 100.0), Point::new(300.0, 300.0), Some(&alice()));
    let resized = m.pointer_move(Point::new(420.0, 350.0)).cloned().unwrap();
    assert_eq!(resized.size, Size { width: 320.0, height: 250.0 });
}

#[test]
fn resize_never_goes_below_minimum() {
    let (_, mut m) = machine();
    m.begin(GestureKind::Resize, note_at(100.0, 100.0), Point::new(300.0, 300.0), Some(&alice()));
    let resized = m.pointer_move(Point::new(110.0, 90.0)).cloned().unwrap();
    assert_eq!(resized.size, Size { width: 150.0, height: 100.0 });
}

// =============================================================
// Edit
// =============================================================

#[test]
fn typing_replaces_content() {
    let (_, mut m) = machine();
    m.begin(GestureKind::Edit, note_at(0.0, 0.0), Point::default(), Some(&alice()));
    m.type_text("h");
    assert_eq!(m.type_text("hi").map(|n| n.content.clone()), Some("hi".to_owned()));
    assert!(m.pointer_move(Point::new(50.0, 50.0)).is_none());
    assert_eq!(m.end().unwrap().note.content, "hi");
}

#[test]
fn typing_outside_edit_is_ignored() {
    let (_, mut m) = machine();
    assert!(m.type_text("x").is_none());
    m.begin(GestureKind::Drag, note_at(0.0, 0.0), Point::default(), Some(&alice()));
    assert!(m.type_text("x").is_none());
}

// =============================================================
// Listener lifecycle
// =============================================================

#[test]
fn end_detaches_listeners() {
    let (recorder, mut m) = machine();
    m.begin(GestureKind::Drag, note_at(0.0, 0.0), Point::default(), Some(&alice()));
    assert_eq!(recorder.attached(), 1);
    m.end();
    assert_eq!(recorder.attached(), 0);
    assert_eq!(recorder.events(), vec![("attach", GestureKind::Drag), ("detach", GestureKind::Drag)]);
}

#[test]
fn new_gesture_ends_the_previous_one() {
    let (recorder, mut m) = machine();
    let first = note_at(0.0, 0.0);
    let first_id = first.id;
    m.begin(GestureKind::Edit, first, Point::default(), Some(&alice()));
    m.type_text("draft");

    let Begin::Started { previous } = m.begin(GestureKind::Drag, note_at(5.0, 5.0), Point::default(), Some(&alice()))
    else {
        panic!("second gesture refused");
    };
    let previous = previous.unwrap();
    assert_eq!(previous.kind, GestureKind::Edit);
    assert_eq!(previous.note.id, first_id);
    assert_eq!(previous.note.content, "draft");
    assert_eq!(m.kind(), Some(GestureKind::Drag));
    assert_eq!(recorder.attached(), 1);
}

#[test]
fn dropping_machine_detaches_listeners() {
    let (recorder, mut m) = machine();
    m.begin(GestureKind::Resize, note_at(0.0, 0.0), Point::default(), Some(&alice()));
    drop(m);
    assert_eq!(recorder.attached(), 0);
}

#[test]
fn end_if_targets_only_ends_matching_note() {
    let (_, mut m) = machine();
    let note = note_at(0.0, 0.0);
    let id = note.id;
    m.begin(GestureKind::Drag, note, Point::default(), Some(&alice()));
    assert!(m.end_if_targets(&NoteId::new_v4()).is_none());
    assert_eq!(m.active_id(), Some(id));
    assert!(m.end_if_targets(&id).is_some());
    assert!(m.kind().is_none());
}
