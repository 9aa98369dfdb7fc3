use super::*;
use notes::doc::{NoteColor, Point};
use notes::row::RowError;

fn row_by(owner: &str) -> NoteRow {
    let note = Note::new(ActorId::from(owner), NoteColor::Green, Point::new(120.0, 140.0), 1, 1_000);
    NoteRow::from(&note)
}

fn alice() -> ActorId {
    ActorId::from("alice")
}

#[test]
fn creator_may_insert() {
    assert!(check_insert(&alice(), &row_by("alice")).is_ok());
}

#[test]
fn insert_as_someone_else_is_forbidden() {
    let err = check_insert(&alice(), &row_by("bob")).unwrap_err();
    assert!(matches!(err, StoreError::Forbidden { op: "insert", .. }));
}

#[test]
fn malformed_row_is_invalid() {
    let mut row = row_by("alice");
    row.color = "purple".to_owned();
    assert!(matches!(check_insert(&alice(), &row), Err(StoreError::Invalid(_))));
}

#[test]
fn unbounded_z_index_is_invalid() {
    let mut row = row_by("alice");
    row.z_index = i64::MAX;
    assert!(matches!(check_insert(&alice(), &row), Err(StoreError::Invalid(RowError::OutOfRange { .. }))));

    let existing = row_by("alice");
    assert!(matches!(check_update(&alice(), &existing, &row), Err(StoreError::Invalid(_))));
}

#[test]
fn non_owner_update_is_forbidden() {
    let existing = row_by("bob");
    let err = check_update(&alice(), &existing, &existing).unwrap_err();
    assert!(matches!(err, StoreError::Forbidden { op: "update", .. }));
}

#[test]
fn owner_change_is_forbidden() {
    let existing = row_by("alice");
    let mut row = existing.clone();
    row.created_by = "bob".to_owned();
    let err = check_update(&alice(), &existing, &row).unwrap_err();
    assert!(matches!(err, StoreError::Forbidden { op: "reassign", .. }));
}

#[test]
fn owner_update_is_allowed() {
    let existing = row_by("alice");
    let mut row = existing.clone();
    row.content = "edited".to_owned();
    assert!(check_update(&alice(), &existing, &row).is_ok());
}

#[test]
fn only_creator_may_delete() {
    assert!(check_delete(&alice(), &row_by("alice")).is_ok());
    assert!(check_delete(&alice(), &row_by("bob")).is_err());
}

#[test]
fn presence_is_self_only() {
    let own = PresenceRow::new(&alice(), Point::new(1.0, 2.0), 0);
    let other = PresenceRow::new(&ActorId::from("bob"), Point::new(1.0, 2.0), 0);
    assert!(check_presence(&alice(), &own).is_ok());
    assert!(matches!(check_presence(&alice(), &other), Err(StoreError::Forbidden { .. })));
}
