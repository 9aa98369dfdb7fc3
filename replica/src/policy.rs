//! Row-level access rules.
//!
//! - notes: only the creator may insert (as themselves), update, or delete a
//!   row, and `created_by` can never change after insert;
//! - presence: an actor may only write their own row.
//!
//! Rows are also validated here, so nothing malformed reaches a live query.

#[cfg(test)]
#[path = "policy_test.rs"]
mod policy_test;

use notes::doc::{ActorId, Note};
use notes::row::{NoteRow, PresenceRow};

use crate::StoreError;

fn forbidden(actor: &ActorId, op: &'static str, id: &str) -> StoreError {
    StoreError::Forbidden { actor: actor.clone(), op, id: id.to_owned() }
}

fn validate(row: &NoteRow) -> Result<(), StoreError> {
    Note::try_from(row.clone())?;
    Ok(())
}

/// # Errors
///
/// `Invalid` for a malformed row, `Forbidden` when `actor` is not `created_by`.
pub fn check_insert(actor: &ActorId, row: &NoteRow) -> Result<(), StoreError> {
    validate(row)?;
    if row.created_by != actor.as_str() {
        return Err(forbidden(actor, "insert", &row.id));
    }
    Ok(())
}

/// # Errors
///
/// `Invalid` for a malformed row, `Forbidden` for a non-owner or an owner change.
pub fn check_update(actor: &ActorId, existing: &NoteRow, row: &NoteRow) -> Result<(), StoreError> {
    validate(row)?;
    if existing.created_by != actor.as_str() {
        return Err(forbidden(actor, "update", &row.id));
    }
    if row.created_by != existing.created_by {
        return Err(forbidden(actor, "reassign", &row.id));
    }
    Ok(())
}

/// # Errors
///
/// `Forbidden` when `actor` did not create the row.
pub fn check_delete(actor: &ActorId, existing: &NoteRow) -> Result<(), StoreError> {
    if existing.created_by != actor.as_str() {
        return Err(forbidden(actor, "delete", &existing.id));
    }
    Ok(())
}

/// # Errors
///
/// `Invalid` for a malformed row, `Forbidden` when writing someone else's presence.
pub fn check_presence(actor: &ActorId, row: &PresenceRow) -> Result<(), StoreError> {
    row.validate()?;
    if row.user_id != actor.as_str() {
        return Err(forbidden(actor, "write presence for", &row.user_id));
    }
    Ok(())
}
