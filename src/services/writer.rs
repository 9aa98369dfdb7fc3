//! Write queue: ordered, fire-and-forget delivery of mutations to the store.
//!
//! DESIGN
//! ======
//! The session never awaits the store. Mutations go into a bounded channel
//! with `try_send`, and a single worker applies them one at a time, so writes
//! reach the store in the order they were issued. A full or closed queue drops
//! the write with a warning; there are no retries.
//!
//! ERROR HANDLING
//! ==============
//! `NotFound` is the normal outcome of writing to a note that was already
//! deleted and is logged at debug. Anything else is a warning. Every failed
//! note write is reported back on the failure channel so the session can drop
//! the optimistic echo it was showing for that note.

#[cfg(test)]
#[path = "writer_test.rs"]
mod writer_test;

use std::sync::Arc;

use notes::doc::{ActorId, NoteId};
use notes::row::{NoteRow, PresenceRow};
use replica::{ReplicatedStore, StoreError};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// One outbound mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    InsertNote(NoteRow),
    UpdateNote(NoteRow),
    DeleteNote(NoteId),
    UpsertPresence(PresenceRow),
}

impl WriteOp {
    fn name(&self) -> &'static str {
        match self {
            Self::InsertNote(_) => "insert_note",
            Self::UpdateNote(_) => "update_note",
            Self::DeleteNote(_) => "delete_note",
            Self::UpsertPresence(_) => "upsert_presence",
        }
    }

    /// Note the op targets, if any.
    #[must_use]
    pub fn note_id(&self) -> Option<NoteId> {
        match self {
            Self::InsertNote(row) | Self::UpdateNote(row) => Uuid::parse_str(&row.id).ok(),
            Self::DeleteNote(id) => Some(*id),
            Self::UpsertPresence(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
struct Write {
    actor: ActorId,
    op: WriteOp,
}

/// A note write the store refused.
#[derive(Debug)]
pub struct WriteFailure {
    pub note_id: NoteId,
    pub op: &'static str,
    pub error: StoreError,
}

/// Sender half of the write queue. Dropping every clone stops the worker
/// once it has drained the queue.
#[derive(Debug, Clone)]
pub struct WriteQueue {
    tx: mpsc::Sender<Write>,
}

impl WriteQueue {
    /// Spawn the worker. Failed note writes are reported on `failures`.
    pub fn spawn(
        store: Arc<dyn ReplicatedStore>,
        capacity: usize,
        failures: mpsc::Sender<WriteFailure>,
    ) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<Write>(capacity.max(1));
        info!(capacity, "write queue configured");

        let worker = tokio::spawn(async move {
            while let Some(write) = rx.recv().await {
                let op = write.op.name();
                let note_id = write.op.note_id();
                if let Err(error) = apply(store.as_ref(), write).await {
                    if matches!(error, StoreError::NotFound(_)) {
                        debug!(op, code = error.error_code(), %error, "write target is gone");
                    } else {
                        warn!(op, code = error.error_code(), %error, "store rejected write");
                    }
                    if let Some(note_id) = note_id {
                        report(&failures, WriteFailure { note_id, op, error });
                    }
                }
            }
            debug!("write queue drained");
        });

        (Self { tx }, worker)
    }

    /// Best-effort, non-blocking enqueue. Returns `false` if the write was dropped.
    pub fn enqueue(&self, actor: &ActorId, op: WriteOp) -> bool {
        let name = op.name();
        match self.tx.try_send(Write { actor: actor.clone(), op }) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!(op = name, %actor, "write queue full; dropping write");
                false
            }
            Err(TrySendError::Closed(_)) => {
                warn!(op = name, %actor, "write queue closed; dropping write");
                false
            }
        }
    }
}

async fn apply(store: &dyn ReplicatedStore, write: Write) -> Result<(), StoreError> {
    let Write { actor, op } = write;
    match op {
        WriteOp::InsertNote(row) => store.insert_note(&actor, row).await,
        WriteOp::UpdateNote(row) => store.update_note(&actor, row).await,
        WriteOp::DeleteNote(id) => store.delete_note(&actor, id).await,
        WriteOp::UpsertPresence(row) => store.upsert_presence(&actor, row).await,
    }
}

fn report(failures: &mpsc::Sender<WriteFailure>, failure: WriteFailure) {
    match failures.try_send(failure) {
        Ok(()) => {}
        Err(TrySendError::Full(f)) => warn!(note_id = %f.note_id, "failure channel full; echo kept"),
        Err(TrySendError::Closed(f)) => debug!(note_id = %f.note_id, "session gone; failure not reported"),
    }
}
