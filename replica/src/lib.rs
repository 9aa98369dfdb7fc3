//! Replicated note store: the contract the engine writes to and subscribes to,
//! plus an in-memory implementation.
//!
//! DESIGN
//! ======
//! The store is row-oriented and last-write-wins per row. Each mutation is a
//! single-row operation keyed by note id (or by actor for presence); there are
//! no multi-row transactions. Live queries are `watch` channels that always
//! hold the full current row set, so a slow subscriber skips straight to the
//! latest snapshot instead of replaying every commit.
//!
//! Every mutation names the acting identity. The store, not the client, is the
//! authority on ownership: see [`policy`].

pub mod memory;
pub mod policy;

use std::sync::Arc;

use async_trait::async_trait;
use notes::doc::{ActorId, NoteId};
use notes::row::{NoteRow, PresenceRow, RowError};
use tokio::sync::watch;

pub use memory::MemoryStore;

/// Full row set delivered by a live query.
pub type Snapshot<R> = Arc<Vec<R>>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("actor {actor} may not {op} row {id}")]
    Forbidden { actor: ActorId, op: &'static str, id: String },
    #[error("row not found: {0}")]
    NotFound(String),
    #[error("row already exists: {0}")]
    Duplicate(String),
    #[error("invalid row: {0}")]
    Invalid(#[from] RowError),
}

impl StoreError {
    /// Stable machine-readable code for logs.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Forbidden { .. } => "E_FORBIDDEN",
            Self::NotFound(_) => "E_NOT_FOUND",
            Self::Duplicate(_) => "E_DUPLICATE",
            Self::Invalid(_) => "E_INVALID_ROW",
        }
    }
}

/// Single-row mutations plus live queries over the notes and presence tables.
#[async_trait]
pub trait ReplicatedStore: Send + Sync {
    /// Insert a new note row created by `actor`.
    async fn insert_note(&self, actor: &ActorId, row: NoteRow) -> Result<(), StoreError>;

    /// Replace an existing note row, keyed by `row.id`.
    async fn update_note(&self, actor: &ActorId, row: NoteRow) -> Result<(), StoreError>;

    /// Delete a note row.
    async fn delete_note(&self, actor: &ActorId, id: NoteId) -> Result<(), StoreError>;

    /// Insert or overwrite the presence row keyed by `row.user_id`.
    async fn upsert_presence(&self, actor: &ActorId, row: PresenceRow) -> Result<(), StoreError>;

    /// Live query over every note row.
    fn subscribe_notes(&self) -> watch::Receiver<Snapshot<NoteRow>>;

    /// Live query over every presence row.
    fn subscribe_presence(&self) -> watch::Receiver<Snapshot<PresenceRow>>;
}
