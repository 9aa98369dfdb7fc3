//! In-memory replicated store.
//!
//! DESIGN
//! ======
//! Tables live behind one `RwLock`. Each successful mutation republishes the
//! affected table to its `watch` channel while the write lock is still held,
//! so subscribers observe snapshots in commit order. Rows are kept in a
//! `BTreeMap` keyed by id, which makes snapshot order deterministic.
//!
//! An optional write latency delays every mutation before it is applied. It
//! stands in for the round trip to a real backend and lets sessions observe
//! their own optimistic state ahead of the live query.

#[cfg(test)]
#[path = "memory_test.rs"]
mod memory_test;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use notes::doc::{ActorId, NoteId};
use notes::row::{NoteRow, PresenceRow};
use tokio::sync::{RwLock, watch};
use tracing::debug;

use crate::policy::{check_delete, check_insert, check_presence, check_update};
use crate::{ReplicatedStore, Snapshot, StoreError};

#[derive(Default)]
struct Tables {
    notes: BTreeMap<String, NoteRow>,
    presence: BTreeMap<String, PresenceRow>,
}

/// Replicated store held entirely in process memory.
pub struct MemoryStore {
    tables: RwLock<Tables>,
    notes_tx: watch::Sender<Snapshot<NoteRow>>,
    presence_tx: watch::Sender<Snapshot<PresenceRow>>,
    latency: Duration,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_latency(Duration::ZERO)
    }

    /// Store whose mutations take `latency` to land.
    #[must_use]
    pub fn with_latency(latency: Duration) -> Self {
        let (notes_tx, _) = watch::channel(Arc::new(Vec::new()));
        let (presence_tx, _) = watch::channel(Arc::new(Vec::new()));
        Self { tables: RwLock::new(Tables::default()), notes_tx, presence_tx, latency }
    }

    /// Current note rows, in id order.
    pub async fn note_rows(&self) -> Vec<NoteRow> {
        self.tables.read().await.notes.values().cloned().collect()
    }

    /// Current presence rows, in user id order.
    pub async fn presence_rows(&self) -> Vec<PresenceRow> {
        self.tables.read().await.presence.values().cloned().collect()
    }

    async fn settle(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn publish_notes(&self, tables: &Tables) {
        self.notes_tx.send_replace(Arc::new(tables.notes.values().cloned().collect()));
    }

    fn publish_presence(&self, tables: &Tables) {
        self.presence_tx.send_replace(Arc::new(tables.presence.values().cloned().collect()));
    }
}

#[async_trait]
impl ReplicatedStore for MemoryStore {
    async fn insert_note(&self, actor: &ActorId, row: NoteRow) -> Result<(), StoreError> {
        self.settle().await;
        check_insert(actor, &row)?;
        let mut tables = self.tables.write().await;
        if tables.notes.contains_key(&row.id) {
            return Err(StoreError::Duplicate(row.id));
        }
        debug!(note_id = %row.id, %actor, "note inserted");
        tables.notes.insert(row.id.clone(), row);
        self.publish_notes(&tables);
        Ok(())
    }

    async fn update_note(&self, actor: &ActorId, row: NoteRow) -> Result<(), StoreError> {
        self.settle().await;
        let mut tables = self.tables.write().await;
        let Some(existing) = tables.notes.get(&row.id) else {
            return Err(StoreError::NotFound(row.id));
        };
        check_update(actor, existing, &row)?;
        debug!(note_id = %row.id, %actor, "note updated");
        tables.notes.insert(row.id.clone(), row);
        self.publish_notes(&tables);
        Ok(())
    }

    async fn delete_note(&self, actor: &ActorId, id: NoteId) -> Result<(), StoreError> {
        self.settle().await;
        let key = id.to_string();
        let mut tables = self.tables.write().await;
        let Some(existing) = tables.notes.get(&key) else {
            return Err(StoreError::NotFound(key));
        };
        check_delete(actor, existing)?;
        debug!(note_id = %key, %actor, "note deleted");
        tables.notes.remove(&key);
        self.publish_notes(&tables);
        Ok(())
    }

    async fn upsert_presence(&self, actor: &ActorId, row: PresenceRow) -> Result<(), StoreError> {
        self.settle().await;
        check_presence(actor, &row)?;
        let mut tables = self.tables.write().await;
        tables.presence.insert(row.user_id.clone(), row);
        self.publish_presence(&tables);
        Ok(())
    }

    fn subscribe_notes(&self) -> watch::Receiver<Snapshot<NoteRow>> {
        self.notes_tx.subscribe()
    }

    fn subscribe_presence(&self) -> watch::Receiver<Snapshot<PresenceRow>> {
        self.presence_tx.subscribe()
    }
}
