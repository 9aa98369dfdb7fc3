use super::*;
use crate::services::fixtures::{Recorded, RecordingStore};
use notes::doc::{Note, NoteColor, Point};

fn alice() -> ActorId {
    ActorId::from("alice")
}

fn row() -> NoteRow {
    NoteRow::from(&Note::new(alice(), NoteColor::Blue, Point::new(100.0, 100.0), 1, 1_000))
}

fn spawn_queue(store: &Arc<RecordingStore>, capacity: usize) -> (WriteQueue, JoinHandle<()>, mpsc::Receiver<WriteFailure>) {
    let (failures_tx, failures_rx) = mpsc::channel(8);
    let dyn_store: Arc<dyn ReplicatedStore> = store.clone();
    let (queue, worker) = WriteQueue::spawn(dyn_store, capacity, failures_tx);
    (queue, worker, failures_rx)
}

#[tokio::test]
async fn writes_are_applied_in_order() {
    let store = Arc::new(RecordingStore::new());
    let (queue, worker, _failures) = spawn_queue(&store, 16);

    let mut row = row();
    let id = Uuid::parse_str(&row.id).unwrap();
    assert!(queue.enqueue(&alice(), WriteOp::InsertNote(row.clone())));
    row.content = "edited".to_owned();
    assert!(queue.enqueue(&alice(), WriteOp::UpdateNote(row.clone())));
    assert!(queue.enqueue(&alice(), WriteOp::DeleteNote(id)));
    drop(queue);
    worker.await.unwrap();

    let log = store.log();
    assert_eq!(log.len(), 3);
    assert!(matches!(&log[0], Recorded::Insert(_)));
    assert_eq!(log[1], Recorded::Update(row));
    assert_eq!(log[2], Recorded::Delete(id));
    assert!(store.memory().note_rows().await.is_empty());
}

#[tokio::test]
async fn refused_note_write_is_reported() {
    let store = Arc::new(RecordingStore::new());
    store.refuse_updates();
    let (queue, worker, mut failures) = spawn_queue(&store, 16);

    let row = row();
    queue.enqueue(&alice(), WriteOp::InsertNote(row.clone()));
    queue.enqueue(&alice(), WriteOp::UpdateNote(row.clone()));
    drop(queue);
    worker.await.unwrap();

    let failure = failures.recv().await.unwrap();
    assert_eq!(failure.note_id.to_string(), row.id);
    assert_eq!(failure.op, "update_note");
    assert!(matches!(failure.error, StoreError::Forbidden { .. }));
    assert!(failures.try_recv().is_err());
}

#[tokio::test]
async fn missing_target_is_reported_too() {
    let store = Arc::new(RecordingStore::new());
    let (queue, worker, mut failures) = spawn_queue(&store, 16);
    let id = NoteId::new_v4();
    queue.enqueue(&alice(), WriteOp::DeleteNote(id));
    drop(queue);
    worker.await.unwrap();

    let failure = failures.recv().await.unwrap();
    assert_eq!(failure.note_id, id);
    assert!(matches!(failure.error, StoreError::NotFound(_)));
}

#[tokio::test]
async fn presence_failures_are_not_reported() {
    let store = Arc::new(RecordingStore::new());
    let (queue, worker, mut failures) = spawn_queue(&store, 16);
    let bob = ActorId::from("bob");
    queue.enqueue(&alice(), WriteOp::UpsertPresence(PresenceRow::new(&bob, Point::new(1.0, 1.0), 0)));
    drop(queue);
    worker.await.unwrap();

    assert_eq!(store.presence_writes().len(), 1);
    assert!(failures.try_recv().is_err());
}

#[tokio::test]
async fn full_queue_drops_write() {
    let store = Arc::new(RecordingStore::new());
    let (queue, worker, _failures) = spawn_queue(&store, 1);

    // Current-thread runtime: the worker cannot drain until this task yields.
    assert!(queue.enqueue(&alice(), WriteOp::InsertNote(row())));
    assert!(!queue.enqueue(&alice(), WriteOp::InsertNote(row())));
    drop(queue);
    worker.await.unwrap();
    assert_eq!(store.log().len(), 1);
}

#[tokio::test]
async fn closed_queue_drops_write() {
    let store = Arc::new(RecordingStore::new());
    let (queue, worker, _failures) = spawn_queue(&store, 4);
    worker.abort();
    assert!(worker.await.is_err());
    assert!(!queue.enqueue(&alice(), WriteOp::InsertNote(row())));
}

#[test]
fn op_reports_target_note() {
    let row = row();
    let id = Uuid::parse_str(&row.id).unwrap();
    assert_eq!(WriteOp::UpdateNote(row).note_id(), Some(id));
    assert_eq!(WriteOp::DeleteNote(id).note_id(), Some(id));
    assert_eq!(WriteOp::UpsertPresence(PresenceRow::new(&alice(), Point::default(), 0)).note_id(), None);
}
