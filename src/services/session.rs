//! Session runtime: one owned event loop per board view.
//!
//! DESIGN
//! ======
//! `Session::spawn` moves all per-session state (history, sync bridge,
//! gesture machine, text coalescers, presence sampler) into a single tokio
//! task. That task is the only owner. UI code talks to it through a cloneable
//! `SessionHandle`, which sends `Event`s over a bounded queue; events are
//! applied strictly in the order they were sent.
//!
//! The loop `select!`s over input events, the note and presence live queries,
//! the presence tick, the earliest text-commit deadline, and write failures
//! reported by the write queue. After every wakeup the render model is rebuilt
//! and published on a `watch` channel if it changed.
//!
//! LIFECYCLE
//! =========
//! 1. Spawn → subscribe live queries → start the write queue
//! 2. Apply the current remote snapshot (hydrates history with own notes)
//! 3. Events / deliveries / timers → mutate owned state → publish view
//! 4. Shutdown or last handle dropped → end the active gesture, flush pending
//!    text, drain the write queue → acknowledge the shutdown caller
//!
//! ERROR HANDLING
//! ==============
//! Calls on a handle whose session has stopped return `SessionError::Closed`
//! and log at error. Refused mutations (no identity, not the owner) answer
//! `false`/`None` and log at debug. Store failures arrive asynchronously from
//! the write queue; the matching echo is dropped so the note falls back to
//! its remote value.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::ops::ControlFlow;
use std::sync::Arc;

use notes::coalesce::CoalescerSet;
use notes::doc::{ActorId, Note, NoteColor, NoteId, Point, Size, next_z_index};
use notes::gate::{MutationGate, authorize};
use notes::gesture::{Begin, Ended, GestureKind, GestureMachine, ListenerHost};
use notes::history::{HistoryAction, HistoryStore};
use notes::identity::IdentityLookup;
use notes::presence::{PresenceSampler, visible_peers};
use notes::row::{NoteRow, PresenceRow, notes_from_rows};
use notes::sync::SyncBridge;
use replica::{ReplicatedStore, Snapshot};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::clock::SessionClock;
use crate::config::SessionConfig;
use crate::services::writer::{WriteFailure, WriteOp, WriteQueue};
use crate::view::{BoardView, NoteView};

const FAILURE_QUEUE_CAPACITY: usize = 64;

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session is not running")]
    Closed,
}

fn closed() -> SessionError {
    error!("session handle used after the session stopped");
    SessionError::Closed
}

// =============================================================================
// EVENTS
// =============================================================================

type Reply<T> = oneshot::Sender<T>;

#[derive(Debug)]
enum Event {
    AddNote(Reply<Option<NoteId>>),
    PointerDownOnNote { id: NoteId, pointer: Point, reply: Reply<bool> },
    BeginResize { id: NoteId, pointer: Point, reply: Reply<bool> },
    BeginEdit { id: NoteId, reply: Reply<bool> },
    PointerMove(Point),
    PointerUp,
    TypeText(String),
    EndEdit,
    DeleteNote { id: NoteId, reply: Reply<bool> },
    Undo,
    Redo,
    SetColor(NoteColor),
    SetZoom(f64),
    ZoomIn,
    ZoomOut,
    ResetZoom,
    CursorMoved { pointer: Point, reply: Reply<bool> },
    Hover(Option<NoteId>),
    Settled(Reply<()>),
    Shutdown(Reply<()>),
}

fn respond<T>(reply: Reply<T>, value: T) {
    if reply.send(value).is_err() {
        debug!("caller dropped before the reply");
    }
}

// =============================================================================
// HANDLE
// =============================================================================

/// Cloneable front door to a running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    events: mpsc::Sender<Event>,
    view: watch::Receiver<BoardView>,
}

impl SessionHandle {
    async fn post(&self, event: Event) -> Result<(), SessionError> {
        self.events.send(event).await.map_err(|_| closed())
    }

    async fn request<T>(&self, make: impl FnOnce(Reply<T>) -> Event) -> Result<T, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.post(make(tx)).await?;
        rx.await.map_err(|_| closed())
    }

    /// Add a note at a random spot. Answers the new id, or `None` without an identity.
    ///
    /// # Errors
    ///
    /// [`SessionError::Closed`] if the session has stopped.
    pub async fn add_note(&self) -> Result<Option<NoteId>, SessionError> {
        self.request(Event::AddNote).await
    }

    /// Bring a note to the front and start dragging it.
    ///
    /// # Errors
    ///
    /// [`SessionError::Closed`] if the session has stopped.
    pub async fn pointer_down_on_note(&self, id: NoteId, pointer: Point) -> Result<bool, SessionError> {
        self.request(|reply| Event::PointerDownOnNote { id, pointer, reply }).await
    }

    /// Start resizing a note from its corner handle.
    ///
    /// # Errors
    ///
    /// [`SessionError::Closed`] if the session has stopped.
    pub async fn begin_resize(&self, id: NoteId, pointer: Point) -> Result<bool, SessionError> {
        self.request(|reply| Event::BeginResize { id, pointer, reply }).await
    }

    /// Start editing a note's text.
    ///
    /// # Errors
    ///
    /// [`SessionError::Closed`] if the session has stopped.
    pub async fn begin_edit(&self, id: NoteId) -> Result<bool, SessionError> {
        self.request(|reply| Event::BeginEdit { id, reply }).await
    }

    /// # Errors
    ///
    /// [`SessionError::Closed`] if the session has stopped.
    pub async fn pointer_move(&self, pointer: Point) -> Result<(), SessionError> {
        self.post(Event::PointerMove(pointer)).await
    }

    /// Finish a drag or resize.
    ///
    /// # Errors
    ///
    /// [`SessionError::Closed`] if the session has stopped.
    pub async fn pointer_up(&self) -> Result<(), SessionError> {
        self.post(Event::PointerUp).await
    }

    /// Replace the edited note's text with `text` (one keystroke).
    ///
    /// # Errors
    ///
    /// [`SessionError::Closed`] if the session has stopped.
    pub async fn type_text(&self, text: impl Into<String>) -> Result<(), SessionError> {
        self.post(Event::TypeText(text.into())).await
    }

    /// Blur: flush pending text and leave edit mode.
    ///
    /// # Errors
    ///
    /// [`SessionError::Closed`] if the session has stopped.
    pub async fn end_edit(&self) -> Result<(), SessionError> {
        self.post(Event::EndEdit).await
    }

    /// # Errors
    ///
    /// [`SessionError::Closed`] if the session has stopped.
    pub async fn delete_note(&self, id: NoteId) -> Result<bool, SessionError> {
        self.request(|reply| Event::DeleteNote { id, reply }).await
    }

    /// # Errors
    ///
    /// [`SessionError::Closed`] if the session has stopped.
    pub async fn undo(&self) -> Result<(), SessionError> {
        self.post(Event::Undo).await
    }

    /// # Errors
    ///
    /// [`SessionError::Closed`] if the session has stopped.
    pub async fn redo(&self) -> Result<(), SessionError> {
        self.post(Event::Redo).await
    }

    /// Color used for notes added from now on.
    ///
    /// # Errors
    ///
    /// [`SessionError::Closed`] if the session has stopped.
    pub async fn set_color(&self, color: NoteColor) -> Result<(), SessionError> {
        self.post(Event::SetColor(color)).await
    }

    /// # Errors
    ///
    /// [`SessionError::Closed`] if the session has stopped.
    pub async fn set_zoom(&self, level: f64) -> Result<(), SessionError> {
        self.post(Event::SetZoom(level)).await
    }

    /// # Errors
    ///
    /// [`SessionError::Closed`] if the session has stopped.
    pub async fn zoom_in(&self) -> Result<(), SessionError> {
        self.post(Event::ZoomIn).await
    }

    /// # Errors
    ///
    /// [`SessionError::Closed`] if the session has stopped.
    pub async fn zoom_out(&self) -> Result<(), SessionError> {
        self.post(Event::ZoomOut).await
    }

    /// # Errors
    ///
    /// [`SessionError::Closed`] if the session has stopped.
    pub async fn reset_zoom(&self) -> Result<(), SessionError> {
        self.post(Event::ResetZoom).await
    }

    /// Record the local pointer. Published on the next presence tick if it moved enough.
    /// Answers `false` without an identity, in which case nothing is recorded.
    ///
    /// # Errors
    ///
    /// [`SessionError::Closed`] if the session has stopped.
    pub async fn cursor_moved(&self, pointer: Point) -> Result<bool, SessionError> {
        self.request(|reply| Event::CursorMoved { pointer, reply }).await
    }

    /// Note under the pointer, for foreign-note opacity.
    ///
    /// # Errors
    ///
    /// [`SessionError::Closed`] if the session has stopped.
    pub async fn hover_note(&self, id: Option<NoteId>) -> Result<(), SessionError> {
        self.post(Event::Hover(id)).await
    }

    /// Resolves once every event sent before it has been applied.
    ///
    /// # Errors
    ///
    /// [`SessionError::Closed`] if the session has stopped.
    pub async fn settled(&self) -> Result<(), SessionError> {
        self.request(Event::Settled).await
    }

    /// Stop the session after flushing pending edits and draining writes.
    ///
    /// # Errors
    ///
    /// [`SessionError::Closed`] if the session had already stopped.
    pub async fn shutdown(&self) -> Result<(), SessionError> {
        self.request(Event::Shutdown).await
    }

    /// Live render model.
    #[must_use]
    pub fn view(&self) -> watch::Receiver<BoardView> {
        self.view.clone()
    }

    /// Latest published render model.
    #[must_use]
    pub fn snapshot(&self) -> BoardView {
        self.view.borrow().clone()
    }
}

// =============================================================================
// SESSION
// =============================================================================

struct Inputs {
    events: mpsc::Receiver<Event>,
    notes: watch::Receiver<Snapshot<NoteRow>>,
    presence: watch::Receiver<Snapshot<PresenceRow>>,
    failures: mpsc::Receiver<WriteFailure>,
}

/// Per-session state, owned by the session task.
pub struct Session {
    config: SessionConfig,
    gate: MutationGate<Arc<dyn IdentityLookup>>,
    history: HistoryStore,
    bridge: SyncBridge,
    gestures: GestureMachine,
    text: CoalescerSet<NoteId, Note>,
    presence: PresenceSampler,
    presence_rows: Snapshot<PresenceRow>,
    hovered: Option<NoteId>,
    writes: WriteQueue,
    clock: SessionClock,
    view_tx: watch::Sender<BoardView>,
}

impl Session {
    /// Start a session on the current tokio runtime.
    #[must_use]
    pub fn spawn(
        config: SessionConfig,
        identity: Arc<dyn IdentityLookup>,
        store: Arc<dyn ReplicatedStore>,
        listeners: Arc<dyn ListenerHost>,
    ) -> SessionHandle {
        let (events_tx, events_rx) = mpsc::channel(config.event_queue_capacity.max(1));
        let (failures_tx, failures_rx) = mpsc::channel(FAILURE_QUEUE_CAPACITY);
        let (view_tx, view_rx) = watch::channel(BoardView::default());
        let inputs = Inputs {
            events: events_rx,
            notes: store.subscribe_notes(),
            presence: store.subscribe_presence(),
            failures: failures_rx,
        };
        let (writes, writer) = WriteQueue::spawn(store, config.write_queue_capacity, failures_tx);

        let session = Self {
            config,
            gate: MutationGate::new(identity),
            history: HistoryStore::new(),
            bridge: SyncBridge::new(),
            gestures: GestureMachine::new(listeners),
            text: CoalescerSet::new(config.coalesce),
            presence: PresenceSampler::new(config.presence_min_delta),
            presence_rows: Arc::new(Vec::new()),
            hovered: None,
            writes,
            clock: SessionClock::start(),
            view_tx,
        };
        tokio::spawn(session.run(inputs, writer));

        SessionHandle { events: events_tx, view: view_rx }
    }

    async fn run(mut self, mut inputs: Inputs, writer: JoinHandle<()>) {
        info!(actor = ?self.gate.actor(), "session started");

        let rows = inputs.notes.borrow_and_update().clone();
        self.on_remote_notes(&rows);
        self.presence_rows = inputs.presence.borrow_and_update().clone();
        self.publish();

        let mut ticker = tokio::time::interval(self.config.presence_tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut notes_open = true;
        let mut presence_open = true;
        let mut stop_reply = None;

        loop {
            let deadline = self.text.next_deadline();
            tokio::select! {
                event = inputs.events.recv() => {
                    let Some(event) = event else { break };
                    if let ControlFlow::Break(reply) = self.handle(event) {
                        stop_reply = Some(reply);
                        break;
                    }
                }
                changed = inputs.notes.changed(), if notes_open => {
                    if changed.is_ok() {
                        let rows = inputs.notes.borrow_and_update().clone();
                        self.on_remote_notes(&rows);
                    } else {
                        warn!("note live query closed");
                        notes_open = false;
                    }
                }
                changed = inputs.presence.changed(), if presence_open => {
                    if changed.is_ok() {
                        self.presence_rows = inputs.presence.borrow_and_update().clone();
                    } else {
                        warn!("presence live query closed");
                        presence_open = false;
                    }
                }
                _ = ticker.tick() => self.on_presence_tick(),
                Some(failure) = inputs.failures.recv() => self.on_write_failure(&failure),
                () = sleep_until(deadline) => self.on_text_deadline(),
            }
            self.publish();
        }

        self.finish();
        self.publish();
        // Dropping the session drops the write queue sender and any live lease.
        drop(self);
        if let Err(e) = writer.await {
            warn!(error = %e, "write worker ended abnormally");
        }
        info!("session stopped");
        if let Some(reply) = stop_reply {
            respond(reply, ());
        }
    }

    fn handle(&mut self, event: Event) -> ControlFlow<Reply<()>> {
        match event {
            Event::AddNote(reply) => respond(reply, self.add_note()),
            Event::PointerDownOnNote { id, pointer, reply } => respond(reply, self.pointer_down_on_note(id, pointer)),
            Event::BeginResize { id, pointer, reply } => {
                respond(reply, self.begin_gesture(GestureKind::Resize, id, pointer));
            }
            Event::BeginEdit { id, reply } => respond(reply, self.begin_gesture(GestureKind::Edit, id, Point::default())),
            Event::PointerMove(pointer) => self.pointer_move(pointer),
            Event::PointerUp => {
                if matches!(self.gestures.kind(), Some(GestureKind::Drag | GestureKind::Resize)) {
                    self.finish_gesture();
                }
            }
            Event::TypeText(text) => self.type_text(&text),
            Event::EndEdit => {
                if self.gestures.kind() == Some(GestureKind::Edit) {
                    self.finish_gesture();
                }
            }
            Event::DeleteNote { id, reply } => respond(reply, self.delete_note(id)),
            Event::Undo => self.travel(HistoryAction::Undo),
            Event::Redo => self.travel(HistoryAction::Redo),
            Event::SetColor(color) => self.set_view(HistoryAction::SetColor(color)),
            Event::SetZoom(level) => self.set_view(HistoryAction::SetZoom(level)),
            Event::ZoomIn => self.set_view(HistoryAction::SetZoom(self.history.view().zoomed_in())),
            Event::ZoomOut => self.set_view(HistoryAction::SetZoom(self.history.view().zoomed_out())),
            Event::ResetZoom => self.set_view(HistoryAction::SetZoom(1.0)),
            Event::CursorMoved { pointer, reply } => respond(reply, self.cursor_moved(pointer)),
            Event::Hover(id) => self.hovered = id,
            Event::Settled(reply) => respond(reply, ()),
            Event::Shutdown(reply) => return ControlFlow::Break(reply),
        }
        ControlFlow::Continue(())
    }

    // -------------------------------------------------------------------------
    // Notes
    // -------------------------------------------------------------------------

    fn add_note(&mut self) -> Option<NoteId> {
        let Some(actor) = self.gate.actor() else {
            debug!("add refused: no identity");
            return None;
        };
        let z_index = next_z_index(&self.bridge.rendered());
        let position = self.config.placement.random_position(&mut rand::rng(), Size::default());
        let color = self.history.view().selected_color;
        let note = Note::new(actor.clone(), color, position, z_index, self.clock.now_ms());
        let id = note.id;

        self.history.dispatch(HistoryAction::Add(note.clone()));
        self.write_note(&actor, note, WriteOp::InsertNote);
        info!(note_id = %id, %actor, z_index, "note added");
        Some(id)
    }

    fn delete_note(&mut self, id: NoteId) -> bool {
        let Some(note) = self.bridge.note(&id) else {
            debug!(note_id = %id, "delete of unknown note");
            return false;
        };
        let Some(actor) = self.gate.actor().filter(|actor| authorize(note, actor)) else {
            debug!(note_id = %id, "delete refused: not the owner");
            return false;
        };
        if self.gestures.end_if_targets(&id).is_some() {
            self.bridge.end_override(&id);
        }
        self.text.forget(&id);
        self.history.dispatch(HistoryAction::Delete(id));
        self.write_delete(&actor, id);
        info!(note_id = %id, %actor, "note deleted");
        true
    }

    /// Undo or redo, then replay the difference to the store.
    ///
    /// Only notes the actor owns are written; a snapshot may contain foreign
    /// notes the actor could see when it was taken, and those are left alone.
    fn travel(&mut self, action: HistoryAction) {
        self.finish_gesture();
        let Some(actor) = self.gate.actor() else {
            debug!("undo/redo refused: no identity");
            return;
        };
        let before = self.history.notes().to_vec();
        if !self.history.dispatch(action) {
            return;
        }
        let after = self.history.notes().to_vec();
        let now_ms = self.clock.now_ms();
        let owned = |note: &&Note| note.owner == actor;

        for note in after.iter().filter(owned) {
            match before.iter().find(|b| b.id == note.id) {
                None => self.write_note(&actor, note.clone().touched(now_ms), WriteOp::InsertNote),
                Some(previous) if previous != note => {
                    self.write_note(&actor, note.clone().touched(now_ms), WriteOp::UpdateNote);
                }
                Some(_) => {}
            }
        }
        for note in before.iter().filter(owned) {
            if !after.iter().any(|a| a.id == note.id) {
                self.text.forget(&note.id);
                self.write_delete(&actor, note.id);
            }
        }
        let (past, future) = self.history.depth();
        debug!(past, future, "history moved");
    }

    fn set_view(&mut self, action: HistoryAction) {
        self.history.dispatch(action);
    }

    // -------------------------------------------------------------------------
    // Gestures
    // -------------------------------------------------------------------------

    fn pointer_down_on_note(&mut self, id: NoteId, pointer: Point) -> bool {
        self.finish_gesture();
        let Some(note) = self.bridge.note(&id).cloned() else {
            debug!(note_id = %id, "pointer down on unknown note");
            return false;
        };
        if !self.gate.authorize(&note) {
            debug!(note_id = %id, "drag refused: not the owner");
            return false;
        }
        let note = match self.bridge.raise(&id) {
            Some(raised) => self.commit_update(raised),
            None => note,
        };
        self.start_gesture(GestureKind::Drag, note, pointer)
    }

    fn begin_gesture(&mut self, kind: GestureKind, id: NoteId, pointer: Point) -> bool {
        self.finish_gesture();
        let Some(note) = self.bridge.note(&id).cloned() else {
            debug!(note_id = %id, ?kind, "gesture on unknown note");
            return false;
        };
        self.start_gesture(kind, note, pointer)
    }

    fn start_gesture(&mut self, kind: GestureKind, note: Note, pointer: Point) -> bool {
        let id = note.id;
        let actor = self.gate.actor();
        match self.gestures.begin(kind, note.clone(), pointer, actor.as_ref()) {
            Begin::Refused => {
                debug!(note_id = %id, ?kind, "gesture refused: not the owner");
                false
            }
            Begin::Started { previous } => {
                if let Some(previous) = previous {
                    self.settle_gesture(previous);
                }
                self.bridge.begin_override(note);
                debug!(note_id = %id, ?kind, "gesture started");
                true
            }
        }
    }

    fn pointer_move(&mut self, pointer: Point) {
        if let Some(note) = self.gestures.pointer_move(pointer) {
            self.bridge.update_override(note);
        }
    }

    fn type_text(&mut self, text: &str) {
        let Some(note) = self.gestures.type_text(text).cloned() else {
            debug!("typing outside an edit");
            return;
        };
        self.bridge.update_override(&note);
        if let Some(commit) = self.text.propose(note.id, note, self.clock.now()) {
            self.commit_update(commit);
        }
    }

    fn finish_gesture(&mut self) {
        if let Some(ended) = self.gestures.end() {
            self.settle_gesture(ended);
        }
    }

    /// Write the terminal value of a finished gesture.
    fn settle_gesture(&mut self, ended: Ended) {
        let id = ended.note.id;
        self.bridge.end_override(&id);
        match ended.kind {
            GestureKind::Drag | GestureKind::Resize => {
                let unchanged = self
                    .bridge
                    .note(&id)
                    .is_some_and(|n| n.position == ended.note.position && n.size == ended.note.size);
                if !unchanged {
                    self.commit_update(ended.note);
                }
            }
            GestureKind::Edit => {
                if let Some(pending) = self.text.flush(&id, self.clock.now()) {
                    self.commit_update(pending);
                }
                self.text.forget(&id);
            }
        }
        debug!(note_id = %id, kind = ?ended.kind, "gesture ended");
    }

    fn on_text_deadline(&mut self) {
        for (_, note) in self.text.poll_due(self.clock.now()) {
            self.commit_update(note);
        }
    }

    // -------------------------------------------------------------------------
    // Writes
    // -------------------------------------------------------------------------

    /// Record an Update in history, echo it, and write it. Returns the written note.
    fn commit_update(&mut self, note: Note) -> Note {
        let Some(actor) = self.gate.actor() else {
            debug!(note_id = %note.id, "update skipped: no identity");
            return note;
        };
        let note = note.touched(self.clock.now_ms());
        self.history.dispatch(HistoryAction::Update(note.clone()));
        self.write_note(&actor, note.clone(), WriteOp::UpdateNote);
        note
    }

    fn write_note(&mut self, actor: &ActorId, note: Note, op: fn(NoteRow) -> WriteOp) {
        let id = note.id;
        let row = NoteRow::from(&note);
        self.bridge.record_echo(note);
        if !self.writes.enqueue(actor, op(row)) {
            self.bridge.drop_echo(&id);
        }
    }

    fn write_delete(&mut self, actor: &ActorId, id: NoteId) {
        self.bridge.record_delete(id);
        if !self.writes.enqueue(actor, WriteOp::DeleteNote(id)) {
            self.bridge.drop_echo(&id);
        }
    }

    fn on_write_failure(&mut self, failure: &WriteFailure) {
        if self.bridge.drop_echo(&failure.note_id) {
            debug!(note_id = %failure.note_id, op = failure.op, "echo dropped after failed write");
        }
    }

    // -------------------------------------------------------------------------
    // Remote + presence
    // -------------------------------------------------------------------------

    fn on_remote_notes(&mut self, rows: &[NoteRow]) {
        let (notes, rejected) = notes_from_rows(rows.iter().cloned());
        for error in &rejected {
            warn!(%error, "skipping malformed note row");
        }
        if !self.bridge.has_snapshot() {
            if let Some(actor) = self.gate.actor() {
                self.history.hydrate(notes.iter().filter(|n| n.owner == actor).cloned());
            }
        }
        self.bridge.apply_remote_snapshot(notes);

        // A note with no local write in flight that is missing remotely was deleted elsewhere.
        if let Some(id) = self.gestures.active_id()
            && self.bridge.remote_note(&id).is_none()
            && !self.bridge.has_echo(&id)
        {
            if let Some(ended) = self.gestures.end_if_targets(&id) {
                info!(note_id = %id, kind = ?ended.kind, "gesture target deleted remotely");
            }
            self.bridge.end_override(&id);
            self.text.forget(&id);
        }
    }

    fn cursor_moved(&mut self, pointer: Point) -> bool {
        if self.gate.actor().is_none() {
            debug!("cursor publish skipped: no identity");
            return false;
        }
        self.presence.record(pointer);
        true
    }

    fn on_presence_tick(&mut self) {
        let Some(actor) = self.gate.actor() else {
            return;
        };
        let Some(point) = self.presence.due() else {
            return;
        };
        let row = PresenceRow::new(&actor, point, self.clock.now_ms());
        if self.writes.enqueue(&actor, WriteOp::UpsertPresence(row)) {
            self.presence.mark_published(point);
        } else {
            debug!(%actor, "presence write dropped; retrying next tick");
        }
    }

    fn finish(&mut self) {
        self.finish_gesture();
        for (_, note) in self.text.flush_all(self.clock.now()) {
            self.commit_update(note);
        }
    }

    fn publish(&self) {
        let actor = self.gate.actor();
        let active = self.gestures.active_id();
        let notes = self
            .bridge
            .rendered()
            .into_iter()
            .map(|note| {
                let appearance = self.gate.appearance(&note, self.hovered == Some(note.id));
                let gesture = if active == Some(note.id) { self.gestures.kind() } else { None };
                NoteView { note, appearance, gesture }
            })
            .collect();
        let ttl_ms = i64::try_from(self.config.presence_ttl.as_millis()).unwrap_or(i64::MAX);
        let peers = visible_peers(&self.presence_rows, actor.as_ref(), self.clock.now_ms(), ttl_ms);
        let view = self.history.view();
        let board = BoardView {
            actor,
            notes,
            view,
            zoom_percent: view.zoom_percent(),
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
            ..BoardView::default()
        }
        .with_peers(peers);

        self.view_tx.send_if_modified(|current| {
            if *current == board {
                return false;
            }
            *current = board;
            true
        });
    }
}

async fn sleep_until(deadline: Option<std::time::Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(tokio::time::Instant::from_std(at)).await,
        None => std::future::pending().await,
    }
}
