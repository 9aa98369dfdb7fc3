//! Local-first reconciliation engine for the shared note canvas.
//!
//! This crate is the pure, timer-free core. It owns the note model, the
//! undo/redo reducer, the ownership gate, the edit coalescer, the gesture state
//! machine, the optimistic/remote reconciliation bridge, and presence sampling.
//! Every time-dependent operation takes `now` explicitly so the session runtime
//! (in the root crate) can drive it from tokio timers and tests can drive it
//! from plain `Instant` arithmetic.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`doc`] | Note, color, geometry, and actor identity types |
//! | [`row`] | Fixed-field store rows and edge validation |
//! | [`history`] | Reducer with linear undo/redo history |
//! | [`identity`] | Current-actor lookup |
//! | [`gate`] | Ownership authorization and read-only appearance |
//! | [`coalesce`] | Debounce/coalesce of high-frequency edits |
//! | [`gesture`] | Drag / resize / edit state machine with scoped listeners |
//! | [`sync`] | Remote snapshot vs. local gesture reconciliation |
//! | [`presence`] | Pointer sampling, peer filtering, peer colors |
//! | [`consts`] | Shared numeric constants |

pub mod coalesce;
pub mod consts;
pub mod doc;
pub mod gate;
pub mod gesture;
pub mod history;
pub mod identity;
pub mod presence;
pub mod row;
pub mod sync;
