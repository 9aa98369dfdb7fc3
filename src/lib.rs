//! Session runtime for the shared note board.
//!
//! The `notes` crate holds the pure, timer-free core; `replica` defines the
//! replicated store contract. This crate wires them into a running session:
//! a tokio task per board view that applies input events, reconciles the
//! live queries, drives the edit and presence timers, and publishes a render
//! model on a `watch` channel.
//!
//! | Module | Role |
//! |--------|------|
//! | [`services::session`] | Event loop and `SessionHandle` |
//! | [`services::writer`] | Ordered fire-and-forget store writes |
//! | [`view`] | Published render model |
//! | [`config`] | `NOTEBOARD_*` environment configuration |
//! | [`clock`] | Monotonic and wall-clock time from one source |

pub mod clock;
pub mod config;
pub mod services;
pub mod view;

pub use config::SessionConfig;
pub use services::session::{Session, SessionError, SessionHandle};
pub use view::{BoardView, NoteView};
