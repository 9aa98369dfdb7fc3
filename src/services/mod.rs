//! Session services.
//!
//! ARCHITECTURE
//! ============
//! `session` owns the per-view event loop and all local state; `writer`
//! delivers its mutations to the replicated store in order without ever
//! blocking the loop.

pub mod session;
pub mod writer;

#[cfg(test)]
#[path = "fixtures_test.rs"]
pub(crate) mod fixtures;
