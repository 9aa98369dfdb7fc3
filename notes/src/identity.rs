//! Current-actor lookup.
//!
//! The identity provider itself is external. The engine only needs to ask
//! "who is acting right now?", and an absent answer means read-only.

use std::sync::{Arc, PoisonError, RwLock};

use crate::doc::ActorId;

/// Resolves the durable identifier of the current actor.
pub trait IdentityLookup: Send + Sync {
    /// The signed-in actor, or `None` when unauthenticated.
    fn current_actor(&self) -> Option<ActorId>;
}

impl<T: IdentityLookup + ?Sized> IdentityLookup for Arc<T> {
    fn current_actor(&self) -> Option<ActorId> {
        (**self).current_actor()
    }
}

/// Identity fixed for the lifetime of the session.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity(Option<ActorId>);

impl StaticIdentity {
    #[must_use]
    pub fn signed_in(actor: ActorId) -> Self {
        Self(Some(actor))
    }

    #[must_use]
    pub fn anonymous() -> Self {
        Self(None)
    }
}

impl IdentityLookup for StaticIdentity {
    fn current_actor(&self) -> Option<ActorId> {
        self.0.clone()
    }
}

/// Identity that can change while the session runs (sign-in, sign-out).
#[derive(Debug, Clone, Default)]
pub struct SharedIdentity {
    inner: Arc<RwLock<Option<ActorId>>>,
}

impl SharedIdentity {
    #[must_use]
    pub fn new(actor: Option<ActorId>) -> Self {
        Self { inner: Arc::new(RwLock::new(actor)) }
    }

    pub fn set(&self, actor: Option<ActorId>) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = actor;
    }
}

impl IdentityLookup for SharedIdentity {
    fn current_actor(&self) -> Option<ActorId> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
