// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Surface liveness registry.
//!
//! Queued update requests travel as [`SurfaceId`] values, never as references:
//! a request for a surface destroyed while the request was in flight resolves
//! to a failed lookup instead of a dangling pointer. The registry holds weak
//! handles only; it never extends a surface's lifetime.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

/// Identity of a presentation surface, unique for the registry's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(u64);

impl std::fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "surface-{}", self.0)
    }
}

/// State shared between a surface and its frame-ready bridge.
///
/// The pending flag is the coalescing point: any number of producer
/// notifications between two render-thread clears collapse into one observed
/// update.
pub struct SurfaceShared {
    pending_update: AtomicBool,
}

impl SurfaceShared {
    pub(crate) fn new() -> Self {
        Self {
            pending_update: AtomicBool::new(false),
        }
    }

    /// Raise the pending flag. Returns `true` only for the transition
    /// false→true, i.e. for the one notification in a burst that must post a
    /// queued update.
    pub fn mark_pending(&self) -> bool {
        !self.pending_update.swap(true, Ordering::AcqRel)
    }

    /// Clear the pending flag, reporting whether an update was pending.
    /// Called from the render thread's synchronization pass.
    pub fn take_pending(&self) -> bool {
        self.pending_update.swap(false, Ordering::AcqRel)
    }

    /// Whether an update is currently pending.
    pub fn is_pending(&self) -> bool {
        self.pending_update.load(Ordering::Acquire)
    }
}

/// Registry mapping live surfaces to their shared state.
pub struct SurfaceRegistry {
    surfaces: Mutex<HashMap<SurfaceId, Weak<SurfaceShared>>>,
    next_id: AtomicU64,
}

impl SurfaceRegistry {
    pub fn new() -> Self {
        Self {
            surfaces: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a surface's shared state, assigning its identity.
    pub fn register(&self, shared: &Arc<SurfaceShared>) -> SurfaceId {
        let id = SurfaceId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.surfaces.lock().insert(id, Arc::downgrade(shared));
        tracing::debug!(%id, "surface registered");
        id
    }

    /// Remove a surface. Safe to call for an id that was already removed.
    pub fn deregister(&self, id: SurfaceId) {
        if self.surfaces.lock().remove(&id).is_some() {
            tracing::debug!(%id, "surface deregistered");
        }
    }

    /// Resolve an id to its live shared state, or `None` if the surface was
    /// destroyed.
    pub fn resolve(&self, id: SurfaceId) -> Option<Arc<SurfaceShared>> {
        self.surfaces.lock().get(&id).and_then(Weak::upgrade)
    }

    /// Number of registered (not necessarily still live) surfaces.
    pub fn len(&self) -> usize {
        self.surfaces.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.lock().is_empty()
    }
}

impl Default for SurfaceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
