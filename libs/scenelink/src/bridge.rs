// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Cross-thread frame-ready relay.
//!
//! The producer decodes on its own thread; the draw graph renders on its own.
//! The bridge is the only point where the two meet: producer notifications
//! become queued, coalesced update requests the render thread picks up at its
//! next synchronization point. The producer side never blocks and never
//! touches GL.

use std::sync::{Arc, Weak};

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::producer::FrameListener;
use crate::registry::{SurfaceId, SurfaceRegistry, SurfaceShared};

/// Queued "invoke update on the render thread" primitive.
///
/// The draw-graph framework supplies this: an implementation must be safe to
/// call from any thread and must wake the render-owning thread's event/draw
/// loop so it eventually drains pending updates. [`UpdateQueue`] is the
/// shipped default for loops that poll a channel.
pub trait UpdateScheduler: Send + Sync {
    fn request_update(&self, surface: SurfaceId);
}

/// Relays the producer's frame-ready signal to the render thread.
///
/// Holds the surface's shared state weakly: a notification arriving after the
/// surface was destroyed upgrades to nothing and is dropped silently. Bursts
/// coalesce through the pending flag — only the notification that raises the
/// flag posts a queued update, so K rapid notifications before the next
/// synchronization point produce exactly one pending pull.
pub struct FrameReadyBridge {
    surface: Weak<SurfaceShared>,
    surface_id: SurfaceId,
    scheduler: Arc<dyn UpdateScheduler>,
}

impl FrameReadyBridge {
    pub fn new(
        surface: Weak<SurfaceShared>,
        surface_id: SurfaceId,
        scheduler: Arc<dyn UpdateScheduler>,
    ) -> Self {
        Self {
            surface,
            surface_id,
            scheduler,
        }
    }

    /// Signal that the producer has a new frame. Callable from any thread;
    /// never blocks the caller.
    pub fn notify_frame_available(&self) {
        let Some(shared) = self.surface.upgrade() else {
            tracing::trace!(id = %self.surface_id, "frame notification after teardown, dropped");
            return;
        };

        if shared.mark_pending() {
            self.scheduler.request_update(self.surface_id);
        }
    }
}

impl FrameListener for FrameReadyBridge {
    fn frame_available(&self) {
        self.notify_frame_available();
    }
}

/// Channel-backed [`UpdateScheduler`] for render loops that poll.
///
/// The render thread owns the queue and drains it at its synchronization
/// point; producer threads hold cloned [`UpdateQueueHandle`]s. The channel is
/// unbounded, but the pending flag guarantees at most one in-flight request
/// per surface per sync cycle, so it cannot grow past the number of live
/// surfaces.
pub struct UpdateQueue {
    tx: Sender<SurfaceId>,
    rx: Receiver<SurfaceId>,
}

impl UpdateQueue {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    /// A cloneable producer-side handle.
    pub fn handle(&self) -> UpdateQueueHandle {
        UpdateQueueHandle {
            tx: self.tx.clone(),
        }
    }

    /// Drain every queued request, keeping only surfaces still live in
    /// `registry`. Requests for surfaces destroyed while the request was in
    /// flight are dropped here.
    pub fn drain_live(&self, registry: &SurfaceRegistry) -> Vec<SurfaceId> {
        self.rx
            .try_iter()
            .filter(|id| {
                let live = registry.resolve(*id).is_some();
                if !live {
                    tracing::trace!(%id, "queued update for destroyed surface, dropped");
                }
                live
            })
            .collect()
    }

    /// Drain every queued request without a liveness filter.
    pub fn drain(&self) -> Vec<SurfaceId> {
        self.rx.try_iter().collect()
    }
}

impl Default for UpdateQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer-side sender half of an [`UpdateQueue`].
#[derive(Clone)]
pub struct UpdateQueueHandle {
    tx: Sender<SurfaceId>,
}

impl UpdateScheduler for UpdateQueueHandle {
    fn request_update(&self, surface: SurfaceId) {
        // Receiver dropped means the render loop is gone; nothing to wake.
        let _ = self.tx.send(surface);
    }
}
