// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! External image producer boundary.
//!
//! The producer is a platform component (camera pipeline, hardware video
//! decoder) that decodes frames on its own thread and materializes them into
//! a GPU texture it was bound to at construction. scenelink consumes it
//! through these traits and never sees frame bytes.

use std::sync::Arc;

use crate::error::Result;
use crate::gl::GlTextureId;

/// Callback invoked by the producer whenever a newly decoded frame is ready.
///
/// Called on an arbitrary producer-owned thread. Implementations must not
/// block: producers are typically real-time decoders.
pub trait FrameListener: Send + Sync {
    fn frame_available(&self);
}

/// A producer-side image object bound to one GL texture.
///
/// The platform handle behind this trait is released when the box is dropped;
/// implementations release their native resources in `Drop`.
pub trait ImageProducer: Send {
    /// Register the single listener notified on every new frame.
    fn set_frame_listener(&mut self, listener: Arc<dyn FrameListener>);

    /// Materialize the most recently captured frame into the bound texture.
    ///
    /// Render-thread-only: mutates GPU texture contents in place through the
    /// texture this producer was bound to.
    fn update_image(&mut self) -> Result<()>;

    /// Fill `out` with the current sampling transform, row-major.
    fn transform(&self, out: &mut [f32; 16]) -> Result<()>;
}

/// Constructs producer image objects bound to a GL texture.
///
/// Fails with [`SceneLinkError::ProducerUnavailable`] when the platform API
/// cannot allocate the image object (resource exhaustion, missing device).
///
/// [`SceneLinkError::ProducerUnavailable`]: crate::error::SceneLinkError::ProducerUnavailable
pub trait ProducerFactory {
    fn create(&self, texture: GlTextureId) -> Result<Box<dyn ImageProducer>>;
}
