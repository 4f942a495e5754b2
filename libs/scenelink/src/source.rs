// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Owned wrapper over the producer-side image object.

use std::sync::Arc;

use crate::error::Result;
use crate::gl::GlTextureId;
use crate::producer::{FrameListener, ImageProducer, ProducerFactory};
use crate::transform::SamplingTransform;

/// Owns the opaque producer handle and the identity of the GL texture bound
/// to it.
///
/// Created once per surface lifetime; dropping it releases the producer-side
/// handle (the surface deletes the GL texture afterwards, in that order).
///
/// [`pull_latest_frame`](ExternalImageSource::pull_latest_frame) must only be
/// called from the thread that owns the GL context. This is a documented
/// precondition, not a checked one.
pub struct ExternalImageSource {
    producer: Box<dyn ImageProducer>,
    texture: GlTextureId,
    // Transform scratch buffer, allocated once and refilled every pull.
    scratch: [f32; 16],
}

impl std::fmt::Debug for ExternalImageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExternalImageSource")
            .field("texture", &self.texture)
            .field("scratch", &self.scratch)
            .finish_non_exhaustive()
    }
}

impl ExternalImageSource {
    /// Bind a new producer image object to `texture` and register the frame
    /// listener with it.
    ///
    /// On failure nothing is retained: the factory either produced a handle
    /// (now owned here) or it did not.
    pub fn connect(
        factory: &dyn ProducerFactory,
        texture: GlTextureId,
        listener: Arc<dyn FrameListener>,
    ) -> Result<Self> {
        let mut producer = factory.create(texture)?;
        producer.set_frame_listener(listener);
        tracing::debug!(texture, "external image source connected");

        Ok(Self {
            producer,
            texture,
            scratch: [0.0; 16],
        })
    }

    /// Materialize the producer's newest frame into the bound texture and
    /// return the transform describing how to sample it.
    ///
    /// Render-thread-only. Mutates GPU texture contents in place.
    pub fn pull_latest_frame(&mut self) -> Result<SamplingTransform> {
        self.producer.update_image()?;
        self.producer.transform(&mut self.scratch)?;
        Ok(SamplingTransform::from_row_major(&self.scratch))
    }

    /// The GL texture this source's producer materializes into.
    pub fn texture(&self) -> GlTextureId {
        self.texture
    }
}

impl Drop for ExternalImageSource {
    fn drop(&mut self) {
        tracing::debug!(texture = self.texture, "external image source released");
    }
}
