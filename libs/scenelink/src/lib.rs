// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! scenelink: present externally produced video frames in a retained-mode
//! scene graph.
//!
//! An external producer (camera pipeline, hardware decoder) materializes
//! frames into an external/opaque GL texture on its own schedule; the scene
//! graph renders on its own thread at its own cadence. scenelink is the
//! bridge between the two:
//!
//! - [`ExternalImageSource`] owns the producer handle bound to the texture
//!   and pulls the latest frame plus its sampling transform.
//! - [`FrameReadyBridge`] turns producer-thread notifications into queued,
//!   coalesced update requests on the render-owning thread.
//! - [`TexturePresentationNode`] is the draw-graph node whose pre-draw hook
//!   pulls the newest frame and rebinds GPU state immediately before drawing.
//! - [`PresentationSurface`] owns the texture across its lifetime, builds
//!   lazily on the first draw-graph pass, and tears down exactly once.
//!
//! The expensive texture update is deferred to the pre-draw hook so the frame
//! shown is always the newest one available at draw time — bursts of producer
//! notifications collapse into a single pending pull, never a backlog.
//!
//! # Threading
//!
//! Two threads matter: the producer's (frame notifications in) and the
//! render-owning thread (all GL calls, pulls, and teardown). The only
//! cross-thread entry point is [`FrameReadyBridge::notify_frame_available`];
//! everything else is render-thread-only by documented precondition.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use scenelink::{PresentationSurface, Rect, SurfaceRegistry, UpdateQueue};
//!
//! let registry = Arc::new(SurfaceRegistry::new());
//! let queue = UpdateQueue::new();
//! let mut surface = PresentationSurface::new(
//!     Arc::clone(&registry),
//!     Arc::new(queue.handle()),
//!     Box::new(camera_factory),
//! );
//!
//! // Render loop, each frame:
//! surface.set_bounds(Rect::new(0.0, 0.0, 1280.0, 720.0));
//! for id in queue.drain_live(&registry) {
//!     if id == surface.id() {
//!         surface.on_async_update_requested();
//!     }
//! }
//! let dirty = surface.build_or_reuse_node(&gl)?.is_dirty();
//! if dirty {
//!     surface.preprocess(&gl)?; // pull newest frame, rebind texture
//! }
//! // ... issue draw commands ...
//! ```

pub mod bridge;
pub mod error;
pub mod geometry;
pub mod gl;
pub mod material;
pub mod node;
pub mod producer;
pub mod registry;
pub mod source;
pub mod surface;
pub mod transform;

pub use bridge::{FrameReadyBridge, UpdateQueue, UpdateQueueHandle, UpdateScheduler};
pub use error::{Result, SceneLinkError};
pub use geometry::{QuadGeometry, Rect, TexturedVertex};
pub use gl::{gl_constants, GlApi, GlTextureId};
pub use material::{
    FrameMaterial, ShaderProgram, ATTRIBUTES, FRAGMENT_SHADER, SAMPLER_UNIT, VERTEX_SHADER,
};
pub use node::{DirtyFlags, TexturePresentationNode};
pub use producer::{FrameListener, ImageProducer, ProducerFactory};
pub use registry::{SurfaceId, SurfaceRegistry, SurfaceShared};
pub use source::ExternalImageSource;
pub use surface::PresentationSurface;
