// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! The addressable presentation surface.
//!
//! Owns the GL texture for its whole lifetime, lazily builds the image source
//! and draw node on first draw-graph build, and is the render-thread target
//! of queued update requests.

use std::sync::Arc;

use crate::bridge::{FrameReadyBridge, UpdateScheduler};
use crate::error::Result;
use crate::geometry::Rect;
use crate::gl::{gl_constants, GlApi, GlTextureId};
use crate::node::{DirtyFlags, TexturePresentationNode};
use crate::producer::ProducerFactory;
use crate::registry::{SurfaceId, SurfaceRegistry, SurfaceShared};
use crate::source::ExternalImageSource;

/// A scene item presenting frames from one external producer.
///
/// Lifecycle: construct → first [`build_or_reuse_node`] allocates the texture
/// and connects the producer (Unbuilt→Built, once) → pre-draw pulls on every
/// dirty frame → [`destroy`] tears down in reverse order, exactly once.
///
/// All methods run on the render-owning thread; the only producer-thread
/// entry point into a surface is its bridge, which crosses over through the
/// update scheduler.
///
/// [`build_or_reuse_node`]: PresentationSurface::build_or_reuse_node
/// [`destroy`]: PresentationSurface::destroy
pub struct PresentationSurface {
    registry: Arc<SurfaceRegistry>,
    scheduler: Arc<dyn UpdateScheduler>,
    factory: Box<dyn ProducerFactory>,
    shared: Arc<SurfaceShared>,
    id: SurfaceId,
    bounds: Rect,
    texture: Option<GlTextureId>,
    source: Option<ExternalImageSource>,
    node: Option<TexturePresentationNode>,
}

impl PresentationSurface {
    pub fn new(
        registry: Arc<SurfaceRegistry>,
        scheduler: Arc<dyn UpdateScheduler>,
        factory: Box<dyn ProducerFactory>,
    ) -> Self {
        let shared = Arc::new(SurfaceShared::new());
        let id = registry.register(&shared);

        Self {
            registry,
            scheduler,
            factory,
            shared,
            id,
            bounds: Rect::default(),
            texture: None,
            source: None,
            node: None,
        }
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    /// Whether the first draw-graph build has happened.
    pub fn is_built(&self) -> bool {
        self.node.is_some()
    }

    /// Set the current on-screen bounds; geometry is recomputed from them on
    /// the next build pass.
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }

    /// The draw-graph build entry point.
    ///
    /// First call: allocates and configures the external texture, connects
    /// the producer with the frame-ready bridge registered, and constructs
    /// the node. Later calls reuse the node. Every call recomputes geometry
    /// for the current bounds and raises both dirty flags.
    pub fn build_or_reuse_node(&mut self, gl: &dyn GlApi) -> Result<&mut TexturePresentationNode> {
        if self.node.is_none() {
            self.build(gl)?;
        }

        let node = self.node.as_mut().expect("built above");
        node.update_geometry(self.bounds);
        node.mark_dirty(DirtyFlags::GEOMETRY | DirtyFlags::MATERIAL);
        Ok(node)
    }

    fn build(&mut self, gl: &dyn GlApi) -> Result<()> {
        let texture = gl.create_texture()?;
        gl.bind_texture(gl_constants::TEXTURE_EXTERNAL_OES, texture);

        // Camera/video content has no derivable mip chain, so no mipmapping;
        // clamp-to-edge is the only wrap mode external images support.
        gl.tex_parameter_i32(
            gl_constants::TEXTURE_EXTERNAL_OES,
            gl_constants::TEXTURE_MIN_FILTER,
            gl_constants::NEAREST,
        );
        gl.tex_parameter_i32(
            gl_constants::TEXTURE_EXTERNAL_OES,
            gl_constants::TEXTURE_MAG_FILTER,
            gl_constants::LINEAR,
        );
        gl.tex_parameter_i32(
            gl_constants::TEXTURE_EXTERNAL_OES,
            gl_constants::TEXTURE_WRAP_S,
            gl_constants::CLAMP_TO_EDGE,
        );
        gl.tex_parameter_i32(
            gl_constants::TEXTURE_EXTERNAL_OES,
            gl_constants::TEXTURE_WRAP_T,
            gl_constants::CLAMP_TO_EDGE,
        );

        let bridge = FrameReadyBridge::new(
            Arc::downgrade(&self.shared),
            self.id,
            Arc::clone(&self.scheduler),
        );

        let source =
            match ExternalImageSource::connect(self.factory.as_ref(), texture, Arc::new(bridge)) {
                Ok(source) => source,
                Err(e) => {
                    // Partial-construction failure path: the texture must not
                    // leak, and the surface stays unbuilt.
                    gl.bind_texture(gl_constants::TEXTURE_EXTERNAL_OES, 0);
                    gl.delete_texture(texture);
                    return Err(e);
                }
            };

        self.texture = Some(texture);
        self.source = Some(source);
        self.node = Some(TexturePresentationNode::new(texture));
        tracing::info!(id = %self.id, texture, "presentation surface built");
        Ok(())
    }

    /// Render-thread synchronization entry for queued update requests
    /// (already marshaled by the scheduler). Consumes the pending flag and
    /// marks the node's material dirty so the next draw pass runs the
    /// pre-draw hook.
    ///
    /// Returns `true` when an update was pending.
    pub fn on_async_update_requested(&mut self) -> bool {
        if !self.shared.take_pending() {
            return false;
        }
        if let Some(node) = &mut self.node {
            node.mark_dirty(DirtyFlags::MATERIAL);
        }
        true
    }

    /// Run the node's pre-draw hook against this surface's image source.
    ///
    /// The draw-graph traversal calls this once per frame the node is dirty,
    /// before issuing the node's draw commands. No-op while unbuilt.
    pub fn preprocess(&mut self, gl: &dyn GlApi) -> Result<()> {
        if let (Some(node), Some(source)) = (self.node.as_mut(), self.source.as_mut()) {
            node.preprocess(gl, source)?;
        }
        Ok(())
    }

    pub fn node(&self) -> Option<&TexturePresentationNode> {
        self.node.as_ref()
    }

    pub fn node_mut(&mut self) -> Option<&mut TexturePresentationNode> {
        self.node.as_mut()
    }

    /// Frames presented since the surface was built.
    pub fn frames_presented(&self) -> u64 {
        self.node.as_ref().map_or(0, |n| n.frames_presented())
    }

    /// Tear down in reverse construction order: deregister, release the
    /// producer handle, drop the node, then unbind and delete the texture.
    ///
    /// Destroying a never-built surface performs no GL calls. The texture id
    /// is taken out of its slot, so a second call cannot delete twice.
    pub fn destroy(&mut self, gl: &dyn GlApi) {
        self.registry.deregister(self.id);

        // Producer handle first: it references the texture we are about to
        // delete.
        self.source = None;
        self.node = None;

        if let Some(texture) = self.texture.take() {
            gl.bind_texture(gl_constants::TEXTURE_EXTERNAL_OES, 0);
            gl.delete_texture(texture);
            tracing::info!(id = %self.id, texture, "presentation surface destroyed");
        }
    }
}

impl Drop for PresentationSurface {
    fn drop(&mut self) {
        // Deregistering twice is harmless; destroy() usually got here first.
        self.registry.deregister(self.id);

        if self.texture.is_some() {
            // GL teardown needs the thread-bound context, which a Drop impl
            // cannot reach. The texture leaks; the producer handle still
            // releases through the source's own drop.
            tracing::warn!(
                id = %self.id,
                "surface dropped without destroy(); GL texture leaked"
            );
        }
    }
}
