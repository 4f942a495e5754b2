// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Draw-graph node presenting the external-image texture.

use bitflags::bitflags;

use crate::error::Result;
use crate::geometry::{QuadGeometry, Rect};
use crate::gl::{gl_constants, GlApi, GlTextureId};
use crate::material::FrameMaterial;
use crate::source::ExternalImageSource;

bitflags! {
    /// The framework's two independent mark-dirty flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DirtyFlags: u8 {
        const GEOMETRY = 1 << 0;
        const MATERIAL = 1 << 1;
    }
}

/// GPU draw-graph node: quad geometry, frame material, texture binding.
///
/// Constructed once per surface on first draw-graph build (the surface's
/// Unbuilt→Built transition). The node does not own the texture or the image
/// source — the owning surface does, and it outlives every use the node makes
/// of them.
pub struct TexturePresentationNode {
    geometry: QuadGeometry,
    material: FrameMaterial,
    texture: GlTextureId,
    dirty: DirtyFlags,
    frames_presented: u64,
}

impl TexturePresentationNode {
    pub fn new(texture: GlTextureId) -> Self {
        Self {
            geometry: QuadGeometry::new(),
            material: FrameMaterial::new(),
            texture,
            dirty: DirtyFlags::GEOMETRY | DirtyFlags::MATERIAL,
            frames_presented: 0,
        }
    }

    /// Pre-draw hook, invoked by the draw-graph traversal once per frame this
    /// node is marked dirty, before any of its draw commands are issued.
    ///
    /// Pulls the producer's latest frame, folds the new transform into the
    /// material, and rebinds the texture unit. The rebind is unconditional:
    /// other nodes sharing the GL context may have changed bindings since the
    /// last frame.
    ///
    /// Render-thread-only, like every [`GlApi`] call.
    pub fn preprocess(
        &mut self,
        gl: &dyn GlApi,
        source: &mut ExternalImageSource,
    ) -> Result<()> {
        let transform = source.pull_latest_frame()?;
        if self.material.set_transform(transform) {
            self.dirty |= DirtyFlags::MATERIAL;
        }

        gl.active_texture(gl_constants::TEXTURE0);
        gl.bind_texture(gl_constants::TEXTURE_EXTERNAL_OES, self.texture);

        self.frames_presented += 1;
        tracing::trace!(
            texture = self.texture,
            frames = self.frames_presented,
            "frame pulled and texture rebound"
        );
        Ok(())
    }

    /// Recompute the quad for new on-screen bounds and raise the geometry
    /// flag.
    pub fn update_geometry(&mut self, bounds: Rect) {
        self.geometry.update(bounds);
        self.dirty |= DirtyFlags::GEOMETRY;
    }

    pub fn mark_dirty(&mut self, flags: DirtyFlags) {
        self.dirty |= flags;
    }

    /// Consume the dirty flags, as the traversal does when it schedules this
    /// node's pre-draw hook and re-uploads.
    pub fn take_dirty(&mut self) -> DirtyFlags {
        std::mem::replace(&mut self.dirty, DirtyFlags::empty())
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    pub fn geometry(&self) -> &QuadGeometry {
        &self.geometry
    }

    pub fn material(&self) -> &FrameMaterial {
        &self.material
    }

    pub fn material_mut(&mut self) -> &mut FrameMaterial {
        &mut self.material
    }

    pub fn texture(&self) -> GlTextureId {
        self.texture
    }

    /// Frames presented since the node was built.
    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }
}
