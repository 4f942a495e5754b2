// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! OpenGL(ES) boundary for external-image textures.
//!
//! External/opaque textures — content supplied by a platform producer, not by
//! ordinary pixel upload — are an OpenGL(ES) mechanism (`samplerExternalOES`),
//! so the GPU boundary here is GL-shaped: an explicit context threaded through
//! the pull/draw path rather than looked up ambiently. The trait carries
//! exactly the calls this crate issues; a `glow`-backed implementation is
//! available behind the `backend-glow` feature.
//!
//! All methods are render-thread-only by contract: GL contexts are bound to a
//! single thread, and every call site in this crate runs inside the draw-graph
//! synchronization or pre-draw path.

use crate::error::Result;

/// Integer name of a GL texture object. `0` is the null binding.
pub type GlTextureId = u32;

/// GL constants used by the external-image path.
pub mod gl_constants {
    /// GL_TEXTURE_EXTERNAL_OES - external-image texture target
    /// (OES_EGL_image_external). Content arrives from the producer, never
    /// from glTexImage-style uploads.
    pub const TEXTURE_EXTERNAL_OES: u32 = 0x8D65;
    /// GL_TEXTURE0 - first texture unit.
    pub const TEXTURE0: u32 = 0x84C0;
    /// GL_TEXTURE_MAG_FILTER.
    pub const TEXTURE_MAG_FILTER: u32 = 0x2800;
    /// GL_TEXTURE_MIN_FILTER.
    pub const TEXTURE_MIN_FILTER: u32 = 0x2801;
    /// GL_TEXTURE_WRAP_S.
    pub const TEXTURE_WRAP_S: u32 = 0x2802;
    /// GL_TEXTURE_WRAP_T.
    pub const TEXTURE_WRAP_T: u32 = 0x2803;
    /// GL_NEAREST.
    pub const NEAREST: i32 = 0x2600;
    /// GL_LINEAR.
    pub const LINEAR: i32 = 0x2601;
    /// GL_CLAMP_TO_EDGE.
    pub const CLAMP_TO_EDGE: i32 = 0x812F;
}

/// The GL calls the external-image path needs.
///
/// Implemented for `glow::Context` when the `backend-glow` feature is on.
/// Tests use a recording implementation to observe call ordering and counts.
pub trait GlApi {
    /// Generate a texture object name.
    fn create_texture(&self) -> Result<GlTextureId>;

    /// Delete a texture object. Deleting name `0` is a no-op, as in GL.
    fn delete_texture(&self, texture: GlTextureId);

    /// Bind `texture` to `target` on the active unit. Binding `0` unbinds.
    fn bind_texture(&self, target: u32, texture: GlTextureId);

    /// Set an integer texture parameter on the texture bound to `target`.
    fn tex_parameter_i32(&self, target: u32, parameter: u32, value: i32);

    /// Select the active texture unit.
    fn active_texture(&self, unit: u32);
}

#[cfg(feature = "backend-glow")]
mod glow_backend {
    use glow::HasContext;

    use super::{GlApi, GlTextureId};
    use crate::error::{Result, SceneLinkError};

    impl GlApi for glow::Context {
        fn create_texture(&self) -> Result<GlTextureId> {
            let texture = unsafe { HasContext::create_texture(self) }
                .map_err(SceneLinkError::TextureAllocation)?;
            Ok(texture.0.get())
        }

        fn delete_texture(&self, texture: GlTextureId) {
            if let Some(name) = std::num::NonZeroU32::new(texture) {
                unsafe { HasContext::delete_texture(self, glow::NativeTexture(name)) }
            }
        }

        fn bind_texture(&self, target: u32, texture: GlTextureId) {
            let name = std::num::NonZeroU32::new(texture).map(glow::NativeTexture);
            unsafe { HasContext::bind_texture(self, target, name) }
        }

        fn tex_parameter_i32(&self, target: u32, parameter: u32, value: i32) {
            unsafe { HasContext::tex_parameter_i32(self, target, parameter, value) }
        }

        fn active_texture(&self, unit: u32) {
            unsafe { HasContext::active_texture(self, unit) }
        }
    }
}
