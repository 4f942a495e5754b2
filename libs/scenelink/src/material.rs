// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Shader state for external-image presentation.
//!
//! The material's comparable state is the sampling transform alone: two
//! materials with equal transforms are interchangeable for batching, and an
//! unchanged transform means the uniform upload is skipped entirely.

use crate::transform::SamplingTransform;

/// Vertex stage: positions through the framework projection, texture
/// coordinates through the per-frame transform.
pub const VERTEX_SHADER: &str = "\
uniform mat4 projectionMatrix;
uniform mat4 frameTransform;
attribute vec4 position;
attribute vec4 textureCoord;
varying vec2 sampleCoord;
void main() {
    gl_Position = projectionMatrix * position;
    sampleCoord = (frameTransform * textureCoord).xy;
}";

/// Fragment stage: sample the external-image texture, apply accumulated
/// opacity.
pub const FRAGMENT_SHADER: &str = "\
#extension GL_OES_EGL_image_external : require
precision mediump float;
varying vec2 sampleCoord;
uniform lowp float opacity;
uniform samplerExternalOES frameTexture;
void main() {
    gl_FragColor = texture2D(frameTexture, sampleCoord) * opacity;
}";

/// Vertex attribute names, in binding order.
pub const ATTRIBUTES: [&str; 2] = ["position", "textureCoord"];

/// The texture unit the external-image sampler is bound to.
pub const SAMPLER_UNIT: i32 = 0;

/// Shader program boundary supplied by the draw-graph framework.
///
/// The framework owns compilation, the projection matrix, and the opacity
/// uniform; the material only touches the uniforms it declares.
pub trait ShaderProgram {
    /// Upload a `mat4` uniform, column-major.
    fn set_uniform_mat4(&mut self, name: &str, column_major: &[f32; 16]);

    /// Upload an integer uniform (sampler unit selection).
    fn set_uniform_i32(&mut self, name: &str, value: i32);
}

/// Material state carried by the presentation node.
pub struct FrameMaterial {
    transform: SamplingTransform,
    transform_dirty: bool,
    sampler_resolved: bool,
}

impl FrameMaterial {
    pub fn new() -> Self {
        Self {
            transform: SamplingTransform::IDENTITY,
            // First upload must happen even for an identity transform.
            transform_dirty: true,
            sampler_resolved: false,
        }
    }

    /// Video content is opaque; the node never blends.
    pub fn blending(&self) -> bool {
        false
    }

    /// Replace the stored transform if `transform` differs by value.
    ///
    /// Returns `true` when the material state changed (uniform re-upload
    /// required), `false` for the no-op case.
    pub fn set_transform(&mut self, transform: SamplingTransform) -> bool {
        if transform == self.transform {
            return false;
        }
        self.transform = transform;
        self.transform_dirty = true;
        true
    }

    pub fn transform(&self) -> &SamplingTransform {
        &self.transform
    }

    /// Comparable-state equality: defined purely by the transform. This is
    /// what lets the framework batch nodes and skip redundant state changes.
    pub fn state_equals(&self, other: &FrameMaterial) -> bool {
        self.transform == other.transform
    }

    /// Push pending uniform state into `program`.
    ///
    /// The sampler unit is bound exactly once per program, on the first call;
    /// the transform is uploaded only when it changed since the last upload.
    pub fn update_uniforms(&mut self, program: &mut dyn ShaderProgram) {
        if !self.sampler_resolved {
            program.set_uniform_i32("frameTexture", SAMPLER_UNIT);
            self.sampler_resolved = true;
        }
        if self.transform_dirty {
            program.set_uniform_mat4("frameTransform", &self.transform.to_cols_array());
            self.transform_dirty = false;
        }
    }
}

impl Default for FrameMaterial {
    fn default() -> Self {
        Self::new()
    }
}
