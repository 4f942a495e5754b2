// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Per-frame texture sampling transform.
//!
//! Producers store frames pre-rotated/cropped and describe how texture
//! coordinates must be remapped with a 4x4 matrix, delivered as a 16-element
//! row-major float buffer. Value equality on the transform is what decides
//! whether the shader uniform needs a re-upload.

use glam::Mat4;

/// Texture-coordinate remapping for the current frame.
///
/// Wraps a column-major [`Mat4`]; producers fill row-major buffers, so use
/// [`SamplingTransform::from_row_major`] on the producer side of the boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingTransform(Mat4);

impl SamplingTransform {
    /// No remapping: sample texture coordinates as-is.
    pub const IDENTITY: Self = Self(Mat4::IDENTITY);

    /// Build from the producer's 16-element row-major buffer.
    pub fn from_row_major(values: &[f32; 16]) -> Self {
        Self(Mat4::from_cols_array(values).transpose())
    }

    /// The transform as a column-major matrix.
    pub fn matrix(&self) -> &Mat4 {
        &self.0
    }

    /// Column-major array form, ready for a `mat4` uniform upload.
    pub fn to_cols_array(&self) -> [f32; 16] {
        self.0.to_cols_array()
    }
}

impl Default for SamplingTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
