// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Textured quad geometry for the presentation node.

use bytemuck::{Pod, Zeroable};

/// Axis-aligned on-screen bounds of a surface, y growing downward
/// (item-coordinate convention: the top edge is the smaller y).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// One quad vertex: position plus texture coordinate, tightly packed for
/// direct upload as a vertex buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct TexturedVertex {
    pub position: [f32; 2],
    pub tex_coord: [f32; 2],
}

/// Four-vertex triangle strip covering the surface bounds.
///
/// The producer's image origin is inverted relative to the draw graph's, so
/// the texture-coordinate mapping is vertically flipped: the geometric top
/// edge samples v=1, the bottom edge v=0.
pub struct QuadGeometry {
    vertices: [TexturedVertex; 4],
}

impl QuadGeometry {
    pub fn new() -> Self {
        Self {
            vertices: [TexturedVertex {
                position: [0.0, 0.0],
                tex_coord: [0.0, 0.0],
            }; 4],
        }
    }

    /// Recompute the strip for `bounds`. Cheap and idempotent; called on
    /// every draw-graph build.
    ///
    /// Strip order: top-left, bottom-left, top-right, bottom-right.
    pub fn update(&mut self, bounds: Rect) {
        self.vertices = [
            TexturedVertex {
                position: [bounds.left(), bounds.top()],
                tex_coord: [0.0, 1.0],
            },
            TexturedVertex {
                position: [bounds.left(), bounds.bottom()],
                tex_coord: [0.0, 0.0],
            },
            TexturedVertex {
                position: [bounds.right(), bounds.top()],
                tex_coord: [1.0, 1.0],
            },
            TexturedVertex {
                position: [bounds.right(), bounds.bottom()],
                tex_coord: [1.0, 0.0],
            },
        ];
    }

    pub fn vertices(&self) -> &[TexturedVertex; 4] {
        &self.vertices
    }

    /// Raw bytes for vertex-buffer upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

impl Default for QuadGeometry {
    fn default() -> Self {
        Self::new()
    }
}
