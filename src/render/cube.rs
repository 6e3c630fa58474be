//! Static cube geometry.
//!
//! 36 vertices: six faces of two triangles each, in the order front, right, back, left, top,
//! bottom. Every triangle is wound counter-clockwise when seen from outside the cube, which is
//! what the renderer's back-face culling treats as front-facing. Reversing the winding hides the
//! outside of the cube and shows the inside instead.

use std::rc::Rc;

use crate::{
    abs::{Geometry, Gpu, VertexStream},
    error::RenderError,
};

/// Floats per vertex position (x, y, z).
pub const POSITION_DATA_SIZE: usize = 3;
/// Floats per vertex color (r, g, b, a).
pub const COLOR_DATA_SIZE: usize = 4;
pub const VERTICES_PER_FACE: usize = 6;
pub const VERTEX_COUNT: usize = Face::ALL.len() * VERTICES_PER_FACE;

/// The faces of the cube, in the order their vertices are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    Front,
    Right,
    Back,
    Left,
    Top,
    Bottom,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::Front,
        Face::Right,
        Face::Back,
        Face::Left,
        Face::Top,
        Face::Bottom,
    ];

    /// The solid RGBA color of this face.
    pub const fn color(self) -> [f32; 4] {
        match self {
            Face::Front => [1.0, 0.0, 0.0, 1.0],
            Face::Right => [0.0, 1.0, 0.0, 1.0],
            Face::Back => [0.0, 0.0, 1.0, 1.0],
            Face::Left => [1.0, 1.0, 0.0, 1.0],
            Face::Top => [0.0, 1.0, 1.0, 1.0],
            Face::Bottom => [1.0, 0.0, 1.0, 1.0],
        }
    }
}

#[rustfmt::skip]
pub static CUBE_POSITIONS: [f32; VERTEX_COUNT * POSITION_DATA_SIZE] = [
    // Front
    -1.0, 1.0, 1.0,
    -1.0, -1.0, 1.0,
    1.0, 1.0, 1.0,
    -1.0, -1.0, 1.0,
    1.0, -1.0, 1.0,
    1.0, 1.0, 1.0,
    // Right
    1.0, 1.0, 1.0,
    1.0, -1.0, 1.0,
    1.0, 1.0, -1.0,
    1.0, -1.0, 1.0,
    1.0, -1.0, -1.0,
    1.0, 1.0, -1.0,
    // Back
    1.0, 1.0, -1.0,
    1.0, -1.0, -1.0,
    -1.0, 1.0, -1.0,
    1.0, -1.0, -1.0,
    -1.0, -1.0, -1.0,
    -1.0, 1.0, -1.0,
    // Left
    -1.0, 1.0, -1.0,
    -1.0, -1.0, -1.0,
    -1.0, 1.0, 1.0,
    -1.0, -1.0, -1.0,
    -1.0, -1.0, 1.0,
    -1.0, 1.0, 1.0,
    // Top
    -1.0, 1.0, -1.0,
    -1.0, 1.0, 1.0,
    1.0, 1.0, -1.0,
    -1.0, 1.0, 1.0,
    1.0, 1.0, 1.0,
    1.0, 1.0, -1.0,
    // Bottom
    1.0, -1.0, -1.0,
    1.0, -1.0, 1.0,
    -1.0, -1.0, -1.0,
    1.0, -1.0, 1.0,
    -1.0, -1.0, 1.0,
    -1.0, -1.0, -1.0,
];

pub static CUBE_COLORS: [f32; VERTEX_COUNT * COLOR_DATA_SIZE] = face_colors();

const fn face_colors() -> [f32; VERTEX_COUNT * COLOR_DATA_SIZE] {
    let mut data = [0.0; VERTEX_COUNT * COLOR_DATA_SIZE];
    let mut face = 0;
    while face < Face::ALL.len() {
        let color = Face::ALL[face].color();
        let mut vertex = 0;
        while vertex < VERTICES_PER_FACE {
            let base = (face * VERTICES_PER_FACE + vertex) * COLOR_DATA_SIZE;
            let mut channel = 0;
            while channel < COLOR_DATA_SIZE {
                data[base + channel] = color[channel];
                channel += 1;
            }
            vertex += 1;
        }
        face += 1;
    }
    data
}

pub fn position_stream() -> VertexStream {
    VertexStream::new(&CUBE_POSITIONS, POSITION_DATA_SIZE)
}

pub fn color_stream() -> VertexStream {
    VertexStream::new(&CUBE_COLORS, COLOR_DATA_SIZE)
}

/// Uploads the cube to the GPU.
pub fn geometry<G: Gpu>(gl: &Rc<G>) -> Result<Geometry<G>, RenderError> {
    Geometry::new(gl, position_stream(), color_stream())
}
