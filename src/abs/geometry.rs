//! Vertex geometry management module.
//!
//! [`VertexStream`] is a rewindable cursor over a static float sequence, one fixed-size group of
//! components per vertex. [`Geometry`] pairs a position stream with a color stream and uploads
//! both into GPU buffers, tightly packed and in native byte order.

use std::rc::Rc;

use crate::{
    abs::{BufferHandle, Gpu, VertexArrayHandle},
    error::RenderError,
};

/// Size of one vertex component on the GPU side, in bytes.
pub const BYTES_PER_FLOAT: usize = std::mem::size_of::<f32>();

/// A read-only cursor over per-vertex float data.
#[derive(Debug, Clone)]
pub struct VertexStream {
    data: &'static [f32],
    components: usize,
    position: usize,
}

impl VertexStream {
    /// Wraps `data`, which holds `components` floats per vertex.
    ///
    /// # Panics
    ///
    /// If `components` is zero or does not evenly divide `data`.
    pub fn new(data: &'static [f32], components: usize) -> Self {
        assert!(components > 0, "a vertex needs at least one component");
        assert!(
            data.len().is_multiple_of(components),
            "{} floats do not split into vertices of {components} components",
            data.len()
        );
        Self {
            data,
            components,
            position: 0,
        }
    }

    /// Moves the cursor back to the first vertex.
    pub fn rewind(&mut self) {
        self.position = 0;
    }

    /// Index of the next vertex the cursor will yield.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn components(&self) -> usize {
        self.components
    }

    pub fn vertex_count(&self) -> usize {
        self.data.len() / self.components
    }

    /// Every float from the cursor to the end.
    pub fn remaining(&self) -> &'static [f32] {
        &self.data[self.position * self.components..]
    }

    /// [`Self::remaining`] as raw bytes, ready for upload.
    pub fn remaining_bytes(&self) -> &'static [u8] {
        bytemuck::cast_slice(self.remaining())
    }
}

impl Iterator for VertexStream {
    type Item = &'static [f32];

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.position * self.components;
        let vertex = self.data.get(start..start + self.components)?;
        self.position += 1;
        Some(vertex)
    }
}

/// One attribute's GPU buffer and the stream it was filled from.
struct AttributeBuffer {
    buffer: BufferHandle,
    stream: VertexStream,
}

/// Position and color data living on the GPU side.
///
/// The contents never change after construction.
pub struct Geometry<G: Gpu> {
    gl: Rc<G>,
    vertex_array: VertexArrayHandle,
    positions: AttributeBuffer,
    colors: AttributeBuffer,
}

impl<G: Gpu> Geometry<G> {
    /// Uploads both streams, each from its first vertex.
    pub fn new(
        gl: &Rc<G>,
        positions: VertexStream,
        colors: VertexStream,
    ) -> Result<Self, RenderError> {
        if positions.vertex_count() != colors.vertex_count() {
            return Err(RenderError::GeometryLayout {
                positions: positions.vertex_count(),
                colors: colors.vertex_count(),
            });
        }

        let vertex_array = gl.create_vertex_array();
        if !vertex_array.is_valid() {
            return Err(RenderError::ResourceExhausted {
                resource: "vertex array",
            });
        }
        let mut geometry = Self {
            gl: Rc::clone(gl),
            vertex_array,
            positions: AttributeBuffer {
                buffer: BufferHandle::INVALID,
                stream: positions,
            },
            colors: AttributeBuffer {
                buffer: BufferHandle::INVALID,
                stream: colors,
            },
        };
        // Dropping `geometry` on error releases whatever was already created.
        geometry.positions.buffer = Self::upload(gl, &mut geometry.positions.stream)?;
        geometry.colors.buffer = Self::upload(gl, &mut geometry.colors.stream)?;
        Ok(geometry)
    }

    fn upload(gl: &Rc<G>, stream: &mut VertexStream) -> Result<BufferHandle, RenderError> {
        let buffer = gl.create_buffer();
        if !buffer.is_valid() {
            return Err(RenderError::ResourceExhausted { resource: "buffer" });
        }
        stream.rewind();
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(buffer));
        gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, stream.remaining_bytes(), glow::STATIC_DRAW);
        gl.bind_buffer(glow::ARRAY_BUFFER, None);
        gl.check_error("glBufferData");
        Ok(buffer)
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.stream.vertex_count()
    }

    pub fn vertex_array(&self) -> VertexArrayHandle {
        self.vertex_array
    }

    pub fn position_buffer(&self) -> BufferHandle {
        self.positions.buffer
    }

    pub fn color_buffer(&self) -> BufferHandle {
        self.colors.buffer
    }

    /// A fresh cursor over the position data.
    pub fn positions(&self) -> VertexStream {
        let mut stream = self.positions.stream.clone();
        stream.rewind();
        stream
    }

    /// A fresh cursor over the color data.
    pub fn colors(&self) -> VertexStream {
        let mut stream = self.colors.stream.clone();
        stream.rewind();
        stream
    }
}

impl<G: Gpu> Drop for Geometry<G> {
    fn drop(&mut self) {
        self.gl.delete_buffer(self.positions.buffer);
        self.gl.delete_buffer(self.colors.buffer);
        self.gl.delete_vertex_array(self.vertex_array);
    }
}
