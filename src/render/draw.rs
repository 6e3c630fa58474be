//! The per-frame draw call.
//!
//! This is the only place GPU state changes from frame to frame. [`draw`] always leaves the
//! pipeline with no program and no vertex array bound, even if a driver call panics halfway.

use glam::Mat4;

use crate::{
    abs::{Geometry, Gpu, ShaderProgram, UniformLocation},
    error::RenderError,
};

pub const ATTRIBUTE_POSITION: &str = "a_Position";
pub const ATTRIBUTE_COLOR: &str = "a_Color";
pub const UNIFORM_MVP_MATRIX: &str = "u_MVPMatrix";

pub const POSITION_LOCATION: u32 = 0;
pub const COLOR_LOCATION: u32 = 1;

/// Attribute locations fixed before linking.
pub const ATTRIBUTE_BINDINGS: [(u32, &str); 2] = [
    (POSITION_LOCATION, ATTRIBUTE_POSITION),
    (COLOR_LOCATION, ATTRIBUTE_COLOR),
];

/// Locations of everything [`draw`] feeds, looked up once per program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramBindings {
    pub position: u32,
    pub color: u32,
    pub mvp_matrix: UniformLocation,
}

impl ProgramBindings {
    pub fn resolve<G: Gpu>(program: &ShaderProgram<G>) -> Result<Self, RenderError> {
        Ok(Self {
            position: program.attrib_location(ATTRIBUTE_POSITION)?,
            color: program.attrib_location(ATTRIBUTE_COLOR)?,
            mvp_matrix: program.uniform_location(UNIFORM_MVP_MATRIX)?,
        })
    }
}

/// Keeps a program and vertex array bound until dropped.
struct ActiveProgram<'a, G: Gpu> {
    gl: &'a G,
}

impl<'a, G: Gpu> ActiveProgram<'a, G> {
    fn bind(gl: &'a G, program: &ShaderProgram<G>, geometry: &Geometry<G>) -> Self {
        program.use_program();
        gl.bind_vertex_array(Some(geometry.vertex_array()));
        Self { gl }
    }
}

impl<G: Gpu> Drop for ActiveProgram<'_, G> {
    fn drop(&mut self) {
        self.gl.bind_buffer(glow::ARRAY_BUFFER, None);
        self.gl.bind_vertex_array(None);
        self.gl.use_program(None);
    }
}

/// Draws `geometry` as a triangle list with `program`, transformed by `mvp_matrix`.
pub fn draw<G: Gpu>(
    gl: &G,
    program: &ShaderProgram<G>,
    geometry: &Geometry<G>,
    bindings: &ProgramBindings,
    mvp_matrix: &Mat4,
) {
    let _active = ActiveProgram::bind(gl, program, geometry);

    gl.bind_buffer(glow::ARRAY_BUFFER, Some(geometry.position_buffer()));
    gl.vertex_attrib_pointer_f32(
        bindings.position,
        geometry.positions().components() as i32,
        glow::FLOAT,
        false,
        0,
        0,
    );
    gl.enable_vertex_attrib_array(bindings.position);

    gl.bind_buffer(glow::ARRAY_BUFFER, Some(geometry.color_buffer()));
    gl.vertex_attrib_pointer_f32(
        bindings.color,
        geometry.colors().components() as i32,
        glow::FLOAT,
        false,
        0,
        0,
    );
    gl.enable_vertex_attrib_array(bindings.color);

    gl.uniform_matrix_4_f32_slice(bindings.mvp_matrix, false, &mvp_matrix.to_cols_array());
    gl.check_error("glUniformMatrix4fv");
    gl.draw_arrays(glow::TRIANGLES, 0, geometry.vertex_count() as i32);
    gl.check_error("glDrawArrays");
}
