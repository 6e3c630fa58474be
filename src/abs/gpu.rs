//! The GPU driver boundary.
//!
//! The rendering core never talks to OpenGL directly. It goes through the [`Gpu`] trait, which
//! mirrors the small subset of [`glow::HasContext`] the cube needs, but trades glow's per-platform
//! object types for plain opaque handles ([`ShaderHandle`], [`ProgramHandle`], ...). Every handle
//! type reserves the raw value `0` as its invalid sentinel, the same way the driver does.

use std::num::NonZeroU32;

use glow::HasContext;

use crate::abs::ShaderStage;

macro_rules! gpu_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(u32);

        impl $name {
            /// The sentinel the driver returns when it could not create the object.
            pub const INVALID: Self = Self(0);

            pub const fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            pub const fn raw(self) -> u32 {
                self.0
            }

            pub const fn is_valid(self) -> bool {
                self.0 != 0
            }
        }
    };
}

gpu_handle!(
    /// A single compiled (or compiling) shader stage.
    ShaderHandle
);
gpu_handle!(
    /// A program object made of linked shader stages.
    ProgramHandle
);
gpu_handle!(
    /// A buffer object holding vertex data.
    BufferHandle
);
gpu_handle!(
    /// A vertex array object recording attribute layout.
    VertexArrayHandle
);

/// Location of a uniform inside a linked program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(u32);

impl UniformLocation {
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// The driver calls the rendering core depends on.
///
/// All calls are synchronous and only affect the context current on the calling thread. Enum
/// arguments (`target`, `mode`, `cap`, ...) take the raw `glow` constants.
pub trait Gpu {
    fn create_shader(&self, stage: ShaderStage) -> ShaderHandle;
    fn shader_source(&self, shader: ShaderHandle, source: &str);
    fn compile_shader(&self, shader: ShaderHandle);
    fn get_shader_compile_status(&self, shader: ShaderHandle) -> bool;
    fn get_shader_info_log(&self, shader: ShaderHandle) -> String;
    fn delete_shader(&self, shader: ShaderHandle);

    fn create_program(&self) -> ProgramHandle;
    fn attach_shader(&self, program: ProgramHandle, shader: ShaderHandle);
    fn detach_shader(&self, program: ProgramHandle, shader: ShaderHandle);
    fn bind_attrib_location(&self, program: ProgramHandle, index: u32, name: &str);
    fn link_program(&self, program: ProgramHandle);
    fn get_program_link_status(&self, program: ProgramHandle) -> bool;
    fn get_program_info_log(&self, program: ProgramHandle) -> String;
    fn delete_program(&self, program: ProgramHandle);
    fn use_program(&self, program: Option<ProgramHandle>);

    fn get_attrib_location(&self, program: ProgramHandle, name: &str) -> Option<u32>;
    fn get_uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation>;
    fn uniform_matrix_4_f32_slice(&self, location: UniformLocation, transpose: bool, value: &[f32]);

    fn create_buffer(&self) -> BufferHandle;
    fn bind_buffer(&self, target: u32, buffer: Option<BufferHandle>);
    fn buffer_data_u8_slice(&self, target: u32, data: &[u8], usage: u32);
    fn delete_buffer(&self, buffer: BufferHandle);

    fn create_vertex_array(&self) -> VertexArrayHandle;
    fn bind_vertex_array(&self, vertex_array: Option<VertexArrayHandle>);
    fn delete_vertex_array(&self, vertex_array: VertexArrayHandle);
    fn vertex_attrib_pointer_f32(
        &self,
        index: u32,
        size: i32,
        data_type: u32,
        normalized: bool,
        stride: i32,
        offset: i32,
    );
    fn enable_vertex_attrib_array(&self, index: u32);

    fn draw_arrays(&self, mode: u32, first: i32, count: i32);
    fn enable(&self, cap: u32);
    fn cull_face(&self, mode: u32);
    fn front_face(&self, mode: u32);
    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    fn clear_color(&self, red: f32, green: f32, blue: f32, alpha: f32);
    fn clear(&self, mask: u32);
    fn get_error(&self) -> u32;

    /// Drains the driver's error queue and logs every code against `operation`.
    ///
    /// Only active in debug builds. The codes are advisory; nothing is recovered from them.
    fn check_error(&self, operation: &str) {
        if !cfg!(debug_assertions) {
            return;
        }
        for _ in 0..MAX_DRAINED_ERRORS {
            let code = self.get_error();
            if code == glow::NO_ERROR {
                break;
            }
            log::error!("{operation}: glError 0x{code:04X}");
        }
    }
}

/// Upper bound on how many queued error codes [`Gpu::check_error`] drains per call. A lost
/// context may report the same error forever.
const MAX_DRAINED_ERRORS: usize = 8;

fn native_shader(handle: ShaderHandle) -> Option<glow::NativeShader> {
    NonZeroU32::new(handle.raw()).map(glow::NativeShader)
}

fn native_program(handle: ProgramHandle) -> Option<glow::NativeProgram> {
    NonZeroU32::new(handle.raw()).map(glow::NativeProgram)
}

fn native_buffer(handle: BufferHandle) -> Option<glow::NativeBuffer> {
    NonZeroU32::new(handle.raw()).map(glow::NativeBuffer)
}

fn native_vertex_array(handle: VertexArrayHandle) -> Option<glow::NativeVertexArray> {
    NonZeroU32::new(handle.raw()).map(glow::NativeVertexArray)
}

// Calls taking an invalid handle are dropped instead of being forwarded, since the driver would
// only answer them with GL_INVALID_VALUE.
impl Gpu for glow::Context {
    fn create_shader(&self, stage: ShaderStage) -> ShaderHandle {
        match unsafe { HasContext::create_shader(self, stage.gl_enum()) } {
            Ok(shader) => ShaderHandle::from_raw(shader.0.get()),
            Err(e) => {
                log::error!("glCreateShader({stage}): {e}");
                ShaderHandle::INVALID
            }
        }
    }

    fn shader_source(&self, shader: ShaderHandle, source: &str) {
        if let Some(shader) = native_shader(shader) {
            unsafe { HasContext::shader_source(self, shader, source) }
        }
    }

    fn compile_shader(&self, shader: ShaderHandle) {
        if let Some(shader) = native_shader(shader) {
            unsafe { HasContext::compile_shader(self, shader) }
        }
    }

    fn get_shader_compile_status(&self, shader: ShaderHandle) -> bool {
        native_shader(shader)
            .is_some_and(|shader| unsafe { HasContext::get_shader_compile_status(self, shader) })
    }

    fn get_shader_info_log(&self, shader: ShaderHandle) -> String {
        native_shader(shader)
            .map(|shader| unsafe { HasContext::get_shader_info_log(self, shader) })
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: ShaderHandle) {
        if let Some(shader) = native_shader(shader) {
            unsafe { HasContext::delete_shader(self, shader) }
        }
    }

    fn create_program(&self) -> ProgramHandle {
        match unsafe { HasContext::create_program(self) } {
            Ok(program) => ProgramHandle::from_raw(program.0.get()),
            Err(e) => {
                log::error!("glCreateProgram: {e}");
                ProgramHandle::INVALID
            }
        }
    }

    fn attach_shader(&self, program: ProgramHandle, shader: ShaderHandle) {
        if let (Some(program), Some(shader)) = (native_program(program), native_shader(shader)) {
            unsafe { HasContext::attach_shader(self, program, shader) }
        }
    }

    fn detach_shader(&self, program: ProgramHandle, shader: ShaderHandle) {
        if let (Some(program), Some(shader)) = (native_program(program), native_shader(shader)) {
            unsafe { HasContext::detach_shader(self, program, shader) }
        }
    }

    fn bind_attrib_location(&self, program: ProgramHandle, index: u32, name: &str) {
        if let Some(program) = native_program(program) {
            unsafe { HasContext::bind_attrib_location(self, program, index, name) }
        }
    }

    fn link_program(&self, program: ProgramHandle) {
        if let Some(program) = native_program(program) {
            unsafe { HasContext::link_program(self, program) }
        }
    }

    fn get_program_link_status(&self, program: ProgramHandle) -> bool {
        native_program(program)
            .is_some_and(|program| unsafe { HasContext::get_program_link_status(self, program) })
    }

    fn get_program_info_log(&self, program: ProgramHandle) -> String {
        native_program(program)
            .map(|program| unsafe { HasContext::get_program_info_log(self, program) })
            .unwrap_or_default()
    }

    fn delete_program(&self, program: ProgramHandle) {
        if let Some(program) = native_program(program) {
            unsafe { HasContext::delete_program(self, program) }
        }
    }

    fn use_program(&self, program: Option<ProgramHandle>) {
        unsafe { HasContext::use_program(self, program.and_then(native_program)) }
    }

    fn get_attrib_location(&self, program: ProgramHandle, name: &str) -> Option<u32> {
        native_program(program)
            .and_then(|program| unsafe { HasContext::get_attrib_location(self, program, name) })
    }

    fn get_uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        native_program(program)
            .and_then(|program| unsafe { HasContext::get_uniform_location(self, program, name) })
            .map(|location| UniformLocation::from_raw(location.0))
    }

    fn uniform_matrix_4_f32_slice(
        &self,
        location: UniformLocation,
        transpose: bool,
        value: &[f32],
    ) {
        let location = glow::NativeUniformLocation(location.raw());
        unsafe { HasContext::uniform_matrix_4_f32_slice(self, Some(&location), transpose, value) }
    }

    fn create_buffer(&self) -> BufferHandle {
        match unsafe { HasContext::create_buffer(self) } {
            Ok(buffer) => BufferHandle::from_raw(buffer.0.get()),
            Err(e) => {
                log::error!("glGenBuffers: {e}");
                BufferHandle::INVALID
            }
        }
    }

    fn bind_buffer(&self, target: u32, buffer: Option<BufferHandle>) {
        unsafe { HasContext::bind_buffer(self, target, buffer.and_then(native_buffer)) }
    }

    fn buffer_data_u8_slice(&self, target: u32, data: &[u8], usage: u32) {
        unsafe { HasContext::buffer_data_u8_slice(self, target, data, usage) }
    }

    fn delete_buffer(&self, buffer: BufferHandle) {
        if let Some(buffer) = native_buffer(buffer) {
            unsafe { HasContext::delete_buffer(self, buffer) }
        }
    }

    fn create_vertex_array(&self) -> VertexArrayHandle {
        match unsafe { HasContext::create_vertex_array(self) } {
            Ok(vertex_array) => VertexArrayHandle::from_raw(vertex_array.0.get()),
            Err(e) => {
                log::error!("glGenVertexArrays: {e}");
                VertexArrayHandle::INVALID
            }
        }
    }

    fn bind_vertex_array(&self, vertex_array: Option<VertexArrayHandle>) {
        unsafe { HasContext::bind_vertex_array(self, vertex_array.and_then(native_vertex_array)) }
    }

    fn delete_vertex_array(&self, vertex_array: VertexArrayHandle) {
        if let Some(vertex_array) = native_vertex_array(vertex_array) {
            unsafe { HasContext::delete_vertex_array(self, vertex_array) }
        }
    }

    fn vertex_attrib_pointer_f32(
        &self,
        index: u32,
        size: i32,
        data_type: u32,
        normalized: bool,
        stride: i32,
        offset: i32,
    ) {
        unsafe {
            HasContext::vertex_attrib_pointer_f32(
                self, index, size, data_type, normalized, stride, offset,
            )
        }
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        unsafe { HasContext::enable_vertex_attrib_array(self, index) }
    }

    fn draw_arrays(&self, mode: u32, first: i32, count: i32) {
        unsafe { HasContext::draw_arrays(self, mode, first, count) }
    }

    fn enable(&self, cap: u32) {
        unsafe { HasContext::enable(self, cap) }
    }

    fn cull_face(&self, mode: u32) {
        unsafe { HasContext::cull_face(self, mode) }
    }

    fn front_face(&self, mode: u32) {
        unsafe { HasContext::front_face(self, mode) }
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { HasContext::viewport(self, x, y, width, height) }
    }

    fn clear_color(&self, red: f32, green: f32, blue: f32, alpha: f32) {
        unsafe { HasContext::clear_color(self, red, green, blue, alpha) }
    }

    fn clear(&self, mask: u32) {
        unsafe { HasContext::clear(self, mask) }
    }

    fn get_error(&self) -> u32 {
        unsafe { HasContext::get_error(self) }
    }
}
