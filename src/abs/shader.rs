//! OpenGL Shaders
//!
//! This module defines the [`Shader`] and [`ShaderProgram`] structs for compiling shader stages
//! and linking them into drawable programs, plus [`ShaderSources`] for getting hold of the
//! source text in the first place.

use std::{fmt, path::Path, rc::Rc};

use crate::{
    abs::{Gpu, ProgramHandle, ShaderHandle, UniformLocation},
    error::RenderError,
};

/// Which pipeline step a shader stage is compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    /// The `glow` constant naming this stage.
    pub fn gl_enum(self) -> u32 {
        match self {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Source text for the two stages of a program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSources {
    pub vertex: String,
    pub fragment: String,
}

impl ShaderSources {
    pub const VERTEX_FILE: &'static str = "vertex_shader.glsl";
    pub const FRAGMENT_FILE: &'static str = "fragment_shader.glsl";

    /// The sources compiled into the binary.
    pub fn builtin() -> Self {
        Self {
            vertex: include_str!("../shaders/cube/vertex_shader.glsl").to_string(),
            fragment: include_str!("../shaders/cube/fragment_shader.glsl").to_string(),
        }
    }

    /// Reads `vertex_shader.glsl` and `fragment_shader.glsl` from `dir`.
    pub fn from_dir(dir: &Path) -> Result<Self, String> {
        let read = |name: &str| {
            let path = dir.join(name);
            std::fs::read_to_string(&path)
                .map_err(|e| format!("Failed to read shader {}: {e}", path.display()))
        };
        Ok(Self {
            vertex: read(Self::VERTEX_FILE)?,
            fragment: read(Self::FRAGMENT_FILE)?,
        })
    }
}

/// Represents an individual compiled shader stage.
///
/// The stage object is deleted when this value is dropped. Once a program has been linked from
/// it, that is always safe: linking copies the compiled stage into the program.
pub struct Shader<G: Gpu> {
    gl: Rc<G>,
    handle: ShaderHandle,
    stage: ShaderStage,
}

impl<G: Gpu> Shader<G> {
    /// Compiles a new shader stage from the given source code.
    ///
    /// On failure the driver's info log is returned in [`RenderError::Compile`] and the
    /// partially created stage is deleted.
    pub fn compile(gl: &Rc<G>, stage: ShaderStage, source: &str) -> Result<Self, RenderError> {
        let handle = gl.create_shader(stage);
        if !handle.is_valid() {
            return Err(RenderError::ResourceExhausted {
                resource: "shader",
            });
        }

        gl.shader_source(handle, source);
        gl.compile_shader(handle);
        gl.check_error("glCompileShader");

        if !gl.get_shader_compile_status(handle) {
            let mut log = gl.get_shader_info_log(handle);
            gl.delete_shader(handle);
            if log.trim().is_empty() {
                log = "driver reported no diagnostics".to_string();
            }
            log::error!("Error compiling {stage} shader: {}", log.trim_end());
            return Err(RenderError::Compile { stage, log });
        }

        Ok(Self {
            gl: Rc::clone(gl),
            handle,
            stage,
        })
    }

    pub fn handle(&self) -> ShaderHandle {
        self.handle
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }
}

impl<G: Gpu> Drop for Shader<G> {
    fn drop(&mut self) {
        self.gl.delete_shader(self.handle);
    }
}

/// Represents a successfully linked shader program.
///
/// A value of this type only exists when the link status was success, so anything holding one
/// may draw with it.
pub struct ShaderProgram<G: Gpu> {
    gl: Rc<G>,
    handle: ProgramHandle,
}

impl<G: Gpu> ShaderProgram<G> {
    /// Links a program from a vertex and a fragment stage.
    ///
    /// `attribute_bindings` pins named vertex attributes to fixed locations before linking, so
    /// the layout no longer depends on declaration order in the source. On failure the program
    /// object is deleted and the link log is returned in [`RenderError::Link`].
    pub fn link(
        gl: &Rc<G>,
        vertex: &Shader<G>,
        fragment: &Shader<G>,
        attribute_bindings: &[(u32, &str)],
    ) -> Result<Self, RenderError> {
        debug_assert_eq!(vertex.stage(), ShaderStage::Vertex);
        debug_assert_eq!(fragment.stage(), ShaderStage::Fragment);

        let program = gl.create_program();
        if !program.is_valid() {
            return Err(RenderError::ResourceExhausted {
                resource: "program",
            });
        }

        gl.attach_shader(program, vertex.handle());
        gl.attach_shader(program, fragment.handle());
        for &(index, name) in attribute_bindings {
            gl.bind_attrib_location(program, index, name);
        }
        gl.link_program(program);
        gl.check_error("glLinkProgram");

        if !gl.get_program_link_status(program) {
            let mut log = gl.get_program_info_log(program);
            gl.delete_program(program);
            if log.trim().is_empty() {
                log = "driver reported no diagnostics".to_string();
            }
            log::error!("Error linking program: {}", log.trim_end());
            return Err(RenderError::Link { log });
        }

        gl.detach_shader(program, vertex.handle());
        gl.detach_shader(program, fragment.handle());

        log::info!("Linked shader program {}", program.raw());
        Ok(Self {
            gl: Rc::clone(gl),
            handle: program,
        })
    }

    /// Compiles both stages from `sources` and links them.
    ///
    /// The intermediate stage objects are released before returning, whether or not linking
    /// succeeded.
    pub fn from_sources(
        gl: &Rc<G>,
        sources: &ShaderSources,
        attribute_bindings: &[(u32, &str)],
    ) -> Result<Self, RenderError> {
        let vertex = Shader::compile(gl, ShaderStage::Vertex, &sources.vertex)?;
        let fragment = Shader::compile(gl, ShaderStage::Fragment, &sources.fragment)?;
        Self::link(gl, &vertex, &fragment, attribute_bindings)
    }

    pub fn handle(&self) -> ProgramHandle {
        self.handle
    }

    /// Looks up an active vertex attribute.
    pub fn attrib_location(&self, name: &'static str) -> Result<u32, RenderError> {
        self.gl
            .get_attrib_location(self.handle, name)
            .ok_or(RenderError::MissingInput { name })
    }

    /// Looks up an active uniform.
    pub fn uniform_location(&self, name: &'static str) -> Result<UniformLocation, RenderError> {
        self.gl
            .get_uniform_location(self.handle, name)
            .ok_or(RenderError::MissingInput { name })
    }

    /// Binds the shader program for use.
    pub fn use_program(&self) {
        self.gl.use_program(Some(self.handle));
    }
}

impl<G: Gpu> Drop for ShaderProgram<G> {
    fn drop(&mut self) {
        self.gl.delete_program(self.handle);
    }
}
