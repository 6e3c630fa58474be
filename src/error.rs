//! Errors raised by the rendering core.
//!
//! Compile and link failures are fatal to the render session. A
//! [`RenderError::DegenerateSurface`] is recoverable: the host simply waits for the next resize.

use std::fmt;

use crate::abs::ShaderStage;

/// Every way the rendering core can fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// A shader stage failed to compile. `log` holds the driver diagnostics.
    Compile { stage: ShaderStage, log: String },
    /// The program failed to link. `log` holds the driver diagnostics.
    Link { log: String },
    /// The driver handed back the invalid handle when asked for a new object.
    ResourceExhausted { resource: &'static str },
    /// The surface has no area, so no aspect ratio can be derived from it.
    DegenerateSurface { width: i32, height: i32 },
    /// A name the draw protocol relies on is not active in the linked program.
    MissingInput { name: &'static str },
    /// Position and color streams disagree on how many vertices there are.
    GeometryLayout { positions: usize, colors: usize },
    /// A lifecycle callback arrived in a state that does not accept it.
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Compile { stage, log } => {
                write!(f, "failed to compile {stage} shader: {}", log.trim_end())
            }
            RenderError::Link { log } => {
                write!(f, "failed to link shader program: {}", log.trim_end())
            }
            RenderError::ResourceExhausted { resource } => {
                write!(f, "driver could not create a {resource}")
            }
            RenderError::DegenerateSurface { width, height } => {
                write!(f, "surface of size {width}x{height} has no area")
            }
            RenderError::MissingInput { name } => {
                write!(f, "shader program has no active input named `{name}`")
            }
            RenderError::GeometryLayout { positions, colors } => {
                write!(f, "geometry has {positions} positions but {colors} colors")
            }
            RenderError::InvalidState { operation, state } => {
                write!(f, "`{operation}` called while renderer is {state}")
            }
        }
    }
}

impl std::error::Error for RenderError {}
