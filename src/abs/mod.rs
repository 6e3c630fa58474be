//! This module contains the thin OpenGL layer the renderer is built on: the driver boundary,
//! shader compilation and linking, vertex geometry and the SDL2 window that hosts it all.

pub mod app;
#[cfg(test)]
pub mod fake;
pub mod geometry;
pub mod gpu;
pub mod shader;

pub use app::*;
pub use geometry::*;
pub use gpu::*;
pub use shader::*;
