//! A spinning, per-face-colored cube drawn through a programmable OpenGL pipeline.
//!
//! The host owns the window and calls into a [`Renderer`] when the surface is created, when it
//! is resized and when a frame is due. Everything the renderer needs from the driver goes through
//! the [`abs::Gpu`] trait.

pub mod abs;
pub mod config;
pub mod error;
pub mod logging;
pub mod render;

pub use error::RenderError;
pub use render::{Renderer, RendererState};
