//! Module for anything related to drawing the cube.
//!
//! This module contains the cube's static data, the transform pipeline, the per-frame draw call
//! and the [`Renderer`] that ties them to the host's lifecycle callbacks.

pub mod cube;
pub mod draw;
pub mod renderer;
pub mod transform;

pub use renderer::{Renderer, RendererState};
