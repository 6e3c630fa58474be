//! The frame renderer.
//!
//! The host drives a [`Renderer`] through three callbacks, always from the thread that owns the
//! GL context and never concurrently:
//!
//! - [`Renderer::on_surface_created`] once, when the context is ready,
//! - [`Renderer::on_surface_resized`] whenever the drawable size changes,
//! - [`Renderer::on_frame`] whenever a new frame is due.
//!
//! Each callback checks that the renderer is in a state that accepts it. A failure while
//! creating the surface resources is final: the renderer refuses every callback afterwards.

use std::{rc::Rc, time::Instant};

use crate::{
    abs::{Geometry, Gpu, ShaderProgram, ShaderSources},
    error::RenderError,
    render::{
        cube,
        draw::{ATTRIBUTE_BINDINGS, ProgramBindings, draw},
        transform::{EYE, LOOK_AT, Transforms, UP, rotation_angle},
    },
};

/// Where the renderer is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererState {
    /// No surface yet.
    Uninitialized,
    /// GPU resources exist but the surface size is unknown.
    Ready,
    /// Frames can be drawn.
    SizeKnown,
    /// Creating the GPU resources failed. Nothing will be drawn.
    Failed,
}

impl RendererState {
    pub fn name(self) -> &'static str {
        match self {
            RendererState::Uninitialized => "uninitialized",
            RendererState::Ready => "ready",
            RendererState::SizeKnown => "size known",
            RendererState::Failed => "failed",
        }
    }
}

/// Everything created together with the surface.
struct Scene<G: Gpu> {
    program: ShaderProgram<G>,
    bindings: ProgramBindings,
    geometry: Geometry<G>,
}

impl<G: Gpu> Scene<G> {
    fn build(gl: &Rc<G>, sources: &ShaderSources) -> Result<Self, RenderError> {
        let program = ShaderProgram::from_sources(gl, sources, &ATTRIBUTE_BINDINGS)?;
        let bindings = ProgramBindings::resolve(&program)?;
        let geometry = cube::geometry(gl)?;
        Ok(Self {
            program,
            bindings,
            geometry,
        })
    }
}

enum Stage<G: Gpu> {
    Uninitialized,
    Ready(Scene<G>),
    SizeKnown(Scene<G>),
    Failed,
}

/// Draws a single spinning cube.
pub struct Renderer<G: Gpu> {
    gl: Rc<G>,
    stage: Stage<G>,
    transforms: Transforms,
    started: Instant,
}

impl<G: Gpu> Renderer<G> {
    pub fn new(gl: Rc<G>) -> Self {
        Self {
            gl,
            stage: Stage::Uninitialized,
            transforms: Transforms::new(),
            started: Instant::now(),
        }
    }

    pub fn state(&self) -> RendererState {
        match self.stage {
            Stage::Uninitialized => RendererState::Uninitialized,
            Stage::Ready(_) => RendererState::Ready,
            Stage::SizeKnown(_) => RendererState::SizeKnown,
            Stage::Failed => RendererState::Failed,
        }
    }

    pub fn transforms(&self) -> &Transforms {
        &self.transforms
    }

    fn invalid(&self, operation: &'static str) -> RenderError {
        let state = self.state();
        log::warn!("Ignoring {operation} while renderer is {}", state.name());
        RenderError::InvalidState {
            operation,
            state: state.name(),
        }
    }

    /// Builds the camera, the shader program and the cube, and turns on depth testing and
    /// back-face culling for the rest of the session.
    pub fn on_surface_created(&mut self, sources: &ShaderSources) -> Result<(), RenderError> {
        if !matches!(self.stage, Stage::Uninitialized) {
            return Err(self.invalid("on_surface_created"));
        }

        self.transforms.init_view(EYE, LOOK_AT, UP);

        let scene = match Scene::build(&self.gl, sources) {
            Ok(scene) => scene,
            Err(e) => {
                log::error!("Failed to create surface resources: {e}");
                self.stage = Stage::Failed;
                return Err(e);
            }
        };

        self.gl.enable(glow::CULL_FACE);
        self.gl.cull_face(glow::BACK);
        self.gl.front_face(glow::CCW);
        self.gl.enable(glow::DEPTH_TEST);
        self.gl.check_error("glEnable");

        log::debug!("Renderer ready");
        self.stage = Stage::Ready(scene);
        Ok(())
    }

    /// Covers the whole surface with the viewport and refits the projection to it.
    ///
    /// A surface without area is rejected with [`RenderError::DegenerateSurface`] and changes
    /// nothing; the next non-empty resize recovers.
    pub fn on_surface_resized(&mut self, width: i32, height: i32) -> Result<(), RenderError> {
        if !matches!(self.stage, Stage::Ready(_) | Stage::SizeKnown(_)) {
            return Err(self.invalid("on_surface_resized"));
        }

        if let Err(e) = self.transforms.set_projection(width, height) {
            log::warn!("Skipping resize: {e}");
            return Err(e);
        }
        self.gl.viewport(0, 0, width, height);
        self.gl.check_error("glViewport");
        log::info!("Surface resized to {width}x{height}");

        self.stage = match std::mem::replace(&mut self.stage, Stage::Uninitialized) {
            Stage::Ready(scene) | Stage::SizeKnown(scene) => Stage::SizeKnown(scene),
            other => other,
        };
        Ok(())
    }

    /// Draws a frame for the current wall-clock time.
    pub fn on_frame(&mut self) -> Result<(), RenderError> {
        let elapsed = self.started.elapsed().as_millis();
        self.on_frame_at(u64::try_from(elapsed).unwrap_or(u64::MAX))
    }

    /// Draws the frame for `elapsed_millis` after the renderer was created.
    pub fn on_frame_at(&mut self, elapsed_millis: u64) -> Result<(), RenderError> {
        let Stage::SizeKnown(scene) = &self.stage else {
            return Err(self.invalid("on_frame"));
        };

        self.transforms.update_model(rotation_angle(elapsed_millis));
        let mvp = self.transforms.compose();

        self.gl.clear_color(0.0, 0.0, 0.0, 0.0);
        self.gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        self.gl.check_error("glClear");

        draw(
            self.gl.as_ref(),
            &scene.program,
            &scene.geometry,
            &scene.bindings,
            &mvp,
        );
        Ok(())
    }
}
