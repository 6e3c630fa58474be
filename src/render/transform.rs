//! Model, view and projection matrices and the animation clock that drives them.
//!
//! All matrices are column-major [`Mat4`]s, uploaded to the shader without transposing.

use glam::{Mat4, Vec3};

use crate::error::RenderError;

/// Camera position, just behind the origin.
pub const EYE: Vec3 = Vec3::new(0.0, 0.0, -0.5);
/// Where the camera looks.
pub const LOOK_AT: Vec3 = Vec3::new(0.0, 0.0, -5.0);
pub const UP: Vec3 = Vec3::Y;

pub const NEAR: f32 = 1.0;
pub const FAR: f32 = 10.0;

/// Pushes the cube away from the eye, between the near and far planes.
pub const MODEL_TRANSLATION: Vec3 = Vec3::new(0.0, 0.0, -8.0);
/// Tilted axis the cube tumbles around. Normalized at use.
pub const ROTATION_AXIS: Vec3 = Vec3::new(1.0, 0.1, 0.1);
/// One full turn takes this many milliseconds.
pub const ROTATION_PERIOD_MS: u64 = 10_000;

/// Rotation angle in degrees after `elapsed_millis`, always in `[0, 360)`.
///
/// The angle wraps back to zero every [`ROTATION_PERIOD_MS`], which lines up with a full turn
/// so the wrap is not visible.
pub fn rotation_angle(elapsed_millis: u64) -> f32 {
    let phase = elapsed_millis % ROTATION_PERIOD_MS;
    phase as f32 / ROTATION_PERIOD_MS as f32 * 360.0
}

/// A perspective projection for the view volume bounded by the given clip planes, in OpenGL
/// clip space (`z` in `[-1, 1]`).
pub fn frustum(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
    let width = right - left;
    let height = top - bottom;
    let depth = far - near;
    Mat4::from_cols_array(&[
        2.0 * near / width,
        0.0,
        0.0,
        0.0,
        0.0,
        2.0 * near / height,
        0.0,
        0.0,
        (right + left) / width,
        (top + bottom) / height,
        -(far + near) / depth,
        -1.0,
        0.0,
        0.0,
        -2.0 * far * near / depth,
        0.0,
    ])
}

/// The matrices taking the cube from object space to clip space.
///
/// `view` is set once, `projection` on every resize and `model` on every frame. The two
/// derived matrices are only meaningful after [`Transforms::compose`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transforms {
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
    model_view: Mat4,
    model_view_projection: Mat4,
}

impl Default for Transforms {
    fn default() -> Self {
        Self {
            model: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            model_view: Mat4::IDENTITY,
            model_view_projection: Mat4::IDENTITY,
        }
    }
}

impl Transforms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Points a right-handed camera at `look_at` from `eye`.
    pub fn init_view(&mut self, eye: Vec3, look_at: Vec3, up: Vec3) {
        self.view = Mat4::look_at_rh(eye, look_at, up);
    }

    /// Fits the projection to a `width` x `height` surface: one unit of half-height, `aspect`
    /// units of half-width, clipped to [`NEAR`]..[`FAR`].
    ///
    /// A surface without area leaves the current projection untouched.
    pub fn set_projection(&mut self, width: i32, height: i32) -> Result<(), RenderError> {
        if width <= 0 || height <= 0 {
            return Err(RenderError::DegenerateSurface { width, height });
        }
        let aspect = width as f32 / height as f32;
        self.projection = frustum(-aspect, aspect, -1.0, 1.0, NEAR, FAR);
        Ok(())
    }

    /// Rebuilds the model matrix: translate to [`MODEL_TRANSLATION`], then rotate
    /// `angle_degrees` about [`ROTATION_AXIS`] in model space.
    pub fn update_model(&mut self, angle_degrees: f32) {
        self.model = Mat4::from_translation(MODEL_TRANSLATION)
            * Mat4::from_axis_angle(ROTATION_AXIS.normalize(), angle_degrees.to_radians());
    }

    /// Returns `projection * (view * model)`, storing both products.
    pub fn compose(&mut self) -> Mat4 {
        self.model_view = self.view * self.model;
        self.model_view_projection = self.projection * self.model_view;
        self.model_view_projection
    }

    pub fn model_view_projection(&self) -> Mat4 {
        self.model_view_projection
    }
}
