//! SDL2 and OpenGL application management.
//!
//! This module defines the [`App`] struct which owns the window and OpenGL context the renderer
//! draws into. It plays the part of the host: it decides when the surface exists, when its size
//! changes and when a frame is due.

use std::rc::Rc;

use crate::config::WindowConfig;

/// The [`App`] struct encapsulates the SDL2 and OpenGL context.
pub struct App {
    pub sdl: sdl2::Sdl,
    pub video_subsystem: sdl2::VideoSubsystem,
    pub window: sdl2::video::Window,
    pub gl_context: sdl2::video::GLContext,
    pub gl: Rc<glow::Context>,
    pub event_pump: sdl2::EventPump,
}

impl App {
    /// Creates a window with a core-profile OpenGL 3.3 context made current on this thread.
    /// The width and height options are ignored if `fullscreen` is set.
    pub fn new(config: &WindowConfig) -> Result<Self, String> {
        let sdl = sdl2::init()?;
        let video_subsystem = sdl.video()?;
        let gl_attr = video_subsystem.gl_attr();
        gl_attr.set_context_profile(sdl2::video::GLProfile::Core);
        gl_attr.set_context_version(3, 3);
        gl_attr.set_depth_size(24);

        let mut window = video_subsystem
            .window(&config.title, config.width, config.height)
            .opengl()
            .resizable()
            .build()
            .map_err(|e| e.to_string())?;
        window.set_fullscreen(if config.fullscreen {
            sdl2::video::FullscreenType::Desktop
        } else {
            sdl2::video::FullscreenType::Off
        })?;

        let gl_context = window.gl_create_context()?;
        window.gl_make_current(&gl_context)?;
        video_subsystem.gl_set_swap_interval(if config.vsync {
            sdl2::video::SwapInterval::VSync
        } else {
            sdl2::video::SwapInterval::Immediate
        })?;

        let gl = unsafe {
            glow::Context::from_loader_function(|s| {
                video_subsystem.gl_get_proc_address(s) as *const _
            })
        };
        let event_pump = sdl.event_pump()?;

        log::info!(
            "Created {}x{} window with an OpenGL 3.3 core context",
            config.width,
            config.height
        );

        Ok(Self {
            sdl,
            video_subsystem,
            window,
            gl_context,
            gl: Rc::new(gl),
            event_pump,
        })
    }

    /// The size of the drawable area in pixels, which may differ from the window size on
    /// high-DPI displays.
    pub fn drawable_size(&self) -> (i32, i32) {
        let (width, height) = self.window.drawable_size();
        (
            i32::try_from(width).unwrap_or(i32::MAX),
            i32::try_from(height).unwrap_or(i32::MAX),
        )
    }

    /// Presents the frame that was just drawn.
    pub fn swap(&self) {
        self.window.gl_swap_window();
    }
}
