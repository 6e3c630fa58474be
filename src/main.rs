use std::{path::PathBuf, rc::Rc, time::Duration};

use sdl2::{
    event::{Event, WindowEvent},
    keyboard::Keycode,
};
use spincube::{
    RenderError, Renderer, RendererState,
    abs::{App, Gpu},
    config::Config,
    logging,
};

fn main() {
    if let Err(e) = run() {
        log::error!("{e}");
        eprintln!("spincube: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = Config::locate(config_path.as_deref())?;
    logging::init(config.log_level()?).map_err(|e| e.to_string())?;

    let sources = config.shader_sources()?;
    let mut app = App::new(&config.window)?;

    let mut renderer = Renderer::new(Rc::clone(&app.gl));
    renderer
        .on_surface_created(&sources)
        .map_err(|e| e.to_string())?;
    let (width, height) = app.drawable_size();
    resize(&mut renderer, width, height);

    'running: loop {
        let events: Vec<Event> = app.event_pump.poll_iter().collect();
        for event in events {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => break 'running,
                Event::Window {
                    win_event: WindowEvent::SizeChanged(..),
                    ..
                } => {
                    let (width, height) = app.drawable_size();
                    resize(&mut renderer, width, height);
                }
                _ => {}
            }
        }

        // The window may have opened with an empty surface; wait for a usable size.
        if renderer.state() != RendererState::SizeKnown {
            std::thread::sleep(Duration::from_millis(16));
            continue;
        }
        renderer.on_frame().map_err(|e| e.to_string())?;
        app.swap();
    }

    log::info!("Shutting down");
    Ok(())
}

fn resize<G: Gpu>(renderer: &mut Renderer<G>, width: i32, height: i32) {
    match renderer.on_surface_resized(width, height) {
        Ok(()) | Err(RenderError::DegenerateSurface { .. }) => {}
        Err(e) => log::warn!("{e}"),
    }
}
