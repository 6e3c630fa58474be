//! Runtime configuration.
//!
//! Settings are read from a JSON file. Every field is optional; anything left out takes its
//! default value.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::abs::ShaderSources;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Spinning Cube".to_string(),
            width: 800,
            height: 600,
            fullscreen: false,
            vsync: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    /// Any [`log::LevelFilter`] name, case-insensitive.
    pub log_level: String,
    /// Directory holding `vertex_shader.glsl` and `fragment_shader.glsl`. The built-in shaders
    /// are used when unset.
    pub shader_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            log_level: "info".to_string(),
            shader_dir: None,
        }
    }
}

impl Config {
    pub const APP_DIR: &'static str = "spincube";
    pub const FILE_NAME: &'static str = "config.json";

    /// `<config dir>/spincube/config.json`, if the platform has a config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(Self::APP_DIR).join(Self::FILE_NAME))
    }

    pub fn parse(s: &str) -> Result<Self, String> {
        let config: Config = serde_json::from_str(s).map_err(|e| e.to_string())?;
        config.log_level()?;
        Ok(config)
    }

    /// Reads the config at `path`, or the defaults if there is no file there.
    pub fn load(path: &Path) -> Result<Self, String> {
        match std::fs::read_to_string(path) {
            Ok(s) => Self::parse(&s).map_err(|e| format!("Invalid config {}: {e}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(format!("Failed to read config {}: {e}", path.display())),
        }
    }

    /// Loads `explicit` if given, which then has to exist, otherwise the file at
    /// [`Config::default_path`].
    pub fn locate(explicit: Option<&Path>) -> Result<Self, String> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(format!("Config file {} does not exist", path.display()));
            }
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn log_level(&self) -> Result<log::LevelFilter, String> {
        self.log_level
            .parse()
            .map_err(|_| format!("Unknown log level `{}`", self.log_level))
    }

    /// The shader sources this config asks for.
    pub fn shader_sources(&self) -> Result<ShaderSources, String> {
        match &self.shader_dir {
            Some(dir) => ShaderSources::from_dir(dir),
            None => Ok(ShaderSources::builtin()),
        }
    }
}
