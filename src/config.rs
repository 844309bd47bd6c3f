use serde::Deserialize;
use spectr::transform::window::WindowFunction;
use std::path::{Path, PathBuf};

const LOCAL_CONFIG: &str = "spectr.toml";

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub spectrogram: SpectrogramConfig,
}

#[derive(Debug, Deserialize)]
pub struct SpectrogramConfig {
    #[serde(default = "default_width")]
    pub width: usize,
    #[serde(default)]
    pub window_size: Option<usize>,
    #[serde(default)]
    pub overlap: usize,
    #[serde(default)]
    pub window: WindowFunction,
    #[serde(default)]
    pub log_scale: bool,
    #[serde(default)]
    pub normalize: bool,
}

impl Default for SpectrogramConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            window_size: None,
            overlap: 0,
            window: WindowFunction::default(),
            log_scale: false,
            normalize: false,
        }
    }
}

fn default_width() -> usize { 800 }

/// The config file to use: `explicit` if given, else `./spectr.toml`, else
/// `spectr/config.toml` under `~/.config` or the platform config directory.
pub fn discover(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let candidates = [
        Some(PathBuf::from(LOCAL_CONFIG)),
        dirs::home_dir().map(|home| home.join(".config").join("spectr").join("config.toml")),
        dirs::config_dir().map(|dir| dir.join("spectr").join("config.toml")),
    ];
    candidates.into_iter().flatten().find(|p| p.exists())
}

pub fn load_config(path: &Path) -> Option<Config> {
    let content = std::fs::read_to_string(path).ok()?;
    parse_config(&content)
}

fn parse_config(content: &str) -> Option<Config> {
    match toml::from_str(content) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            log::warn!("Invalid config: {}", e);
            None
        }
    }
}
