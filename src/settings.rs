use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Defaults read from `<config_dir>/k20/config.toml`; command-line flags win.
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub meter: MeterSettings,
}

#[derive(Debug, Default, Deserialize)]
pub struct MeterSettings {
    pub name: Option<String>,
    pub refresh_rate: Option<f32>,
    pub color: Option<bool>,
    pub bold: Option<bool>,
    pub verbose: Option<bool>,
}

impl Settings {
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Missing or malformed files fall back to defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("k20")
            .join("config.toml")
    }
}
