use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub input: InputConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub map: MapConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    pub markers_file: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Base URL of the persistence server; updates go to
    /// `<endpoint>/update_point`.
    pub endpoint: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MapConfig {
    #[serde(default = "default_zoom")]
    pub initial_zoom: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            initial_zoom: default_zoom(),
        }
    }
}

fn default_zoom() -> f64 {
    10.0
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("failed to parse config file {:?}", path))
    }
}
