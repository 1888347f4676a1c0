//! Application configuration
//!
//! Stored as RON in the platform config directory. A missing or unreadable
//! file falls back to defaults so a bad config never blocks startup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use studio_renderer::RendererConfig;

/// Config file name inside the application config directory
const CONFIG_FILE_NAME: &str = "config.ron";

/// Application config directory name
const APP_DIR_NAME: &str = "design-studio";

/// Configuration errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Deserialization error: {0}")]
    Deserialize(String),
}

/// Remote collaborator endpoints; unset endpoints disable the feature
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Text-to-shape generation endpoint
    pub shape_url: Option<String>,
    /// Mesh remediation endpoint
    pub remediation_url: Option<String>,
    /// Receives every applied modification
    pub modifications_url: Option<String>,
}

/// Top-level application configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Viewport, camera, grid, lighting and auto-fit settings
    pub renderer: RendererConfig,
    /// Backend endpoints
    pub services: ServiceConfig,
}

impl StudioConfig {
    /// Parse RON text
    pub fn from_ron(content: &str) -> Result<Self, ConfigError> {
        ron::from_str(content).map_err(|e| ConfigError::Deserialize(e.to_string()))
    }

    /// Serialize to pretty RON
    pub fn to_ron(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Load from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_ron(&content)
    }

    /// Write to a file, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }
        std::fs::write(path, self.to_ron()?).map_err(|e| ConfigError::Io(e.to_string()))
    }
}

/// Loads and persists [`StudioConfig`]
#[derive(Debug)]
pub struct ConfigManager {
    path: Option<PathBuf>,
    config: StudioConfig,
}

/// Shared config handle
pub type SharedConfig = Arc<Mutex<ConfigManager>>;

impl ConfigManager {
    /// Load from the platform config directory, using defaults on any error
    pub fn load_default() -> Self {
        Self::load_or_default(default_config_path())
    }

    /// Load from `path`, using defaults on any error
    pub fn load_or_default(path: Option<PathBuf>) -> Self {
        let config = match &path {
            Some(p) if p.exists() => match StudioConfig::load(p) {
                Ok(config) => {
                    tracing::info!("Loaded config from {:?}", p);
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to load config from {:?}: {}; using defaults", p, e);
                    StudioConfig::default()
                }
            },
            _ => StudioConfig::default(),
        };
        Self { path, config }
    }

    /// Current configuration
    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    /// Mutable configuration; call [`ConfigManager::save`] to persist
    pub fn config_mut(&mut self) -> &mut StudioConfig {
        &mut self.config
    }

    /// Backing file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Persist to the backing file; a no-op without one
    pub fn save(&self) -> Result<(), ConfigError> {
        match &self.path {
            Some(path) => {
                self.config.save(path)?;
                tracing::debug!("Saved config to {:?}", path);
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Wrap in a shared handle
    pub fn into_shared(self) -> SharedConfig {
        Arc::new(Mutex::new(self))
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

#[cfg(target_arch = "wasm32")]
fn default_config_path() -> Option<PathBuf> {
    let _ = (APP_DIR_NAME, CONFIG_FILE_NAME);
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config =
            StudioConfig::from_ron(r#"(services: (shape_url: Some("http://localhost:8000/shape")))"#)
                .unwrap();
        assert_eq!(
            config.services.shape_url.as_deref(),
            Some("http://localhost:8000/shape")
        );
        assert_eq!(config.renderer, RendererConfig::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);
        let mut manager = ConfigManager::load_or_default(Some(path.clone()));
        manager.config_mut().renderer.grid.spacing = 0.5;
        manager.save().unwrap();

        let reloaded = ConfigManager::load_or_default(Some(path));
        assert_eq!(reloaded.config().renderer.grid.spacing, 0.5);
    }

    #[test]
    fn test_corrupt_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "not ron at all {").unwrap();
        let manager = ConfigManager::load_or_default(Some(path));
        assert_eq!(manager.config(), &StudioConfig::default());
    }
}
