//! Engine configuration.
//!
//! Loaded from TOML. Every section falls back to its defaults, so an empty
//! file (or no file at all) yields a usable configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::render::{ClearColor, RendererBackend};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub window: WindowConfig,
    pub renderer: RendererConfig,
    pub audio: AudioConfig,
    pub logging: LoggingConfig,

    /// Overrides the directory `play_bgm` and friends resolve names against.
    /// Defaults to the executable's directory.
    pub resource_dir: Option<PathBuf>,
}

impl EngineConfig {
    pub fn from_toml_str(src: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(src)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let src = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&src)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub resizable: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Nyanchu Engine".to_string(),
            width: 800,
            height: 600,
            resizable: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerPreference {
    Low,
    High,
}

impl From<PowerPreference> for wgpu::PowerPreference {
    fn from(p: PowerPreference) -> Self {
        match p {
            PowerPreference::Low => wgpu::PowerPreference::LowPower,
            PowerPreference::High => wgpu::PowerPreference::HighPerformance,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub backend: RendererBackend,
    pub vsync: bool,
    pub clear_color: ClearColor,
    pub power_preference: PowerPreference,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            backend: RendererBackend::Wgpu,
            vsync: true,
            clear_color: ClearColor::default(),
            power_preference: PowerPreference::High,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub enabled: bool,
    pub volume: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: 1.0,
        }
    }
}

/// Logger configuration.
///
/// `filter` follows the `env_logger` filter syntax (e.g. "info",
/// "nyanchu=debug,wgpu=warn"). When unset, `RUST_LOG` is consulted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let cfg = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, EngineConfig::default());
        assert_eq!(cfg.window.width, 800);
        assert_eq!(cfg.window.height, 600);
        assert_eq!(cfg.window.title, "Nyanchu Engine");
        assert_eq!(cfg.renderer.clear_color, ClearColor(0x3030_30ff));
        assert!(cfg.renderer.vsync);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let cfg = EngineConfig::from_toml_str(
            r#"
            resource_dir = "assets"

            [window]
            width = 1280

            [renderer]
            backend = "headless"
            clear_color = 0xff0000ff

            [audio]
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(cfg.window.width, 1280);
        assert_eq!(cfg.window.height, 600);
        assert_eq!(cfg.renderer.backend, RendererBackend::Headless);
        assert_eq!(cfg.renderer.clear_color, ClearColor(0xff00_00ff));
        assert!(!cfg.audio.enabled);
        assert_eq!(cfg.audio.volume, 1.0);
        assert_eq!(cfg.resource_dir, Some(PathBuf::from("assets")));
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let err = EngineConfig::from_toml_str("[renderer]\nbackend = \"bgfx\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reports_missing_file_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        match EngineConfig::load(&path) {
            Err(ConfigError::Io { path: p, .. }) => assert_eq!(p, path),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn load_reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nyanchu.toml");
        std::fs::write(&path, "[window]\ntitle = \"demo\"\n").unwrap();

        let cfg = EngineConfig::load(&path).unwrap();
        assert_eq!(cfg.window.title, "demo");
    }
}
