//! Configuration loaded from `aibooth.toml`.
//!
//! [`BoothConfig`] holds every configurable parameter. Values missing
//! from the file fall back to defaults. The `VIDU_API_KEY` environment
//! variable takes precedence over the file for the API key.

use anyhow::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::BoothError;

/// Top-level configuration loaded from `aibooth.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct BoothConfig {
    /// Vidu API key.
    #[serde(default)]
    pub api_key: String,

    /// Base URL of the generation service.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Path to the local renderer executable.
    #[serde(default)]
    pub render_exe: PathBuf,

    /// Path to the render project/template file.
    #[serde(default)]
    pub render_project: PathBuf,

    /// Directory that receives the intermediate and final artifacts.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// External command invoked to deliver the finished video
    /// (called with the recipient and the output path as arguments).
    #[serde(default)]
    pub notify_command: Option<PathBuf>,
}

fn default_api_base_url() -> String {
    "https://api.vidu.ai".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("ai_studio_files")
}

impl Default for BoothConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base_url: default_api_base_url(),
            render_exe: PathBuf::new(),
            render_project: PathBuf::new(),
            output_dir: default_output_dir(),
            notify_command: None,
        }
    }
}

impl BoothConfig {
    /// Load the configuration from `aibooth.toml` in the current
    /// directory. Uses defaults when the file does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("aibooth.toml"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<BoothConfig>(&contents)?
        } else {
            Self::default()
        };

        // Environment variable wins over the file for the API key.
        if let Ok(key) = std::env::var("VIDU_API_KEY")
            && !key.is_empty()
        {
            config.api_key = key;
        }

        Ok(config)
    }

    /// The API key, or a config error when none is set anywhere.
    pub fn require_api_key(&self) -> Result<&str, BoothError> {
        if self.api_key.is_empty() {
            Err(BoothError::Config(
                "API key not set, add api_key to aibooth.toml or export VIDU_API_KEY".to_string(),
            ))
        } else {
            Ok(&self.api_key)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = BoothConfig::default();
        assert!(config.api_key.is_empty());
        assert_eq!(config.api_base_url, "https://api.vidu.ai");
        assert_eq!(config.output_dir, PathBuf::from("ai_studio_files"));
        assert!(config.notify_command.is_none());
    }

    #[test]
    fn deserialize_partial_toml() {
        let toml_str = r#"
            api_key = "vk-test-123"
            render_exe = "/opt/afterfx/AfterFX"
            render_project = "/srv/booth/booth.aep"
        "#;
        let config: BoothConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api_key, "vk-test-123");
        assert_eq!(config.render_exe, PathBuf::from("/opt/afterfx/AfterFX"));
        assert_eq!(config.api_base_url, "https://api.vidu.ai");
        assert_eq!(config.output_dir, PathBuf::from("ai_studio_files"));
    }

    #[test]
    fn load_from_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = BoothConfig::load_from(&dir.path().join("aibooth.toml")).unwrap();
        assert_eq!(config.api_base_url, "https://api.vidu.ai");
    }

    #[test]
    fn load_from_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aibooth.toml");
        std::fs::write(&path, "output_dir = \"/tmp/booth-out\"\n").unwrap();
        let config = BoothConfig::load_from(&path).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("/tmp/booth-out"));
    }

    #[test]
    fn require_api_key_rejects_empty() {
        let config = BoothConfig::default();
        assert!(config.require_api_key().is_err());

        let config = BoothConfig {
            api_key: "vk-1".into(),
            ..Default::default()
        };
        assert_eq!(config.require_api_key().unwrap(), "vk-1");
    }
}
