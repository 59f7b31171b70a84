//! Builder configuration

use lorastack_api::RegistryConfig;
use lorastack_lora::FolderConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Stack builder configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Registry lookups
    pub registry: RegistryConfig,
    /// Where LoRA files are searched
    pub folders: FolderConfig,
}

impl BuilderConfig {
    /// Load from a JSON file; missing fields take their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Configuration that never touches the network
    pub fn offline() -> Self {
        Self {
            registry: RegistryConfig::offline(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_partial_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lorastack.json");
        std::fs::write(
            &path,
            r#"{"registry": {"timeout_secs": 3}, "folders": {"lora_dirs": ["/srv/loras"], "use_env": false}}"#,
        )
        .unwrap();

        let config = BuilderConfig::load(&path).unwrap();
        assert_eq!(config.registry.timeout_secs, 3);
        assert!(config.registry.enabled);
        assert_eq!(config.folders.lora_dirs.len(), 1);
        assert!(!config.folders.use_env);
    }

    #[test]
    fn test_load_errors() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            BuilderConfig::load(dir.path().join("missing.json")),
            Err(ConfigError::Io(_))
        ));

        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{").unwrap();
        assert!(matches!(BuilderConfig::load(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_offline() {
        assert!(!BuilderConfig::offline().registry.enabled);
    }
}
