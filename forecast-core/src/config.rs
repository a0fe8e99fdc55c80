use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::client::ClientConfig;

/// Top-level configuration stored on disk.
///
/// The city, endpoints and the 09:00 slot are deployment constants; the API
/// key is the one knob an operator may want to rotate without a rebuild.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// OpenWeatherMap API key; when absent the built-in deployment key is used.
    pub api_key: Option<String>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "forecast-task", "forecast-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Overlay stored settings onto the in-process client config.
    pub fn apply(&self, mut client: ClientConfig) -> ClientConfig {
        if let Some(key) = &self.api_key {
            client.api_key = key.clone();
        }

        client
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::DEFAULT_API_KEY;

    #[test]
    fn empty_config_keeps_builtin_key() {
        let cfg = Config::default();
        let client = cfg.apply(ClientConfig::default());

        assert_eq!(client.api_key, DEFAULT_API_KEY);
    }

    #[test]
    fn stored_key_overrides_builtin_key() {
        let cfg = Config { api_key: Some("ROTATED".to_string()) };
        let client = cfg.apply(ClientConfig::default());

        assert_eq!(client.api_key, "ROTATED");
    }

    #[test]
    fn config_roundtrips_through_toml() {
        let cfg = Config { api_key: Some("KEY".to_string()) };

        let text = toml::to_string_pretty(&cfg).expect("serializes");
        let parsed: Config = toml::from_str(&text).expect("parses");

        assert_eq!(parsed.api_key.as_deref(), Some("KEY"));
    }
}
