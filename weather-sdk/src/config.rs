use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{cache::CacheConfig, client::ClientBuilder, model::Mode};

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// default_mode = "polling"
/// poll_interval_secs = 120
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// OpenWeather API key.
    pub api_key: Option<String>,

    pub default_mode: Option<Mode>,

    /// Overrides for the client's defaults; absent means "use the default".
    pub cache_capacity: Option<usize>,
    pub cache_ttl_secs: Option<u64>,
    pub poll_interval_secs: Option<u64>,
    pub base_url: Option<String>,
}

impl Config {
    /// Return the API key, or an error telling the user how to set one.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            anyhow!(
                "No API key configured.\n\
                 Hint: run `weather configure` or pass `--api-key <KEY>`."
            )
        })
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    pub fn default_mode(&self) -> Mode {
        self.default_mode.unwrap_or_default()
    }

    pub fn set_default_mode(&mut self, mode: Mode) {
        self.default_mode = Some(mode);
    }

    /// Cache settings with any configured overrides applied.
    pub fn cache_config(&self) -> CacheConfig {
        let mut cache = CacheConfig::default();
        if let Some(capacity) = self.cache_capacity {
            cache = cache.capacity(capacity);
        }
        if let Some(secs) = self.cache_ttl_secs {
            cache = cache.ttl(Duration::from_secs(secs));
        }
        cache
    }

    /// Apply the configured overrides to a client builder.
    pub fn apply(&self, mut builder: ClientBuilder) -> ClientBuilder {
        builder = builder.cache(self.cache_config());
        if let Some(secs) = self.poll_interval_secs {
            builder = builder.poll_interval(Duration::from_secs(secs));
        }
        if let Some(url) = &self.base_url {
            builder = builder.base_url(url.clone());
        }
        builder
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-sdk", "weather-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_api_key_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.require_api_key().unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No API key configured"));
        assert!(msg.contains("Hint: run `weather configure`"));
    }

    #[test]
    fn set_api_key_and_mode() {
        let mut cfg = Config::default();
        assert_eq!(cfg.default_mode(), Mode::OnDemand);

        cfg.set_api_key("OPEN_KEY".into());
        cfg.set_default_mode(Mode::Polling);

        assert_eq!(cfg.require_api_key().unwrap(), "OPEN_KEY");
        assert_eq!(cfg.default_mode(), Mode::Polling);
    }

    #[test]
    fn cache_config_applies_overrides() {
        let cfg = Config {
            cache_capacity: Some(25),
            ..Config::default()
        };

        let cache = cfg.cache_config();
        assert_eq!(cache.capacity, 25);
        assert_eq!(cache.ttl, Duration::from_secs(600));
    }

    #[test]
    fn parses_kebab_case_mode() {
        let cfg: Config = toml::from_str(
            r#"
            api_key = "KEY"
            default_mode = "polling"
            poll_interval_secs = 60
            "#,
        )
        .expect("valid config");

        assert_eq!(cfg.default_mode(), Mode::Polling);
        assert_eq!(cfg.poll_interval_secs, Some(60));
        assert!(cfg.cache_ttl_secs.is_none());
    }

    #[test]
    fn save_then_load_from_tempdir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());
        cfg.set_default_mode(Mode::Polling);
        cfg.cache_ttl_secs = Some(30);
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn load_from_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn load_from_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "api_key = [not toml").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
