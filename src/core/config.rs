use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_SYNC_URL: &str = "http://localhost:8000";

pub const ENV_STORE_URL: &str = "FINSYS_STORE_URL";
pub const ENV_STORE_KEY: &str = "FINSYS_STORE_KEY";
pub const ENV_SYNC_URL: &str = "FINSYS_SYNC_URL";

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct StoreConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub anon_key: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SyncConfig {
    pub base_url: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            base_url: DEFAULT_SYNC_URL.to_string(),
        }
    }
}

fn default_currency() -> String {
    "USD".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default = "default_currency")]
    pub default_currency: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            store: StoreConfig::default(),
            sync: SyncConfig::default(),
            default_currency: default_currency(),
        }
    }
}

impl AppConfig {
    /// Loads the default config file, or falls back to environment-only
    /// settings when no file exists.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if config_path.exists() {
            return Self::load_from_path(&config_path);
        }

        debug!("No config file at {}, using environment", config_path.display());
        Ok(Self::default().with_overrides(|key| std::env::var(key).ok()))
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "finsys", "finsys")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        let config = config.with_overrides(|key| std::env::var(key).ok());
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Applies `FINSYS_*` overrides read through `lookup`.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(ENV_STORE_URL).filter(|v| !v.is_empty()) {
            self.store.url = url;
        }
        if let Some(key) = lookup(ENV_STORE_KEY).filter(|v| !v.is_empty()) {
            self.store.anon_key = key;
        }
        if let Some(url) = lookup(ENV_SYNC_URL).filter(|v| !v.is_empty()) {
            self.sync.base_url = url;
        }
        self
    }

    /// Checks the store settings needed by every table-backed command.
    pub fn validate(&self) -> Result<()> {
        if self.store.url.is_empty() {
            bail!("Missing store URL: set store.url in the config file or {ENV_STORE_URL}");
        }
        if self.store.anon_key.is_empty() {
            bail!("Missing store key: set store.anon_key in the config file or {ENV_STORE_KEY}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
store:
  url: "https://abc.supabase.co"
  anon_key: "public-anon"
sync:
  base_url: "http://crawler:9000"
default_currency: "JPY"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.store.url, "https://abc.supabase.co");
        assert_eq!(config.store.anon_key, "public-anon");
        assert_eq!(config.sync.base_url, "http://crawler:9000");
        assert_eq!(config.default_currency, "JPY");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_defaults() {
        let yaml_str = r#"
store:
  url: "https://abc.supabase.co"
  anon_key: "public-anon"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).unwrap();
        assert_eq!(config.sync.base_url, DEFAULT_SYNC_URL);
        assert_eq!(config.default_currency, "USD");
    }

    #[test]
    fn test_environment_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_STORE_URL, "https://env.supabase.co"),
            (ENV_STORE_KEY, "env-key"),
            (ENV_SYNC_URL, ""),
        ]);

        let config = AppConfig::default().with_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.store.url, "https://env.supabase.co");
        assert_eq!(config.store.anon_key, "env-key");
        // Empty values leave the setting alone.
        assert_eq!(config.sync.base_url, DEFAULT_SYNC_URL);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_store_settings_fail_validation() {
        let err = AppConfig::default().validate().unwrap_err();
        assert!(err.to_string().contains(ENV_STORE_URL));

        let mut config = AppConfig::default();
        config.store.url = "https://abc.supabase.co".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains(ENV_STORE_KEY));
    }
}
