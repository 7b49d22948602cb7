use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::access::EmailMatching;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
    pub providers: ProvidersConfig,
    pub access: AccessConfig,
    pub templates: TemplatesConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

/// Base URLs for the live provider families. Overridable so tests and
/// self-hosted gateways can point the dispatcher elsewhere.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ProvidersConfig {
    pub openai_base_url: String,
    pub google_base_url: String,
    pub meta_base_url: String,
    /// `None` keeps the HTTP client's own default.
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AccessConfig {
    pub email_matching: EmailMatching,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TemplatesConfig {
    /// Static template document loaded when no imported templates are stored.
    pub resource_path: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_forge_dir()
            .join("forge.db")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            openai_base_url: "https://api.openai.com/v1".into(),
            google_base_url: "https://generativelanguage.googleapis.com/v1beta".into(),
            meta_base_url: "https://api.llama.com/compat/v1".into(),
            request_timeout_secs: None,
        }
    }
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        let resource_path = default_forge_dir()
            .join("templates.json")
            .to_string_lossy()
            .into_owned();
        Self { resource_path }
    }
}

/// Returns `~/.aiforge/`
pub fn default_forge_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".aiforge")
}

/// Returns the default config file path: `~/.aiforge/config.toml`
pub fn default_config_path() -> PathBuf {
    default_forge_dir().join("config.toml")
}

impl AppConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            AppConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (AIFORGE_DB, AIFORGE_LOG_LEVEL,
    /// AIFORGE_EMAIL_MATCHING).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("AIFORGE_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("AIFORGE_LOG_LEVEL") {
            self.logging.log_level = val;
        }
        if let Ok(val) = std::env::var("AIFORGE_EMAIL_MATCHING") {
            match val.parse() {
                Ok(matching) => self.access.email_matching = matching,
                Err(e) => tracing::warn!(value = %val, "ignoring AIFORGE_EMAIL_MATCHING: {e}"),
            }
        }
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }

    pub fn resolved_templates_path(&self) -> PathBuf {
        expand_tilde(&self.templates.resource_path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.logging.log_level, "info");
        assert_eq!(config.access.email_matching, EmailMatching::Exact);
        assert_eq!(config.providers.openai_base_url, "https://api.openai.com/v1");
        assert!(config.providers.request_timeout_secs.is_none());
        assert!(config.storage.db_path.ends_with("forge.db"));
        assert!(config.templates.resource_path.ends_with("templates.json"));
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[logging]
log_level = "debug"

[storage]
db_path = "/tmp/test.db"

[providers]
openai_base_url = "http://localhost:9000/v1"
request_timeout_secs = 30

[access]
email_matching = "normalized"
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.logging.log_level, "debug");
        assert_eq!(config.storage.db_path, "/tmp/test.db");
        assert_eq!(config.providers.openai_base_url, "http://localhost:9000/v1");
        assert_eq!(config.providers.request_timeout_secs, Some(30));
        assert_eq!(config.access.email_matching, EmailMatching::Normalized);
        // defaults still apply for unset fields
        assert_eq!(
            config.providers.meta_base_url,
            "https://api.llama.com/compat/v1"
        );
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = AppConfig::default();
        std::env::set_var("AIFORGE_DB", "/tmp/override.db");
        std::env::set_var("AIFORGE_LOG_LEVEL", "trace");
        std::env::set_var("AIFORGE_EMAIL_MATCHING", "normalized");

        config.apply_env_overrides();

        assert_eq!(config.storage.db_path, "/tmp/override.db");
        assert_eq!(config.logging.log_level, "trace");
        assert_eq!(config.access.email_matching, EmailMatching::Normalized);

        // Clean up
        std::env::remove_var("AIFORGE_DB");
        std::env::remove_var("AIFORGE_LOG_LEVEL");
        std::env::remove_var("AIFORGE_EMAIL_MATCHING");
    }

    #[test]
    fn expand_tilde_leaves_absolute_paths() {
        assert_eq!(expand_tilde("/var/forge.db"), PathBuf::from("/var/forge.db"));
    }
}
