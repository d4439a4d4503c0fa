/// Application configuration
///
/// Settings are read from `config.json` in the user's config directory:
/// - Linux: ~/.config/photo-restorer/config.json
/// - macOS: ~/Library/Application Support/photo-restorer/config.json
/// - Windows: %APPDATA%\photo-restorer\config.json
///
/// `GEMINI_API_KEY` (or `API_KEY`) in the environment overrides the file's key.
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::ConfigError;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_PROMPT: &str = "Restore and enhance this photograph. Remove scratches, dust, \
cracks and noise, fix faded or damaged areas, correct the colors, and sharpen the details so it \
looks like a high-definition DSLR photo. Keep the composition, the people and their faces \
exactly as they are. Return only the restored image.";

const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Key for the restoration service; None until configured
    pub api_key: Option<String>,
    pub model: String,
    /// Endpoint prefix, `{base_url}/{model}:generateContent`
    pub base_url: String,
    /// Instruction sent alongside the photo
    pub prompt: String,
    /// Request timeout. None waits on the network stack's own timeout.
    pub request_timeout_secs: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            prompt: DEFAULT_PROMPT.to_string(),
            request_timeout_secs: None,
        }
    }
}

impl AppConfig {
    /// Load from the default location plus environment overrides
    ///
    /// A missing or malformed file falls back to defaults.
    pub fn load() -> Self {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => match Self::from_file(&path) {
                Ok(config) => {
                    info!("⚙️  Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("Ignoring {}: {}", path.display(), e);
                    Self::default()
                }
            },
            _ => Self::default(),
        };

        config.apply_env(|name| std::env::var(name).ok());
        config
    }

    /// Get the path where the config file is looked up
    pub fn config_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir()?;
        path.push("photo-restorer");
        path.push("config.json");
        Some(path)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Override the API key from the first non-empty variable found
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = API_KEY_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .find(|value| !value.trim().is_empty())
        {
            self.api_key = Some(key);
        }
    }

    /// The API key, if one is set and non-blank
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.api_key().is_none());
        assert!(config.request_timeout_secs.is_none());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = AppConfig::from_json(r#"{ "api_key": "abc", "request_timeout_secs": 90 }"#)
            .unwrap();
        assert_eq!(config.api_key(), Some("abc"));
        assert_eq!(config.request_timeout_secs, Some(90));
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.prompt, DEFAULT_PROMPT);
    }

    #[test]
    fn test_malformed_json_errors() {
        assert!(matches!(
            AppConfig::from_json("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "model": "custom-model" }"#).unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.model, "custom-model");

        let missing = AppConfig::from_file(&dir.path().join("nope.json"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_env_overrides_key() {
        let env: HashMap<&str, &str> = [("API_KEY", "from-env")].into();
        let mut config = AppConfig {
            api_key: Some("from-file".to_string()),
            ..Default::default()
        };
        config.apply_env(|name| env.get(name).map(|v| v.to_string()));
        assert_eq!(config.api_key(), Some("from-env"));
    }

    #[test]
    fn test_gemini_var_takes_precedence() {
        let env: HashMap<&str, &str> = [("GEMINI_API_KEY", "gemini"), ("API_KEY", "generic")].into();
        let mut config = AppConfig::default();
        config.apply_env(|name| env.get(name).map(|v| v.to_string()));
        assert_eq!(config.api_key(), Some("gemini"));
    }

    #[test]
    fn test_blank_key_is_none() {
        let config = AppConfig {
            api_key: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(config.api_key().is_none());

        let mut config = AppConfig::default();
        config.apply_env(|_| Some(String::new()));
        assert!(config.api_key().is_none());
    }
}
