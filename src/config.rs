//! Runtime configuration.
//!
//! Resolution order: optional `config.toml`, then environment, then CLI
//! flags (the env/flag layer is handled by clap and applied through
//! [`crate::args::CommonArgs::apply_overrides`]).  The resolved `Config` is
//! threaded explicitly into the provisioner and validator so tests can
//! substitute fake credentials and URLs without touching the environment.

use crate::error::SetupError;
use crate::platform::DEFAULT_PLATFORM_URL;
use crate::record::DEFAULT_RECORD_PATH;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Stand-in webhook URL used when no deployment URL is configured.
///
/// Provisioning proceeds with a warning rather than failing, matching the
/// original operator workflow of provisioning first and pointing the tool
/// at the real deployment afterwards.
pub const PLACEHOLDER_WEBHOOK_URL: &str = "https://your-vercel-app.vercel.app";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Platform API key. Required for provisioning and the remote-record
    /// validation checks.
    pub api_key: Option<String>,
    /// Base URL of the showtimes webhook deployment.
    pub webhook_base_url: Option<String>,
    /// Platform API root (overridable for testing against a local mock).
    pub platform_base_url: String,
    /// Where the provision record is persisted.
    pub record_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            webhook_base_url: None,
            platform_base_url: DEFAULT_PLATFORM_URL.to_string(),
            record_path: PathBuf::from(DEFAULT_RECORD_PATH),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, falling back to defaults when
    /// the file does not exist.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let Some(config_path) = path else {
            return Ok(Config::default());
        };
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// The platform API key, or [`SetupError::MissingCredential`].
    pub fn require_api_key(&self) -> Result<&str, SetupError> {
        self.api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(SetupError::MissingCredential("ELEVENLABS_API_KEY"))
    }

    /// The webhook base URL, substituting the placeholder when unset.
    ///
    /// Returns `(url, is_placeholder)`; callers surface a warning when the
    /// placeholder is in play but carry on.
    pub fn webhook_base_url(&self) -> (String, bool) {
        match self.webhook_base_url.as_deref().filter(|u| !u.is_empty()) {
            Some(url) => (url.to_string(), url == PLACEHOLDER_WEBHOOK_URL),
            None => (PLACEHOLDER_WEBHOOK_URL.to_string(), true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_api_key_is_missing_credential() {
        let config = Config::default();
        match config.require_api_key() {
            Err(SetupError::MissingCredential(name)) => assert_eq!(name, "ELEVENLABS_API_KEY"),
            other => panic!("expected MissingCredential, got {other:?}"),
        }

        let config = Config {
            api_key: Some("sk-test".into()),
            ..Config::default()
        };
        assert_eq!(config.require_api_key().unwrap(), "sk-test");
    }

    #[test]
    fn webhook_url_falls_back_to_placeholder() {
        let config = Config::default();
        let (url, placeholder) = config.webhook_base_url();
        assert_eq!(url, PLACEHOLDER_WEBHOOK_URL);
        assert!(placeholder);

        let config = Config {
            webhook_base_url: Some("https://real.vercel.app".into()),
            ..Config::default()
        };
        let (url, placeholder) = config.webhook_base_url();
        assert_eq!(url, "https://real.vercel.app");
        assert!(!placeholder);
    }

    #[test]
    fn load_without_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(dir.path().join("config.toml"))).unwrap();
        assert_eq!(config.platform_base_url, DEFAULT_PLATFORM_URL);
        assert_eq!(config.record_path, PathBuf::from(DEFAULT_RECORD_PATH));
    }

    #[test]
    fn load_reads_partial_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "webhook_base_url = \"https://deployed.vercel.app\"\n").unwrap();
        let config = Config::load(Some(path)).unwrap();
        assert_eq!(config.webhook_base_url.as_deref(), Some("https://deployed.vercel.app"));
        // Unspecified fields keep their defaults.
        assert_eq!(config.platform_base_url, DEFAULT_PLATFORM_URL);
    }
}
