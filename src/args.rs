use crate::config::Config;
use clap::{ArgAction, Args};
use std::path::PathBuf;

// Global flags shared across every subcommand.
//
// Environment fallbacks keep parity with the original operator workflow:
//   ELEVENLABS_API_KEY   platform credential
//   VERCEL_APP_URL       webhook deployment base URL
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Path to a config.toml file
    #[arg(
        short = 'c',
        long,
        value_name = "PATH",
        env = "MARQUEE_CONFIG",
        global = true
    )]
    pub config: Option<PathBuf>,

    /// Platform API key
    #[arg(
        long,
        value_name = "KEY",
        env = "ELEVENLABS_API_KEY",
        hide_env_values = true,
        global = true
    )]
    pub api_key: Option<String>,

    /// Webhook deployment base URL
    #[arg(long, value_name = "URL", env = "VERCEL_APP_URL", global = true)]
    pub webhook_url: Option<String>,

    /// Platform API root (override for testing)
    #[arg(long, value_name = "URL", env = "ELEVENLABS_API_URL", global = true)]
    pub platform_url: Option<String>,

    /// Provision record path (default: agent_config.json)
    #[arg(long, value_name = "PATH", env = "MARQUEE_RECORD", global = true)]
    pub record: Option<PathBuf>,

    /// Disable coloured terminal output
    #[arg(long = "no-color", action = ArgAction::SetTrue, env = "NO_COLOR", global = true)]
    pub no_color: bool,
}

impl CommonArgs {
    pub fn config_path(&self) -> Option<PathBuf> {
        self.config.clone()
    }

    /// Layer flag/env values over what the config file provided.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(api_key) = &self.api_key {
            config.api_key = Some(api_key.clone());
        }
        if let Some(webhook_url) = &self.webhook_url {
            config.webhook_base_url = Some(webhook_url.clone());
        }
        if let Some(platform_url) = &self.platform_url {
            config.platform_base_url = platform_url.clone();
        }
        if let Some(record) = &self.record {
            config.record_path = record.clone();
        }
    }
}
