//! Persistent CLI configuration.

use std::path::{Path, PathBuf};

use notesync_core::util::normalize_text_option;
use notesync_core::GatewayConfig;
use serde::{Deserialize, Serialize};

use crate::cli::ApiArgs;

const CONFIG_FILE_NAME: &str = "cli-config.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CliConfig {
    #[serde(default = "default_config_version")]
    pub version: u32,
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

const fn default_config_version() -> u32 {
    1
}

pub fn default_config_path() -> Result<PathBuf, String> {
    dirs::config_dir()
        .map(|dir| dir.join("notesync").join(CONFIG_FILE_NAME))
        .ok_or_else(|| "Failed to resolve CLI config directory".to_string())
}

impl CliConfig {
    pub fn load() -> Result<Self, String> {
        Self::load_from_path(&default_config_path()?)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|error| format!("Failed to read config at {}: {}", path.display(), error))?;
        let mut config = serde_json::from_str::<Self>(&raw)
            .map_err(|error| format!("Failed to parse config at {}: {}", path.display(), error))?;
        config.normalize();
        Ok(config)
    }

    pub fn save(&self) -> Result<PathBuf, String> {
        let path = default_config_path()?;
        self.save_to_path(&path)?;
        Ok(path)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|error| {
                format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    error
                )
            })?;
        }

        let mut normalized = self.clone();
        normalized.normalize();
        let serialized = serde_json::to_string_pretty(&normalized)
            .map_err(|error| format!("Failed to serialize config: {error}"))?;
        std::fs::write(path, serialized)
            .map_err(|error| format!("Failed to write config at {}: {}", path.display(), error))
    }

    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            api_base_url: normalize_text_option(self.api_base_url.clone()),
            access_token: normalize_text_option(self.access_token.clone()),
            request_timeout_secs: self.request_timeout_secs,
        }
    }

    /// Overwrite the fields that `update` sets.
    pub fn apply(&mut self, update: GatewayConfig) {
        if let Some(url) = normalize_text_option(update.api_base_url) {
            self.api_base_url = Some(url);
        }
        if let Some(token) = normalize_text_option(update.access_token) {
            self.access_token = Some(token);
        }
        if let Some(timeout) = update.request_timeout_secs {
            self.request_timeout_secs = Some(timeout);
        }
    }

    fn normalize(&mut self) {
        self.api_base_url = normalize_text_option(self.api_base_url.clone())
            .map(|url| url.trim_end_matches('/').to_string());
        self.access_token = normalize_text_option(self.access_token.clone());
    }
}

impl ApiArgs {
    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            api_base_url: normalize_text_option(self.api_url.clone()),
            access_token: normalize_text_option(self.token.clone()),
            request_timeout_secs: None,
        }
    }
}

/// Flag values win over environment values, which win over the config file.
pub fn effective_gateway_config(
    flags: &ApiArgs,
    env: GatewayConfig,
    file: &CliConfig,
) -> GatewayConfig {
    flags.gateway_config().or(env).or(file.gateway_config())
}
