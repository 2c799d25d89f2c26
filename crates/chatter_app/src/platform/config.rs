use std::fs;
use std::path::Path;

use chatter_engine::FeedSettings;
use client_logging::{client_info, client_warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Default location of the startup configuration file.
pub const CONFIG_PATH: &str = "./chatter.ron";

/// Startup configuration: where the feed service lives and how a message
/// row is rendered. Missing or unreadable files fall back to defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the feed service.
    pub server_url: String,
    /// Line template for one message; `{time}`, `{nickname}` and `{message}`
    /// are substituted.
    pub message_format: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8000/".to_string(),
            message_format: "[{time}] <{nickname}> {message}".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid server url: {0}")]
    InvalidServerUrl(String),
}

impl ClientConfig {
    pub fn feed_settings(&self) -> Result<FeedSettings, ConfigError> {
        let base_url = Url::parse(&self.server_url)
            .map_err(|err| ConfigError::InvalidServerUrl(err.to_string()))?;
        Ok(FeedSettings {
            base_url,
            ..FeedSettings::default()
        })
    }
}

pub fn load(path: &Path) -> ClientConfig {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return ClientConfig::default();
        }
        Err(err) => {
            client_warn!("Failed to read config from {:?}: {}", path, err);
            return ClientConfig::default();
        }
    };

    match ron::from_str(&content) {
        Ok(config) => {
            client_info!("Loaded configuration from {:?}", path);
            config
        }
        Err(err) => {
            client_warn!("Failed to parse config from {:?}: {}", path, err);
            ClientConfig::default()
        }
    }
}
