use serde::Deserialize;
use std::fs;

use crate::error::{MotorpoolError, Result};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub booking: BookingConfig,
    #[serde(default)]
    pub watch: WatchConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BookingConfig {
    pub email: String,
    #[serde(default = "default_reason")]
    pub reason: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WatchConfig {
    #[serde(default = "default_poll_secs")]
    pub poll_secs: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_secs: default_poll_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_reason() -> String {
    "Car reservation".to_string()
}

fn default_poll_secs() -> u64 {
    30
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            MotorpoolError::Config(format!("Failed to read config file '{}': {}", path, e))
        })?;

        let config: Config = toml::from_str(&content)?;

        if config.api.base_url.is_empty() {
            return Err(MotorpoolError::Config(
                "api.base_url must not be empty".to_string(),
            ));
        }

        Ok(config)
    }
}
