// src/config.rs

//! Panel configuration: a YAML file overlaid with `SMARTBATH_*` environment variables
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::dispatch::DebitPolicy;
use crate::error::{PanelError, Result};
use crate::log_info;

pub const DEFAULT_CONFIG_PATH: &str = "./smartbath.yml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrokerMode {
    #[default]
    Mqtt,
    /// In-process loopback, no network.
    Local,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    pub mode: BrokerMode,
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub keep_alive_secs: u64,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            mode: BrokerMode::Mqtt,
            host: "localhost".to_string(),
            port: 1883,
            client_id: format!("smartbath-panel-{}", uuid::Uuid::new_v4().simple()),
            keep_alive_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicConfig {
    /// Topic the device reports on.
    pub subscribe: String,
    /// Topic commands are sent to.
    pub publish: String,
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            subscribe: "screen".to_string(),
            publish: "screen".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub broker: BrokerConfig,
    pub topics: TopicConfig,
    pub debit_policy: DebitPolicy,
}

impl PanelConfig {
    /// Loads from `SMARTBATH_CONFIG` (or [`DEFAULT_CONFIG_PATH`]), then applies
    /// environment overrides and validates.
    pub fn load() -> Result<Self> {
        let path = std::env::var("SMARTBATH_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        let mut config = Self::from_path(&path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// A missing file yields the defaults.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            log_info!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: PanelConfig = serde_yaml::from_str(&content)?;
        log_info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("SMARTBATH_MQTT_HOST") {
            self.broker.host = host;
        }
        if let Some(port) = lookup("SMARTBATH_MQTT_PORT") {
            self.broker.port = port.trim().parse().map_err(|_| {
                PanelError::Config(format!("SMARTBATH_MQTT_PORT '{}' is not a port number", port))
            })?;
        }
        if let Some(client_id) = lookup("SMARTBATH_MQTT_CLIENT_ID") {
            self.broker.client_id = client_id;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.broker.mode == BrokerMode::Mqtt {
            if self.broker.host.trim().is_empty() {
                return Err(PanelError::Config("broker.host cannot be empty".to_string()));
            }
            if self.broker.port == 0 {
                return Err(PanelError::Config("broker.port cannot be 0".to_string()));
            }
            if self.broker.client_id.trim().is_empty() {
                return Err(PanelError::Config("broker.client_id cannot be empty".to_string()));
            }
        }
        if self.topics.subscribe.is_empty() || self.topics.publish.is_empty() {
            return Err(PanelError::Config("topics cannot be empty".to_string()));
        }
        Ok(())
    }
}
