//! Relay configuration
//!
//! Defaults, optionally overlaid by a TOML file and then `MMS_*` environment
//! variables.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidEnv { key: &'static str, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Configuration for a relay instance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Address the HTTP/WebSocket server listens on
    pub listen_addr: SocketAddr,

    /// Dedicated Prometheus listener; `/metrics` on the main router when unset
    pub metrics_addr: Option<SocketAddr>,

    /// Simulated delay before a routed message resolves
    pub delivery_delay_ms: u64,

    /// Probability that a routed delivery succeeds
    pub success_rate: f64,

    /// Fixed RNG seed for reproducible simulations
    pub seed: Option<u64>,

    /// How long a forward may wait on a slow recipient before it counts as failed
    pub send_timeout_ms: u64,

    /// Outbound frames buffered per connection
    pub outbound_buffer: usize,

    /// Default page size for message listing
    pub default_list_limit: usize,

    pub log_format: LogFormat,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8083)),
            metrics_addr: None,
            delivery_delay_ms: 2000,
            success_rate: 0.9,
            seed: None,
            send_timeout_ms: 1000,
            outbound_buffer: 64,
            default_list_limit: 100,
            log_format: LogFormat::Text,
        }
    }
}

impl RelayConfig {
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Overlay values from `MMS_*` environment variables
    pub fn apply_env(self) -> ConfigResult<Self> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    fn apply_vars(mut self, get: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        fn parse<T: std::str::FromStr>(key: &'static str, value: String) -> ConfigResult<T> {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidEnv { key, value })
        }

        if let Some(v) = get("MMS_LISTEN_ADDR") {
            self.listen_addr = parse("MMS_LISTEN_ADDR", v)?;
        }
        if let Some(v) = get("MMS_METRICS_ADDR") {
            self.metrics_addr = Some(parse("MMS_METRICS_ADDR", v)?);
        }
        if let Some(v) = get("MMS_DELIVERY_DELAY_MS") {
            self.delivery_delay_ms = parse("MMS_DELIVERY_DELAY_MS", v)?;
        }
        if let Some(v) = get("MMS_SUCCESS_RATE") {
            self.success_rate = parse("MMS_SUCCESS_RATE", v)?;
        }
        if let Some(v) = get("MMS_SEED") {
            self.seed = Some(parse("MMS_SEED", v)?);
        }
        if let Some(v) = get("MMS_SEND_TIMEOUT_MS") {
            self.send_timeout_ms = parse("MMS_SEND_TIMEOUT_MS", v)?;
        }
        if let Some(v) = get("MMS_LOG_FORMAT") {
            self.log_format = match v.trim().to_ascii_lowercase().as_str() {
                "text" => LogFormat::Text,
                "json" => LogFormat::Json,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        key: "MMS_LOG_FORMAT",
                        value: v,
                    })
                }
            };
        }

        Ok(self)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !(0.0..=1.0).contains(&self.success_rate) {
            return Err(ConfigError::Invalid(format!(
                "success_rate must be within [0, 1], got {}",
                self.success_rate
            )));
        }
        if self.outbound_buffer == 0 {
            return Err(ConfigError::Invalid("outbound_buffer must be > 0".into()));
        }
        if self.default_list_limit == 0 {
            return Err(ConfigError::Invalid("default_list_limit must be > 0".into()));
        }
        Ok(())
    }

    pub fn delivery_delay(&self) -> Duration {
        Duration::from_millis(self.delivery_delay_ms)
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }

    pub fn with_delivery_delay(mut self, delay: Duration) -> Self {
        self.delivery_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn with_success_rate(mut self, rate: f64) -> Self {
        self.success_rate = rate;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_outbound_buffer(mut self, buffer: usize) -> Self {
        self.outbound_buffer = buffer;
        self
    }
}
