use crate::error::ExporterError;
use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// Credential FreeSWITCH ships with in `event_socket.conf.xml`
pub const DEFAULT_PASSWORD: &str = "ClueCon";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub freeswitch: FreeSwitchConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub health: HealthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FreeSwitchConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_esl_port")]
    pub port: u16,
    #[serde(default = "default_password")]
    pub password: SecretString,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Run the HTTP server instead of printing once and exiting
    #[serde(default)]
    pub serve: bool,
    #[serde(default = "default_addr")]
    pub addr: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Thresholds for the `/gateways/check*` endpoints
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct HealthConfig {
    #[serde(default = "default_max_ping_ms")]
    pub max_ping_ms: f64,
    #[serde(default)]
    pub unparseable_ping: UnparseablePing,
}

/// How a gateway whose ping time is not a number counts in the latency check
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnparseablePing {
    #[default]
    Healthy,
    Unhealthy,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_esl_port() -> u16 {
    8021
}

fn default_password() -> SecretString {
    SecretString::from(DEFAULT_PASSWORD)
}

fn default_addr() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    9191
}

fn default_max_ping_ms() -> f64 {
    100.0
}

impl Default for FreeSwitchConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_esl_port(),
            password: default_password(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            serve: false,
            addr: default_addr(),
            port: default_port(),
        }
    }
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            max_ping_ms: default_max_ping_ms(),
            unparseable_ping: UnparseablePing::default(),
        }
    }
}

impl FreeSwitchConfig {
    pub fn uses_default_password(&self) -> bool {
        self.password.expose_secret() == DEFAULT_PASSWORD
    }
}

impl Config {
    /// Read file and environment layers; call [`Config::validate`] once
    /// command-line overrides are applied
    pub fn load(path: &str) -> Result<Self> {
        // Load environment variables from .env if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("FREESWITCH_EXPORTER").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    pub fn validate(&self) -> std::result::Result<(), ExporterError> {
        if self.freeswitch.host.trim().is_empty() {
            return Err(ExporterError::Config(
                "freeswitch.host must not be empty".to_string(),
            ));
        }
        if self.freeswitch.port == 0 {
            return Err(ExporterError::Config(
                "freeswitch.port must be non-zero".to_string(),
            ));
        }
        if self.server.port == 0 {
            return Err(ExporterError::Config(
                "server.port must be non-zero".to_string(),
            ));
        }
        if !self.health.max_ping_ms.is_finite() || self.health.max_ping_ms <= 0.0 {
            return Err(ExporterError::Config(format!(
                "health.max_ping_ms must be a positive number, got {}",
                self.health.max_ping_ms
            )));
        }
        Ok(())
    }
}
