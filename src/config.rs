//! Configuration for the exporter
//!
//! Settings are loaded in layers, lowest priority first:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file (default: `config/grid-exporter.toml`,
//!    overridable via `GRID_EXPORTER_CONFIG` or `--config`)
//! 3. Environment variables (`GRID_EXPORTER__<section>__<key>`)
//! 4. CLI flags (`--port`, `--hub`), applied by the caller
//!
//! Examples:
//! - `GRID_EXPORTER__SERVER__PORT=9090`
//! - `GRID_EXPORTER__HUB__URL=http://grid.internal:4444`

use config::{Environment, File};
use serde::Deserialize;
use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

const CONFIG_ENV_VAR: &str = "GRID_EXPORTER_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/grid-exporter.toml";
const ENV_PREFIX: &str = "GRID_EXPORTER";
const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid hub URL {url:?}: {reason}")]
    InvalidHubUrl { url: String, reason: String },
}

/// Top-level configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub hub: HubConfig,
}

/// Listener configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 9000,
        }
    }
}

impl ServerConfig {
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Upstream hub endpoint and fetch timeouts
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    pub url: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:4444".to_string(),
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
        }
    }
}

impl HubConfig {
    /// Hub base URL without a trailing slash, ready for path concatenation.
    pub fn base_url(&self) -> String {
        self.url.trim_end_matches('/').to_string()
    }
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file is malformed or a value
    /// cannot be deserialized into the expected type.
    pub fn load(path_override: Option<PathBuf>) -> Result<Self, ConfigError> {
        let config_path = path_override
            .or_else(|| env::var(CONFIG_ENV_VAR).ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

        Self::load_from_sources(config_path)
    }

    /// Load configuration from a specific path and the environment
    ///
    /// Useful for testing with custom configuration files.
    pub fn load_from_sources(config_path: PathBuf) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();

        if config_path.exists() {
            tracing::info!("loading configuration from {}", config_path.display());
            builder = builder.add_source(File::from(config_path).required(false));
        }

        // GRID_EXPORTER__SERVER__PORT -> server.port
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator(ENV_SEPARATOR)
                .try_parsing(true),
        );

        let config = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Rejects hub URLs the fetcher could not use.
    ///
    /// Called after CLI overrides are applied, so a bad `--hub` value is a
    /// startup-time failure rather than a permanently inaccessible hub.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let parsed =
            Url::parse(&self.hub.url).map_err(|e| ConfigError::InvalidHubUrl {
                url: self.hub.url.clone(),
                reason: e.to_string(),
            })?;

        match parsed.scheme() {
            "http" | "https" => {}
            other => {
                return Err(ConfigError::InvalidHubUrl {
                    url: self.hub.url.clone(),
                    reason: format!("unsupported scheme {other:?}"),
                });
            }
        }

        if parsed.host_str().is_none() {
            return Err(ConfigError::InvalidHubUrl {
                url: self.hub.url.clone(),
                reason: "missing host".to_string(),
            });
        }

        Ok(())
    }
}
