use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

/// Environment variable naming a YAML config file.
pub const CONFIG_ENV: &str = "FRAMECAST_CONFIG";
pub const PORT_ENV: &str = "FRAMECAST_PORT";
pub const ROOT_ENV: &str = "FRAMECAST_ROOT";
pub const MAX_IN_FLIGHT_ENV: &str = "FRAMECAST_MAX_IN_FLIGHT";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub stream: StreamConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Requests served at once; further connections get 503
    pub max_in_flight: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory static files are served from
    pub root: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    pub route: String,
    pub poll_interval_ms: u64,
    /// JPEG re-published on every tick when no camera is attached
    pub frame_file: Option<PathBuf>,
    pub frame_interval_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 12345,
            max_in_flight: 4,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./www"),
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            route: "/camera/stream".to_string(),
            poll_interval_ms: 100,
            frame_file: None,
            frame_interval_ms: 100,
        }
    }
}

impl ServerConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Config {
    /// Loads the file named by `FRAMECAST_CONFIG` (defaults when unset),
    /// applies environment overrides and validates the result.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };

        if let Ok(port) = std::env::var(PORT_ENV) {
            cfg.server.port = port
                .parse()
                .with_context(|| format!("{} is not a valid port: {}", PORT_ENV, port))?;
        }
        if let Some(root) = std::env::var_os(ROOT_ENV) {
            cfg.storage.root = PathBuf::from(root);
        }
        if let Ok(max) = std::env::var(MAX_IN_FLIGHT_ENV) {
            cfg.server.max_in_flight = max
                .parse()
                .with_context(|| format!("{} is not a number: {}", MAX_IN_FLIGHT_ENV, max))?;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_yaml_str(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_yaml_str(text: &str) -> anyhow::Result<Self> {
        let cfg: Config = serde_yaml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.max_in_flight == 0 {
            anyhow::bail!("server.max_in_flight must be at least 1");
        }
        if !self.stream.route.starts_with('/') {
            anyhow::bail!("stream.route must start with '/': {:?}", self.stream.route);
        }
        if self.stream.poll_interval_ms == 0 {
            anyhow::bail!("stream.poll_interval_ms must be positive");
        }
        if self.stream.frame_interval_ms == 0 {
            anyhow::bail!("stream.frame_interval_ms must be positive");
        }
        Ok(())
    }
}
