//! Configuration types for the proxy.
//!
//! All values are fixed at startup; there is no runtime reconfiguration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub listen: ListenConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub forward: ForwardConfig,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.backend.host.is_empty() {
            anyhow::bail!("backend.host must not be empty");
        }
        if !self.backend.base_path.starts_with('/') {
            anyhow::bail!(
                "backend.base_path must start with '/': {}",
                self.backend.base_path
            );
        }
        if self.forward.timeout_ms == 0 {
            anyhow::bail!("forward.timeout_ms must be greater than zero");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListenConfig {
    #[serde(default = "default_listen_port")]
    pub port: u16,
}

/// The fixed NAS target. The listing action always goes here; the generic
/// forward action targets whatever URL the caller supplies.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    #[serde(default = "default_backend_host")]
    pub host: String,
    #[serde(default = "default_backend_port")]
    pub port: u16,
    /// Directory listed by `action=list`. Must start with '/'.
    #[serde(default = "default_base_path")]
    pub base_path: String,
}

impl BackendConfig {
    /// Scheme/host/port prefix used for the listing call and for building
    /// fully qualified entry URLs.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ForwardConfig {
    /// Upstream timeout, measured from the start of each outbound call.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl ForwardConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_listen_port() -> u16 {
    8000
}

fn default_backend_host() -> String {
    "192.168.31.2".to_string()
}

fn default_backend_port() -> u16 {
    5005
}

fn default_base_path() -> String {
    "/DataBackup/".to_string()
}

fn default_timeout_ms() -> u64 {
    15_000
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            port: default_listen_port(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            host: default_backend_host(),
            port: default_backend_port(),
            base_path: default_base_path(),
        }
    }
}

impl Default for ForwardConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
        }
    }
}
