use super::{AiConfig, AppConfig, BlockingConfig, DatabaseConfig, NetworkConfig};
use crate::errors::DomainError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where a downloaded default config is written when no local file exists.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/netguard/config.yaml";

/// Remote fallback fetched once when no config file is found locally.
pub const DEFAULT_CONFIG_URL: &str =
    "https://raw.githubusercontent.com/netguard/netguard/main/configs/config.yaml";

/// Paths probed in order when no explicit `--config` is given.
pub const CONFIG_SEARCH_PATHS: [&str; 4] = [
    "./configs/config.yaml",
    "./config.yaml",
    "/etc/netguard/config.yaml",
    "/var/lib/netguard/configs/config.yaml",
];

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub app: AppConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub blocking: BlockingConfig,

    #[serde(default)]
    pub ai: AiConfig,

    #[serde(default)]
    pub database: DatabaseConfig,
}

impl Config {
    /// First existing file from the search order, if any.
    pub fn find_file() -> Option<PathBuf> {
        CONFIG_SEARCH_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|p| p.is_file())
    }

    pub fn from_file(path: &Path) -> Result<Self, DomainError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            DomainError::ConfigLoad(format!("could not read {}: {e}", path.display()))
        })?;
        Self::from_yaml(&text)
    }

    pub fn from_yaml(text: &str) -> Result<Self, DomainError> {
        serde_yaml_ng::from_str(text).map_err(|e| DomainError::ConfigLoad(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.app.update_interval_hours == 0 {
            return Err(DomainError::ConfigLoad(
                "app.update_interval_hours must be at least 1".to_string(),
            ));
        }

        for source in &self.blocking.sources {
            source.validate().map_err(DomainError::ConfigLoad)?;
        }

        match self.app.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            other => Err(DomainError::ConfigLoad(format!(
                "unknown app.log_level '{other}'"
            ))),
        }
    }
}
