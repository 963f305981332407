use serde::{Deserialize, Serialize};

/// General application settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Hours between periodic blocklist re-syncs. Default: 24.
    #[serde(default = "default_update_interval_hours")]
    pub update_interval_hours: u64,

    /// Log verbosity: trace, debug, info, warn, error. Default: info.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            update_interval_hours: default_update_interval_hours(),
            log_level: default_log_level(),
        }
    }
}

fn default_update_interval_hours() -> u64 {
    24
}

fn default_log_level() -> String {
    "info".to_string()
}
