//! Configuration structures, one file per YAML section:
//! - `app`: update interval and log level
//! - `network`: kernel queue parameters
//! - `blocking`: feeds, blacklist, whitelist
//! - `ai`: classifier toggles and model directory
//! - `database`: SQLite path and pool tuning
//! - `root`: top-level document, search order, validation

pub mod ai;
pub mod app;
pub mod blocking;
pub mod database;
pub mod network;
pub mod root;

pub use ai::AiConfig;
pub use app::AppConfig;
pub use blocking::{BlockingConfig, SourceConfig};
pub use database::DatabaseConfig;
pub use network::NetworkConfig;
pub use root::{Config, CONFIG_SEARCH_PATHS, DEFAULT_CONFIG_PATH, DEFAULT_CONFIG_URL};
