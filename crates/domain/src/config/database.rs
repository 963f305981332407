use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,

    /// Seconds a writer waits for the file lock before `SQLITE_BUSY`.
    /// SQLite WAL serialises writers at the file level; a generous timeout
    /// avoids spurious errors while a feed sync transaction commits.
    /// Default: 30.
    #[serde(default = "default_busy_timeout_secs")]
    pub busy_timeout_secs: u64,

    /// Maximum pool connections. Default: 4.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            busy_timeout_secs: default_busy_timeout_secs(),
            max_connections: default_max_connections(),
        }
    }
}

fn default_db_path() -> String {
    "./data/blocklist.db".to_string()
}

fn default_busy_timeout_secs() -> u64 {
    30
}

fn default_max_connections() -> u32 {
    4
}
