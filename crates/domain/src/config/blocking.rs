use crate::validators;
use serde::{Deserialize, Serialize};

/// Blocklist feeds and user-maintained overrides
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BlockingConfig {
    /// Remote blocklist feeds synced into the rule store.
    #[serde(default)]
    pub sources: Vec<SourceConfig>,

    /// Domains the user always blocks, regardless of feeds.
    #[serde(default)]
    pub blacklist: Vec<String>,

    /// Domains the user always allows, overriding every block rule.
    #[serde(default)]
    pub whitelist: Vec<String>,
}

/// One remote blocklist feed.
///
/// `format` is kept as a free string: unknown values fall back to the hosts
/// parser at dispatch time instead of failing the whole config load.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    pub name: String,
    pub url: String,

    /// One of: hosts, text, csv, json. Default: hosts.
    #[serde(default = "default_format")]
    pub format: String,

    /// CSV only: header column holding the domain.
    #[serde(default)]
    pub target_column: Option<String>,
}

impl SourceConfig {
    pub fn validate(&self) -> Result<(), String> {
        validators::validate_source_name(&self.name)?;
        validators::validate_url(&self.url)?;
        if self.format == "csv" && self.target_column.as_deref().unwrap_or("").is_empty() {
            return Err(format!("source '{}': csv format requires target_column", self.name));
        }
        Ok(())
    }
}

fn default_format() -> String {
    "hosts".to_string()
}
