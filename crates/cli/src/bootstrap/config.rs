use netguard_domain::config::{Config, DEFAULT_CONFIG_PATH, DEFAULT_CONFIG_URL};
use netguard_domain::DomainError;
use std::path::{Path, PathBuf};
use tracing::info;

/// Resolve and load the configuration.
///
/// An explicit `--config` path wins; otherwise the standard locations are
/// probed, and as a last resort a default config is downloaded once and
/// written to `/etc/netguard/config.yaml`.
pub async fn load_config(path_override: Option<&str>) -> anyhow::Result<Config> {
    let path = match path_override {
        Some(p) => PathBuf::from(p),
        None => match Config::find_file() {
            Some(p) => p,
            None => fetch_default_config().await?,
        },
    };

    let config = Config::from_file(&path)?;
    config.validate()?;

    info!(
        config_file = %path.display(),
        sources = config.blocking.sources.len(),
        queue = config.network.queue_num,
        "Configuration loaded"
    );

    Ok(config)
}

async fn fetch_default_config() -> Result<PathBuf, DomainError> {
    info!(url = DEFAULT_CONFIG_URL, "No config file found, downloading default");

    let response = reqwest::get(DEFAULT_CONFIG_URL)
        .await
        .map_err(|e| DomainError::ConfigLoad(format!("default config fetch failed: {e}")))?;

    if !response.status().is_success() {
        return Err(DomainError::ConfigLoad(format!(
            "default config fetch returned HTTP {}",
            response.status().as_u16()
        )));
    }

    let body = response
        .text()
        .await
        .map_err(|e| DomainError::ConfigLoad(e.to_string()))?;

    let target = Path::new(DEFAULT_CONFIG_PATH);
    if let Some(dir) = target.parent() {
        std::fs::create_dir_all(dir).map_err(|e| {
            DomainError::ConfigLoad(format!("could not create {}: {e}", dir.display()))
        })?;
    }
    std::fs::write(target, &body).map_err(|e| {
        DomainError::ConfigLoad(format!("could not write {}: {e}", target.display()))
    })?;

    info!(path = DEFAULT_CONFIG_PATH, "Default config saved");
    Ok(target.to_path_buf())
}
