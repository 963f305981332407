use netguard_domain::config::DatabaseConfig;
use netguard_infrastructure::database::create_pool;
use sqlx::SqlitePool;
use tracing::{error, info};

pub async fn init_database(cfg: &DatabaseConfig) -> anyhow::Result<SqlitePool> {
    info!(path = %cfg.path, "Initializing database");

    match create_pool(cfg).await {
        Ok(pool) => {
            info!("Database initialized successfully");
            Ok(pool)
        }
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            Err(e.into())
        }
    }
}
