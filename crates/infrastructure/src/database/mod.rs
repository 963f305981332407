use netguard_domain::config::DatabaseConfig;
use netguard_domain::DomainError;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::path::Path;
use std::time::Duration;

/// Create the connection pool for the rule store.
///
/// WAL journaling lets the feed-sync writer commit while the hot path keeps
/// reading; NORMAL synchronous is the usual WAL pairing.
pub async fn create_pool(cfg: &DatabaseConfig) -> Result<SqlitePool, DomainError> {
    if let Some(dir) = Path::new(&cfg.path).parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir).map_err(|e| {
                DomainError::StoreInit(format!("could not create {}: {e}", dir.display()))
            })?;
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(&cfg.path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(cfg.busy_timeout_secs));

    let pool = SqlitePoolOptions::new()
        .max_connections(cfg.max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(cfg.busy_timeout_secs))
        .connect_with(options)
        .await
        .map_err(|e| DomainError::StoreInit(e.to_string()))?;

    init_schema(&pool).await?;

    Ok(pool)
}

/// Create tables and indexes if they do not exist yet. Idempotent.
pub async fn init_schema(pool: &SqlitePool) -> Result<(), DomainError> {
    let statements = [
        "CREATE TABLE IF NOT EXISTS rules (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            domain TEXT UNIQUE NOT NULL,
            source TEXT,
            action TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at INTEGER
        )",
        "CREATE INDEX IF NOT EXISTS idx_domain ON rules(domain)",
        "CREATE TABLE IF NOT EXISTS metadata (
            key TEXT PRIMARY KEY,
            value TEXT
        )",
    ];

    for statement in statements {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| DomainError::StoreInit(e.to_string()))?;
    }

    Ok(())
}
