use async_trait::async_trait;
use netguard_application::ports::RuleRepository;
use netguard_domain::{DomainError, FeedEntry, Rule, RuleAction, SOURCE_USER_MANUAL};
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, instrument};

type RuleRow = (String, Option<String>, Option<String>, Option<String>, Option<i64>);

pub struct SqliteRuleRepository {
    pool: SqlitePool,
}

impl SqliteRuleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_rule(row: RuleRow) -> Result<Rule, DomainError> {
        let (domain, source, action, created_at, updated_at) = row;

        let action = action
            .as_deref()
            .and_then(RuleAction::parse)
            .ok_or_else(|| {
                DomainError::StoreOp(format!("rule '{domain}' has an invalid action"))
            })?;

        Ok(Rule {
            domain: Arc::from(domain.as_str()),
            action,
            source: Arc::from(source.unwrap_or_default().as_str()),
            created_at,
            updated_at,
        })
    }
}

#[async_trait]
impl RuleRepository for SqliteRuleRepository {
    #[instrument(skip(self))]
    async fn get_blocklist(&self) -> Result<Vec<String>, DomainError> {
        let rows = sqlx::query_as::<_, (String,)>(
            "SELECT domain FROM rules WHERE action = 'BLOCK'",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to load blocklist");
            DomainError::StoreOp(e.to_string())
        })?;

        Ok(rows.into_iter().map(|(domain,)| domain).collect())
    }

    #[instrument(skip(self))]
    async fn get_rule(&self, domain: &str) -> Result<Option<Rule>, DomainError> {
        let row = sqlx::query_as::<_, RuleRow>(
            "SELECT domain, source, action, created_at, updated_at
             FROM rules WHERE domain = ?",
        )
        .bind(domain)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to query rule");
            DomainError::StoreOp(e.to_string())
        })?;

        row.map(Self::row_to_rule).transpose()
    }

    #[instrument(skip(self))]
    async fn insert_or_update(
        &self,
        domain: &str,
        action: RuleAction,
        source: &str,
    ) -> Result<(), DomainError> {
        let now = chrono::Utc::now().timestamp();

        sqlx::query(
            "INSERT INTO rules (domain, action, source, updated_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(domain) DO UPDATE SET
                 action = excluded.action,
                 source = excluded.source,
                 updated_at = excluded.updated_at",
        )
        .bind(domain)
        .bind(action.as_str())
        .bind(source)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, domain, "Failed to upsert rule");
            DomainError::StoreOp(e.to_string())
        })?;

        Ok(())
    }

    /// Mark-and-sweep ingest of one feed.
    ///
    /// One transaction for the whole stream: every entry is upserted with
    /// this run's epoch `T`, then `DELETE WHERE source = ? AND updated_at
    /// != T` removes rules this source stopped publishing. Rules owned by
    /// other sources keep their timestamps and are untouched by the sweep.
    /// Any statement error drops the transaction, rolling the batch back.
    #[instrument(skip(self, stream))]
    async fn stream_sync(
        &self,
        mut stream: mpsc::Receiver<FeedEntry>,
        source: &str,
    ) -> Result<u64, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::StoreOp(e.to_string()))?;

        let import_time = chrono::Utc::now().timestamp();
        let mut count: u64 = 0;

        while let Some(entry) = stream.recv().await {
            sqlx::query(
                "INSERT INTO rules (domain, source, action, updated_at)
                 VALUES (?, ?, ?, ?)
                 ON CONFLICT(domain) DO UPDATE SET
                     updated_at = excluded.updated_at,
                     source = excluded.source,
                     action = excluded.action",
            )
            .bind(&entry.domain)
            .bind(source)
            .bind(entry.action.as_str())
            .bind(import_time)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!(error = %e, domain = %entry.domain, "Feed upsert failed, rolling back");
                DomainError::StoreOp(e.to_string())
            })?;
            count += 1;
        }

        sqlx::query("DELETE FROM rules WHERE source = ? AND updated_at != ?")
            .bind(source)
            .bind(import_time)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!(error = %e, source, "Stale-rule sweep failed, rolling back");
                DomainError::StoreOp(e.to_string())
            })?;

        tx.commit()
            .await
            .map_err(|e| DomainError::StoreOp(e.to_string()))?;

        info!(source, rules = count, "Feed sync committed");
        Ok(count)
    }

    #[instrument(skip(self, whitelist, blacklist))]
    async fn sync_user_rules(
        &self,
        whitelist: &[String],
        blacklist: &[String],
    ) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::StoreOp(e.to_string()))?;

        let now = chrono::Utc::now().timestamp();

        let entries = blacklist
            .iter()
            .map(|d| (d, RuleAction::Block))
            .chain(whitelist.iter().map(|d| (d, RuleAction::Allow)));

        for (domain, action) in entries {
            sqlx::query(
                "INSERT INTO rules (domain, source, action, updated_at)
                 VALUES (?, ?, ?, ?)
                 ON CONFLICT(domain) DO UPDATE SET
                     source = excluded.source,
                     action = excluded.action,
                     updated_at = excluded.updated_at",
            )
            .bind(domain)
            .bind(SOURCE_USER_MANUAL)
            .bind(action.as_str())
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!(error = %e, domain, "User rule upsert failed, rolling back");
                DomainError::StoreOp(e.to_string())
            })?;
        }

        tx.commit()
            .await
            .map_err(|e| DomainError::StoreOp(e.to_string()))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_etag(&self, key: &str) -> Result<Option<String>, DomainError> {
        let row = sqlx::query_as::<_, (String,)>("SELECT value FROM metadata WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::StoreOp(e.to_string()))?;

        Ok(row.map(|(value,)| value))
    }

    #[instrument(skip(self))]
    async fn update_etag(&self, key: &str, value: &str) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO metadata (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::StoreOp(e.to_string()))?;

        Ok(())
    }
}
