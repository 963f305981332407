use async_trait::async_trait;
use netguard_domain::{DomainError, FeedEntry, Rule, RuleAction};
use tokio::sync::mpsc;

/// Application-layer port for the persistent rule store.
///
/// The implementation lives in the infrastructure layer (SQLite, WAL) and is
/// injected at DI time. All multi-statement work runs under an explicit
/// transaction; a partially ingested batch is never committed.
#[async_trait]
pub trait RuleRepository: Send + Sync {
    /// All domains with an active BLOCK rule. Seeds the in-memory trie, so
    /// ALLOW rows are excluded here by construction.
    async fn get_blocklist(&self) -> Result<Vec<String>, DomainError>;

    /// Exact-domain lookup. `Ok(None)` means not found; `Err` means the
    /// store itself failed.
    async fn get_rule(&self, domain: &str) -> Result<Option<Rule>, DomainError>;

    /// Upsert a single rule, replacing source and action on conflict.
    async fn insert_or_update(
        &self,
        domain: &str,
        action: RuleAction,
        source: &str,
    ) -> Result<(), DomainError>;

    /// Mark-and-sweep ingest of one feed: every streamed entry is upserted
    /// with a per-run epoch, then rules previously owned by `source` that
    /// were not re-emitted are deleted. Returns the number of upserted rows.
    async fn stream_sync(
        &self,
        stream: mpsc::Receiver<FeedEntry>,
        source: &str,
    ) -> Result<u64, DomainError>;

    /// Upsert user overrides in one transaction: whitelist entries as ALLOW,
    /// blacklist entries as BLOCK, all under the `user_manual` source.
    async fn sync_user_rules(
        &self,
        whitelist: &[String],
        blacklist: &[String],
    ) -> Result<(), DomainError>;

    /// Cached ETag for a feed, keyed `"<name>_<url>"`.
    async fn get_etag(&self, key: &str) -> Result<Option<String>, DomainError>;

    async fn update_etag(&self, key: &str, value: &str) -> Result<(), DomainError>;
}
