use async_trait::async_trait;
use netguard_domain::DomainError;

/// Application-layer port for the feed updater.
///
/// One implementation run fetches every configured source concurrently,
/// skipping unchanged feeds via conditional GETs. Per-source failures are
/// logged and isolated; the run as a whole only errors on misuse.
#[async_trait]
pub trait FeedSyncPort: Send + Sync {
    async fn sync_all(&self) -> Result<(), DomainError>;
}

/// Application-layer port for a full blocklist refresh:
/// feeds → user rules → trie reload. Consumed by the periodic sync job.
#[async_trait]
pub trait BlocklistRefreshPort: Send + Sync {
    async fn refresh(&self) -> Result<(), DomainError>;
}
