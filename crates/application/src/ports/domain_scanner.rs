use async_trait::async_trait;
use netguard_domain::DomainError;

/// Application-layer port for the deep-scan pipeline.
#[async_trait]
pub trait DomainScanner: Send + Sync {
    /// Fetch the site, extract features, classify, and persist a BLOCK rule
    /// on a positive verdict. Returns whether a rule was written, so the
    /// caller can update the live trie before releasing the pending entry.
    ///
    /// Network, extraction and classifier failures are all non-fatal to the
    /// process; they surface here as `Err` and are logged by the caller.
    async fn scan(&self, domain: &str) -> Result<bool, DomainError>;
}
