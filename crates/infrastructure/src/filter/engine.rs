use super::domain_trie::DomainTrie;
use async_trait::async_trait;
use dashmap::DashSet;
use netguard_application::ports::{DecisionEnginePort, DomainScanner, RuleRepository};
use netguard_domain::DomainError;
use rustc_hash::FxBuildHasher;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

/// The packet decision engine.
///
/// The hot path (`decide`) is synchronous and touches only in-memory state:
/// the reverse-suffix trie and the pending-scan set. Unknown domains are
/// handed to the background scanner at most once at a time; the packet that
/// triggered the scan is optimistically allowed.
pub struct FilterEngine {
    trie: Arc<DomainTrie>,

    /// Domains with a scan in flight. `DashSet::insert` is the atomic
    /// insert-if-absent that keeps one high-frequency unknown domain from
    /// spawning N concurrent scans.
    pending_scans: Arc<DashSet<String, FxBuildHasher>>,

    scanner: Option<Arc<dyn DomainScanner>>,
    repository: Arc<dyn RuleRepository>,

    /// Captured at construction (inside the runtime) so `decide` can spawn
    /// scan tasks from the packet callback thread.
    runtime: Handle,
}

impl FilterEngine {
    /// Build the engine and seed the trie from the store's blocklist.
    ///
    /// Only `action = 'BLOCK'` rows are loaded, so an explicit ALLOW row
    /// keeps its domain out of the trie entirely. Without a scanner the
    /// engine runs as a pure blocklist filter.
    pub async fn new(
        repository: Arc<dyn RuleRepository>,
        scanner: Option<Arc<dyn DomainScanner>>,
    ) -> Result<Arc<Self>, DomainError> {
        let trie = Arc::new(DomainTrie::new());
        let domains = repository.get_blocklist().await?;
        trie.bulk_insert(&domains);

        info!(blocked_domains = trie.len(), "Filter engine initialized");

        Ok(Arc::new(Self {
            trie,
            pending_scans: Arc::new(DashSet::with_hasher(FxBuildHasher)),
            scanner,
            repository,
            runtime: Handle::current(),
        }))
    }

    fn spawn_scan(&self, domain: &str) {
        let Some(scanner) = self.scanner.as_ref() else {
            return;
        };

        // Winner of the insert-if-absent race owns the scan; everyone else
        // already has a scan in flight for this domain.
        if !self.pending_scans.insert(domain.to_string()) {
            return;
        }

        let scanner = Arc::clone(scanner);
        let trie = Arc::clone(&self.trie);
        let pending = Arc::clone(&self.pending_scans);
        let domain = domain.to_string();

        self.runtime.spawn(async move {
            match scanner.scan(&domain).await {
                Ok(true) => {
                    // Rule is visible in the trie before the pending entry
                    // clears, so the next decision for this domain blocks.
                    trie.insert(&domain);
                    info!(domain = %domain, "Scan verdict: blocked");
                }
                Ok(false) => {
                    debug!(domain = %domain, "Scan verdict: clean");
                }
                Err(e) => {
                    warn!(domain = %domain, error = %e, "Scan failed");
                }
            }
            pending.remove(&domain);
        });
    }
}

#[async_trait]
impl DecisionEnginePort for FilterEngine {
    fn decide(&self, domain: &str) -> Result<bool, DomainError> {
        if self.trie.should_block(domain) {
            return Ok(true);
        }

        self.spawn_scan(domain);

        // Unknown domains are allowed while the scan runs; a confirmed
        // verdict blocks the next packet or stream.
        Ok(false)
    }

    fn add_rule(&self, domain: &str) {
        self.trie.insert(domain);
    }

    async fn reload(&self) -> Result<(), DomainError> {
        let domains = self.repository.get_blocklist().await?;
        self.trie.bulk_insert(&domains);
        info!(blocked_domains = self.trie.len(), "Filter engine reloaded");
        Ok(())
    }

    fn blocked_domain_count(&self) -> usize {
        self.trie.len()
    }
}
