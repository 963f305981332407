use async_trait::async_trait;
use netguard_domain::DomainError;

/// Application-layer port for the packet decision engine.
///
/// `decide` and `add_rule` are synchronous — they run on the packet callback
/// thread and only touch in-memory state (trie + pending-scan set). Only
/// `reload` is async because it reads the rule store.
#[async_trait]
pub trait DecisionEnginePort: Send + Sync {
    /// Verdict for one domain. A trie hit returns `true` immediately. A miss
    /// enqueues at most one background scan for the domain and returns
    /// `false`: the first packet to an unknown domain is optimistically
    /// allowed, and the rule lands before later connections.
    fn decide(&self, domain: &str) -> Result<bool, DomainError>;

    /// Insert one domain into the live trie (e.g. after a positive scan).
    fn add_rule(&self, domain: &str);

    /// Re-seed the trie from the store's current blocklist. Inserts only;
    /// rules removed upstream stay matched until process restart.
    async fn reload(&self) -> Result<(), DomainError>;

    /// Number of blocked domains currently held in the trie.
    fn blocked_domain_count(&self) -> usize;
}
