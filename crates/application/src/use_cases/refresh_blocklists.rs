use crate::ports::{BlocklistRefreshPort, DecisionEnginePort, FeedSyncPort, RuleRepository};
use async_trait::async_trait;
use netguard_domain::DomainError;
use std::sync::Arc;
use tracing::info;

/// Full blocklist refresh: sync every feed, re-assert user rules, then
/// reload the live trie so new rules take effect without a restart.
///
/// User rules run after the feeds on purpose: a feed upsert may have
/// overwritten a `user_manual` ALLOW row mid-cycle, and re-asserting the
/// overrides last keeps "ALLOW wins" true at every trie load.
pub struct RefreshBlocklistsUseCase {
    feeds: Arc<dyn FeedSyncPort>,
    repository: Arc<dyn RuleRepository>,
    engine: Arc<dyn DecisionEnginePort>,
    whitelist: Vec<String>,
    blacklist: Vec<String>,
}

impl RefreshBlocklistsUseCase {
    pub fn new(
        feeds: Arc<dyn FeedSyncPort>,
        repository: Arc<dyn RuleRepository>,
        engine: Arc<dyn DecisionEnginePort>,
        whitelist: Vec<String>,
        blacklist: Vec<String>,
    ) -> Self {
        Self {
            feeds,
            repository,
            engine,
            whitelist,
            blacklist,
        }
    }

    pub async fn execute(&self) -> Result<(), DomainError> {
        self.feeds.sync_all().await?;

        self.repository
            .sync_user_rules(&self.whitelist, &self.blacklist)
            .await?;

        self.engine.reload().await?;

        info!(
            blocked_domains = self.engine.blocked_domain_count(),
            "Blocklist refresh completed"
        );
        Ok(())
    }
}

#[async_trait]
impl BlocklistRefreshPort for RefreshBlocklistsUseCase {
    async fn refresh(&self) -> Result<(), DomainError> {
        self.execute().await
    }
}
