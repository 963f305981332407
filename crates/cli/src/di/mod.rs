use netguard_application::ports::{
    Classifier, DecisionEnginePort, DomainScanner, FeedSyncPort, RuleRepository,
};
use netguard_application::use_cases::RefreshBlocklistsUseCase;
use netguard_domain::Config;
use netguard_infrastructure::analysis::SiteScanner;
use netguard_infrastructure::feeds::FeedUpdater;
use netguard_infrastructure::filter::FilterEngine;
use netguard_infrastructure::inference::OnnxClassifier;
use netguard_infrastructure::repositories::SqliteRuleRepository;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{info, warn};

/// Wired object graph for the running process.
pub struct Services {
    pub engine: Arc<dyn DecisionEnginePort>,
    pub refresh: Arc<RefreshBlocklistsUseCase>,
}

impl Services {
    /// Build everything in startup order: store → initial feed sync → user
    /// rules → classifier → scanner → engine (trie seed) → refresh use case.
    ///
    /// A classifier that fails to load is not fatal: the scanner is dropped
    /// and the engine runs as a pure blocklist filter.
    pub async fn build(config: &Config, pool: SqlitePool) -> anyhow::Result<Self> {
        let repository: Arc<dyn RuleRepository> = Arc::new(SqliteRuleRepository::new(pool));

        let feeds: Arc<dyn FeedSyncPort> = Arc::new(FeedUpdater::new(
            Arc::clone(&repository),
            config.blocking.sources.clone(),
        )?);

        info!("Checking blocklist sources for updates");
        feeds.sync_all().await?;
        repository
            .sync_user_rules(&config.blocking.whitelist, &config.blocking.blacklist)
            .await?;

        let scanner = build_scanner(config, &repository);

        let engine: Arc<dyn DecisionEnginePort> =
            FilterEngine::new(Arc::clone(&repository), scanner).await?;

        let refresh = Arc::new(RefreshBlocklistsUseCase::new(
            feeds,
            Arc::clone(&repository),
            Arc::clone(&engine),
            config.blocking.whitelist.clone(),
            config.blocking.blacklist.clone(),
        ));

        Ok(Self { engine, refresh })
    }
}

fn build_scanner(
    config: &Config,
    repository: &Arc<dyn RuleRepository>,
) -> Option<Arc<dyn DomainScanner>> {
    if !config.ai.enable_malware_scanner && !config.ai.enable_adware_model {
        info!("Both classifiers disabled; running in blocklist-only mode");
        return None;
    }

    let classifier: Arc<dyn Classifier> = match OnnxClassifier::load(&config.ai) {
        Ok(classifier) => Arc::new(classifier),
        Err(e) => {
            warn!(error = %e, "Classifier init failed; running in blocklist-only mode");
            return None;
        }
    };

    match SiteScanner::new(Arc::clone(repository), classifier) {
        Ok(scanner) => Some(Arc::new(scanner)),
        Err(e) => {
            warn!(error = %e, "Scanner init failed; running in blocklist-only mode");
            None
        }
    }
}
