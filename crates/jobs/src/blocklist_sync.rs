use netguard_application::ports::BlocklistRefreshPort;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Periodic blocklist refresh: feeds → user rules → trie reload.
///
/// The first tick fires one full interval after start; the startup refresh
/// happens synchronously during bootstrap, before the listener binds.
pub struct BlocklistSyncJob {
    refresh: Arc<dyn BlocklistRefreshPort>,
    interval_secs: u64,
    shutdown: CancellationToken,
}

impl BlocklistSyncJob {
    pub fn new(refresh: Arc<dyn BlocklistRefreshPort>) -> Self {
        Self {
            refresh,
            interval_secs: 86400,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_interval(mut self, interval_secs: u64) -> Self {
        self.interval_secs = interval_secs;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub async fn start(self: Arc<Self>) {
        info!(
            interval_secs = self.interval_secs,
            "Starting blocklist sync job"
        );

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        info!("BlocklistSyncJob: shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        info!("BlocklistSyncJob: refreshing blocklist sources");
                        match self.refresh.refresh().await {
                            Ok(()) => info!("BlocklistSyncJob: refresh completed successfully"),
                            Err(e) => error!(error = %e, "BlocklistSyncJob: refresh failed"),
                        }
                    }
                }
            }
        });
    }
}
