use super::parser::parse_and_stream;
use async_trait::async_trait;
use futures::future::join_all;
use futures::{StreamExt, TryStreamExt};
use netguard_application::ports::{FeedSyncPort, RuleRepository};
use netguard_domain::{DomainError, SourceConfig};
use reqwest::header::{ETAG, IF_NONE_MATCH};
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tokio_util::io::StreamReader;
use tracing::{info, warn};

/// Bound of the parser→store channel. A full channel blocks the parser and,
/// through it, the network reader, so large feeds never balloon memory.
const FEED_CHANNEL_CAPACITY: usize = 2000;

/// Downloads configured blocklist feeds and pipes them into the rule store.
///
/// Each source is synced serially (fetch → parse → sweep → commit → ETag
/// write) inside its own spawned task; different sources run in parallel.
/// The ETag is only persisted after the sync transaction commits, so a crash
/// mid-sync leaves the old ETag in place and the next run refetches.
pub struct FeedUpdater {
    repository: Arc<dyn RuleRepository>,
    sources: Vec<SourceConfig>,
    client: reqwest::Client,
}

impl FeedUpdater {
    pub fn new(
        repository: Arc<dyn RuleRepository>,
        sources: Vec<SourceConfig>,
    ) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .user_agent("netguard/0.1 (blocklist-sync)")
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| DomainError::Network(e.to_string()))?;

        Ok(Self {
            repository,
            sources,
            client,
        })
    }

    async fn sync_source(
        repository: Arc<dyn RuleRepository>,
        client: reqwest::Client,
        source: SourceConfig,
    ) -> Result<(), DomainError> {
        info!(source = %source.name, format = %source.format, "Checking feed");

        // Name + URL keeps ETag keys unique when a feed changes location.
        let etag_key = format!("{}_{}", source.name, source.url);
        let cached_etag = repository.get_etag(&etag_key).await?;

        let mut request = client.get(&source.url);
        if let Some(etag) = &cached_etag {
            request = request.header(IF_NONE_MATCH, etag);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DomainError::Network(e.to_string()))?;

        if response.status() == StatusCode::NOT_MODIFIED {
            info!(source = %source.name, "Feed unchanged (304)");
            return Ok(());
        }

        if !response.status().is_success() {
            return Err(DomainError::Network(format!(
                "feed '{}' returned HTTP {}",
                source.name,
                response.status().as_u16()
            )));
        }

        let new_etag = response
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let (tx, rx) = mpsc::channel(FEED_CHANNEL_CAPACITY);

        // Consumer: the store runs the mark-and-sweep transaction.
        let consumer = {
            let repository = Arc::clone(&repository);
            let name = source.name.clone();
            tokio::spawn(async move { repository.stream_sync(rx, &name).await })
        };

        // Producer: stream the body through the format parser.
        let body = StreamReader::new(
            response
                .bytes_stream()
                .map_err(std::io::Error::other)
                .boxed(),
        );
        parse_and_stream(BufReader::new(body), tx, &source).await;

        let count = consumer
            .await
            .map_err(|e| DomainError::StoreOp(format!("sync task failed: {e}")))??;

        info!(source = %source.name, rules = count, "Feed updated");

        if let Some(etag) = new_etag {
            repository.update_etag(&etag_key, &etag).await?;
        }

        Ok(())
    }
}

#[async_trait]
impl FeedSyncPort for FeedUpdater {
    /// One spawned worker per source, joined before returning. Per-source
    /// failures (and panics) are logged and isolated: one broken feed never
    /// blocks the others, and it keeps its previous rules until the next run.
    async fn sync_all(&self) -> Result<(), DomainError> {
        let workers: Vec<_> = self
            .sources
            .iter()
            .cloned()
            .map(|source| {
                let repository = Arc::clone(&self.repository);
                let client = self.client.clone();
                tokio::spawn(async move {
                    let name = source.name.clone();
                    if let Err(e) = Self::sync_source(repository, client, source).await {
                        warn!(source = %name, error = %e, "Feed sync failed");
                    }
                })
            })
            .collect();

        for worker in join_all(workers).await {
            if let Err(e) = worker {
                warn!(error = %e, "Feed sync task panicked");
            }
        }

        Ok(())
    }
}
