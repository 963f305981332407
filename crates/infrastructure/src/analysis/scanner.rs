use super::features::extract_features;
use async_trait::async_trait;
use netguard_application::ports::{Classifier, DomainScanner, RuleRepository};
use netguard_domain::{DomainError, RuleAction, SOURCE_AI_ADWARE, SOURCE_AI_MALWARE};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION, USER_AGENT};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Response bodies are read at most this far. Enough for any real landing
/// page; keeps a hostile server from ballooning the scanner.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

const SCAN_TIMEOUT: Duration = Duration::from_secs(10);

/// Deep-scan coordinator: fetches an unknown domain's landing page, runs the
/// feature extractor and the classifier pair, and persists a BLOCK rule on a
/// positive verdict.
pub struct SiteScanner {
    repository: Arc<dyn RuleRepository>,
    classifier: Arc<dyn Classifier>,
    client: reqwest::Client,
}

impl SiteScanner {
    pub fn new(
        repository: Arc<dyn RuleRepository>,
        classifier: Arc<dyn Classifier>,
    ) -> Result<Self, DomainError> {
        // Malware hosts routinely present broken or self-signed certificates
        // and still need to be fetched. The client sends no credentials and
        // only reads capped bodies.
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(SCAN_TIMEOUT)
            .default_headers(Self::browser_headers())
            .build()
            .map_err(|e| DomainError::Network(e.to_string()))?;

        Ok(Self {
            repository,
            classifier,
            client,
        })
    }

    /// Ad servers return 404 or empty bodies to obvious bots; the scan needs
    /// the markup a real browser would get.
    fn browser_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
            ),
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers
    }

    async fn fetch_body(&self, url: &str) -> Result<String, DomainError> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DomainError::Network(e.to_string()))?;

        let mut body: Vec<u8> = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| DomainError::Network(e.to_string()))?
        {
            if body.len() + chunk.len() > MAX_BODY_BYTES {
                body.extend_from_slice(&chunk[..MAX_BODY_BYTES - body.len()]);
                break;
            }
            body.extend_from_slice(&chunk);
        }

        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    /// HTTPS first, plain HTTP as the fallback. Returns the body together
    /// with the URL that actually worked, for the URL-shape features.
    async fn fetch_site(&self, domain: &str) -> Result<(String, String), DomainError> {
        let https_url = format!("https://{domain}");
        match self.fetch_body(&https_url).await {
            Ok(body) => Ok((body, https_url)),
            Err(https_err) => {
                debug!(domain, error = %https_err, "HTTPS fetch failed, trying HTTP");
                let http_url = format!("http://{domain}");
                let body = self.fetch_body(&http_url).await?;
                Ok((body, http_url))
            }
        }
    }
}

#[async_trait]
impl DomainScanner for SiteScanner {
    async fn scan(&self, domain: &str) -> Result<bool, DomainError> {
        let (html, url) = self.fetch_site(domain).await?;

        let features = extract_features(&html, &url, self.classifier.feature_order());
        let prediction = self.classifier.predict(features).await?;

        if !prediction.is_positive() {
            debug!(domain, "Scan clean");
            return Ok(false);
        }

        // Malware outranks adware when both models fire.
        let source = if prediction.is_malware {
            SOURCE_AI_MALWARE
        } else {
            SOURCE_AI_ADWARE
        };

        info!(domain, source, "Classifier flagged domain");

        if let Err(e) = self
            .repository
            .insert_or_update(domain, RuleAction::Block, source)
            .await
        {
            // The in-memory rule still protects this process lifetime.
            warn!(domain, error = %e, "Could not persist scan verdict");
        }

        Ok(true)
    }
}
