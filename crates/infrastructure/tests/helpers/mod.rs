#![allow(dead_code)]

use async_trait::async_trait;
use netguard_application::ports::DomainScanner;
use netguard_domain::DomainError;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// In-memory rule store with the production schema.
///
/// A single connection: every pooled connection to `sqlite::memory:` would
/// otherwise open its own empty database.
pub async fn create_test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    netguard_infrastructure::database::init_schema(&pool)
        .await
        .unwrap();

    pool
}

/// Scanner double: counts invocations and returns a fixed verdict after an
/// optional delay, so tests can keep a scan "in flight".
pub struct MockScanner {
    pub calls: AtomicUsize,
    pub verdict: bool,
    pub delay: Duration,
}

impl MockScanner {
    pub fn new(verdict: bool) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            verdict,
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DomainScanner for MockScanner {
    async fn scan(&self, _domain: &str) -> Result<bool, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self.verdict)
    }
}

/// Minimal HTTP/1.1 feed server for updater tests.
///
/// Serves a fixed body with a fixed ETag; a request carrying a matching
/// `If-None-Match` gets `304 Not Modified` with no body.
pub struct MockFeedServer {
    pub addr: SocketAddr,
    requests: Arc<AtomicUsize>,
    full_responses: Arc<AtomicUsize>,
}

impl MockFeedServer {
    pub async fn start(body: &'static str, etag: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(AtomicUsize::new(0));
        let full_responses = Arc::new(AtomicUsize::new(0));

        let req_counter = Arc::clone(&requests);
        let full_counter = Arc::clone(&full_responses);

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                req_counter.fetch_add(1, Ordering::SeqCst);

                let mut buf = vec![0u8; 8192];
                let n = socket.read(&mut buf).await.unwrap_or(0);
                let request = String::from_utf8_lossy(&buf[..n]).into_owned();

                let if_none_match = request.lines().find_map(|line| {
                    line.split_once(':').and_then(|(name, value)| {
                        name.eq_ignore_ascii_case("if-none-match")
                            .then(|| value.trim().to_string())
                    })
                });

                let response = if if_none_match.as_deref() == Some(etag) {
                    format!(
                        "HTTP/1.1 304 Not Modified\r\nETag: {etag}\r\nConnection: close\r\n\r\n"
                    )
                } else {
                    full_counter.fetch_add(1, Ordering::SeqCst);
                    format!(
                        "HTTP/1.1 200 OK\r\nETag: {etag}\r\nContent-Type: text/plain\r\n\
                         Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    )
                };

                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        Self {
            addr,
            requests,
            full_responses,
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}/list", self.addr)
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn full_response_count(&self) -> usize {
        self.full_responses.load(Ordering::SeqCst)
    }
}
