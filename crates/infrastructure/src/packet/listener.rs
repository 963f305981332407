use super::parser::extract_domain;
use netguard_application::ports::DecisionEnginePort;
use netguard_domain::DomainError;
use nfq::{Queue, Verdict};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Kernel queue parameters, taken from `network.*` config.
#[derive(Debug, Clone, Copy)]
pub struct QueueConfig {
    pub queue_num: u16,
    pub max_queue_len: u32,
}

/// NFQUEUE listener: binds the queue and drives the per-packet verdict loop.
///
/// The loop runs on a dedicated blocking thread because `Queue::recv` is a
/// synchronous netlink read. The engine's `decide` is in-memory only, so a
/// callback never suspends between receive and verdict write.
pub struct PacketListener {
    engine: Arc<dyn DecisionEnginePort>,
}

impl PacketListener {
    pub fn new(engine: Arc<dyn DecisionEnginePort>) -> Self {
        Self { engine }
    }

    /// Bind the queue and process packets until `shutdown` fires.
    ///
    /// Bind failures are fatal (`QueueBind`); everything after that fails
    /// open: a packet we cannot parse or decide is ACCEPTed.
    pub async fn start(
        &self,
        shutdown: CancellationToken,
        cfg: QueueConfig,
    ) -> Result<(), DomainError> {
        let mut queue = Queue::open().map_err(|e| DomainError::QueueBind(e.to_string()))?;
        queue
            .bind(cfg.queue_num)
            .map_err(|e| DomainError::QueueBind(e.to_string()))?;

        info!(
            queue = cfg.queue_num,
            max_queue_len = cfg.max_queue_len,
            "NFQueue listener bound"
        );

        let engine = Arc::clone(&self.engine);
        let token = shutdown.clone();

        let worker = tokio::task::spawn_blocking(move || {
            // recv blocks on the netlink socket, so cancellation is observed
            // once the next packet (or receive error) arrives.
            while !token.is_cancelled() {
                let mut msg = match queue.recv() {
                    Ok(msg) => msg,
                    Err(e) => {
                        if token.is_cancelled() {
                            break;
                        }
                        warn!(error = %e, "NFQueue receive failed");
                        continue;
                    }
                };

                let verdict = Self::verdict_for(engine.as_ref(), msg.get_payload());
                msg.set_verdict(verdict);

                if let Err(e) = queue.verdict(msg) {
                    warn!(error = %e, "Failed to write verdict");
                }
            }
            info!("NFQueue listener stopped");
        });

        worker
            .await
            .map_err(|e| DomainError::QueueBind(format!("listener thread failed: {e}")))?;

        Ok(())
    }

    /// The only outputs of the hot path are ACCEPT and DROP; every error
    /// branch resolves to ACCEPT.
    fn verdict_for(engine: &dyn DecisionEnginePort, payload: &[u8]) -> Verdict {
        if payload.is_empty() {
            return Verdict::Accept;
        }

        let Some(domain) = extract_domain(payload) else {
            return Verdict::Accept;
        };

        match engine.decide(&domain) {
            Ok(true) => {
                info!(domain = %domain, len = payload.len(), "Verdict: DROP");
                Verdict::Drop
            }
            Ok(false) => {
                debug!(domain = %domain, "Verdict: ACCEPT");
                Verdict::Accept
            }
            Err(e) => {
                warn!(domain = %domain, error = %e, "Decision failed, accepting");
                Verdict::Accept
            }
        }
    }
}
