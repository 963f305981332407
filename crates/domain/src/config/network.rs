use serde::{Deserialize, Serialize};

/// Kernel packet-queue settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkConfig {
    /// NFQUEUE queue number the iptables rule directs traffic to. Default: 0.
    #[serde(default)]
    pub queue_num: u16,

    /// Maximum number of packets the kernel keeps queued before it starts
    /// dropping (or accepting, with fail-open) new ones. Default: 255.
    #[serde(default = "default_queue_size")]
    pub queue_size: u32,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            queue_num: 0,
            queue_size: default_queue_size(),
        }
    }
}

fn default_queue_size() -> u32 {
    255
}
