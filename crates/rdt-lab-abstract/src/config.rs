use serde::{Deserialize, Serialize};

/// Reply deadline used by the bounded-wait sender when none is configured.
pub const DEFAULT_EXCHANGE_TIMEOUT_MS: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Probability that a packet (in either direction) is corrupted.
    pub corrupt_rate: f64,
    /// Reply latency bounds in ms. Only the bounded-wait exchange waits on them.
    pub min_latency: u64,
    pub max_latency: u64,
    pub seed: u64,
    /// When set, the sender gives up on a reply after this many ms and resends.
    pub exchange_timeout_ms: Option<u64>,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            corrupt_rate: 0.0,
            min_latency: 0,
            max_latency: 0,
            seed: 0,
            exchange_timeout_ms: None,
        }
    }
}
