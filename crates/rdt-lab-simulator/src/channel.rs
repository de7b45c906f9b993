use anyhow::{Result, ensure};
use rand::{Rng, SeedableRng};
use rdt_lab_abstract::{AckPacket, AsyncChannel, Channel, ChannelConfig, DataPacket, SeqBit};
use rdt_lab_core::RdtReceiver;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Reject configurations under which a session could never finish.
pub fn validate_config(config: &ChannelConfig) -> Result<()> {
    ensure!(
        (0.0..1.0).contains(&config.corrupt_rate),
        "corrupt_rate must be in [0, 1), got {}",
        config.corrupt_rate
    );
    ensure!(
        config.min_latency <= config.max_latency,
        "min_latency ({}) exceeds max_latency ({})",
        config.min_latency,
        config.max_latency
    );
    if let Some(timeout) = config.exchange_timeout_ms {
        ensure!(
            timeout > config.min_latency,
            "exchange timeout ({timeout} ms) must exceed min_latency ({} ms)",
            config.min_latency
        );
    }
    Ok(())
}

/// A compact textual summary of important link-layer events for the trace.
#[derive(Debug, Clone, Serialize)]
pub struct LinkEventSummary {
    /// 1-based index of the exchange the event belongs to.
    pub exchange: u64,
    pub description: String,
}

/// Simulated unreliable link with the receiver sitting at its far end.
///
/// Packets are never lost or reordered. Either direction may be corrupted,
/// randomly (seeded) or through one-shot faults registered up front.
pub struct SimChannel {
    config: ChannelConfig,
    rng: rand::rngs::StdRng,
    receiver: RdtReceiver,
    exchange_count: u64,

    // Deterministic fault injection: each entry fires once, on the first match
    corrupt_data_once: Vec<SeqBit>,
    corrupt_ack_once: Vec<SeqBit>,
    delay_ack_once: Vec<(SeqBit, u64)>,

    link_events: Vec<LinkEventSummary>,
}

impl SimChannel {
    pub fn new(config: ChannelConfig) -> Result<Self> {
        validate_config(&config)?;
        let rng = rand::rngs::StdRng::seed_from_u64(config.seed);
        Ok(Self {
            config,
            rng,
            receiver: RdtReceiver::new(),
            exchange_count: 0,
            corrupt_data_once: Vec::new(),
            corrupt_ack_once: Vec::new(),
            delay_ack_once: Vec::new(),
            link_events: Vec::new(),
        })
    }

    /// Register a deterministic fault: corrupt the first data packet carrying `seq`.
    pub fn add_corrupt_data_once(&mut self, seq: SeqBit) {
        self.corrupt_data_once.push(seq);
    }

    /// Register a deterministic fault: corrupt the first ACK carrying `ack`.
    pub fn add_corrupt_ack_once(&mut self, ack: SeqBit) {
        self.corrupt_ack_once.push(ack);
    }

    /// Register a deterministic fault: hold the first ACK carrying `ack` back for `ms`.
    pub fn add_delay_ack_once(&mut self, ack: SeqBit, ms: u64) {
        self.delay_ack_once.push((ack, ms));
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    pub fn receiver(&self) -> &RdtReceiver {
        &self.receiver
    }

    pub fn exchange_count(&self) -> u64 {
        self.exchange_count
    }

    pub fn link_events(&self) -> &[LinkEventSummary] {
        &self.link_events
    }

    fn log_event(&mut self, description: String) {
        self.link_events.push(LinkEventSummary {
            exchange: self.exchange_count,
            description,
        });
    }

    fn take_once<T: Copy>(faults: &mut Vec<T>, matches: impl Fn(&T) -> bool) -> Option<T> {
        let pos = faults.iter().position(matches)?;
        Some(faults.remove(pos))
    }

    fn roll_corruption(&mut self) -> bool {
        self.rng.random::<f64>() < self.config.corrupt_rate
    }

    fn corrupt_data(&mut self, packet: &mut DataPacket) {
        let flipped = char::from_u32(packet.payload as u32 ^ 1);
        match flipped {
            Some(payload) if self.rng.random_bool(0.5) => packet.payload = payload,
            _ => packet.checksum = !packet.checksum,
        }
    }

    fn corrupt_ack(&mut self, ack: &mut AckPacket) {
        if self.rng.random_bool(0.5) {
            ack.ack_bit = ack.ack_bit.flip();
        } else {
            ack.checksum = !ack.checksum;
        }
    }

    /// Run one exchange and return the (possibly corrupted) reply together with
    /// any deterministic extra delay registered for it.
    fn transmit(&mut self, mut packet: DataPacket) -> (AckPacket, u64) {
        self.exchange_count += 1;
        self.log_event(format!("[Sender->Receiver] SEND {}", packet));

        // 1. Sender -> Receiver corruption
        let bit = packet.sequence_bit;
        if Self::take_once(&mut self.corrupt_data_once, |s| *s == bit).is_some() {
            self.log_event(format!("[Sender->Receiver] CORRUPT (deterministic seq) seq={bit}"));
            debug!("Deterministically corrupting sender packet with seq={}", bit);
            packet.checksum = !packet.checksum;
        } else if self.roll_corruption() {
            self.corrupt_data(&mut packet);
            self.log_event(format!("[Sender->Receiver] CORRUPT (random) now {}", packet));
            debug!("Data packet corrupted in channel");
        }

        // 2. Receiver
        let mut reply = self.receiver.receive(packet);
        self.log_event(format!("[Receiver->Sender] SEND {}", reply));

        // 3. Receiver -> Sender corruption
        let ack = reply.ack_bit;
        if Self::take_once(&mut self.corrupt_ack_once, |a| *a == ack).is_some() {
            self.log_event(format!("[Receiver->Sender] CORRUPT (deterministic ack) ack={ack}"));
            debug!("Deterministically corrupting receiver ACK with ack={}", ack);
            reply.checksum = !reply.checksum;
        } else if self.roll_corruption() {
            self.corrupt_ack(&mut reply);
            self.log_event(format!("[Receiver->Sender] CORRUPT (random) now {}", reply));
            debug!("ACK corrupted in channel");
        }

        // 4. Deterministic hold-back; random latency is only drawn by the async exchange
        let mut extra_delay = 0;
        if let Some((_, ms)) = Self::take_once(&mut self.delay_ack_once, |(a, _)| *a == ack) {
            self.log_event(format!("[Receiver->Sender] DELAY (deterministic ack) ack={ack} +{ms}ms"));
            extra_delay = ms;
        }

        (reply, extra_delay)
    }

    fn draw_latency(&mut self) -> u64 {
        self.rng
            .random_range(self.config.min_latency..=self.config.max_latency)
    }
}

impl Channel for SimChannel {
    /// Synchronous exchange: no latency is drawn or waited on.
    fn exchange(&mut self, packet: DataPacket) -> AckPacket {
        self.transmit(packet).0
    }
}

impl AsyncChannel for SimChannel {
    async fn exchange_async(&mut self, packet: DataPacket) -> AckPacket {
        let (reply, extra_delay) = self.transmit(packet);
        let latency = self.draw_latency().saturating_add(extra_delay);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        reply
    }
}
