use crate::config::ChannelConfig;
use crate::packet::SeqBit;
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct TestScenario {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub config: ChannelConfigOverride,
    pub actions: Vec<TestAction>,
    #[serde(default)]
    pub assertions: Vec<TestAssertion>,
}

impl TestScenario {
    /// Outgoing payload units, in the order the `app_send` actions list them.
    pub fn outgoing_units(&self) -> Vec<char> {
        self.actions
            .iter()
            .filter_map(|action| match action {
                TestAction::AppSend { data } => Some(data.chars()),
                _ => None,
            })
            .flatten()
            .collect()
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct ChannelConfigOverride {
    pub corrupt_rate: Option<f64>,
    pub min_latency: Option<u64>,
    pub max_latency: Option<u64>,
    pub seed: Option<u64>,
    pub exchange_timeout_ms: Option<u64>,
}

impl ChannelConfigOverride {
    pub fn apply_to(&self, config: &mut ChannelConfig) {
        if let Some(v) = self.corrupt_rate {
            config.corrupt_rate = v;
        }
        if let Some(v) = self.min_latency {
            config.min_latency = v;
        }
        if let Some(v) = self.max_latency {
            config.max_latency = v;
        }
        if let Some(v) = self.seed {
            config.seed = v;
        }
        if let Some(v) = self.exchange_timeout_ms {
            config.exchange_timeout_ms = Some(v);
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TestAction {
    /// Application hands this text to the sender, one unit per character
    AppSend { data: String },
    /// Deterministically corrupt the first data packet sent with given sequence bit
    CorruptNextData { seq: SeqBit },
    /// Deterministically corrupt the first ACK sent by Receiver with given ack bit
    CorruptNextAck { ack: SeqBit },
    /// Hold back the first ACK with given ack bit for `ms` before it reaches the sender
    DelayNextAck { ack: SeqBit, ms: u64 },
}

#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TestAssertion {
    /// Assert that exactly this data was delivered to the application layer
    DataDelivered { data: String },
    /// Assert that the total number of packets sent by Sender is within range
    SenderPacketCount { min: u32, max: Option<u32> },
    /// Assert that the number of resends is within range
    RetransmissionCount { min: u32, max: Option<u32> },
    /// Assert that both ends finish expecting the same sequence bit
    SequencesAligned,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_only_touches_set_fields() {
        let mut config = ChannelConfig::default();
        let over = ChannelConfigOverride {
            corrupt_rate: Some(0.25),
            exchange_timeout_ms: Some(50),
            ..Default::default()
        };
        over.apply_to(&mut config);
        assert_eq!(config.corrupt_rate, 0.25);
        assert_eq!(config.exchange_timeout_ms, Some(50));
        assert_eq!(config.seed, 0);
        assert_eq!(config.max_latency, 0);
    }

    #[test]
    fn outgoing_units_concatenate_app_sends() {
        let scenario = TestScenario {
            name: "t".into(),
            description: String::new(),
            config: ChannelConfigOverride::default(),
            actions: vec![
                TestAction::AppSend { data: "AB".into() },
                TestAction::CorruptNextAck { ack: SeqBit::Zero },
                TestAction::AppSend { data: "C".into() },
            ],
            assertions: Vec::new(),
        };
        assert_eq!(scenario.outgoing_units(), vec!['A', 'B', 'C']);
    }
}
