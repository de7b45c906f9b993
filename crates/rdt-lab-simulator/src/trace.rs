use rdt_lab_abstract::{ChannelConfig, SeqBit};
use rdt_lab_core::{ReceiverStats, SenderStats};
use serde::Serialize;

use crate::channel::LinkEventSummary;

#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub config: ChannelConfig,
    pub input: String,
    pub delivered: String,
    pub sender: SenderStats,
    pub receiver: ReceiverStats,
    pub sender_seq: SeqBit,
    pub receiver_seq: SeqBit,
    pub link_events: Vec<LinkEventSummary>,
}
