pub mod config;
pub mod interface;
pub mod packet;
pub mod scenario;

pub use interface::{AsyncChannel, Channel};
pub use packet::{
    AckPacket, Checksummed, DataPacket, SeqBit, ack_checksum, checksum, is_corrupted,
    is_expected_seq,
};

pub use config::{ChannelConfig, DEFAULT_EXCHANGE_TIMEOUT_MS};
pub use scenario::{ChannelConfigOverride, TestAction, TestAssertion, TestScenario};
