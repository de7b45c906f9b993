use serde::{Deserialize, Serialize};
use std::fmt;

/// One-bit sequence number used by the alternating-bit protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum SeqBit {
    #[default]
    Zero,
    One,
}

impl SeqBit {
    pub fn flip(self) -> Self {
        match self {
            SeqBit::Zero => SeqBit::One,
            SeqBit::One => SeqBit::Zero,
        }
    }

    /// The character the bit is written as on the wire (`'0'` or `'1'`).
    pub fn symbol(self) -> char {
        match self {
            SeqBit::Zero => '0',
            SeqBit::One => '1',
        }
    }
}

impl From<SeqBit> for u8 {
    fn from(bit: SeqBit) -> Self {
        match bit {
            SeqBit::Zero => 0,
            SeqBit::One => 1,
        }
    }
}

impl TryFrom<u8> for SeqBit {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SeqBit::Zero),
            1 => Ok(SeqBit::One),
            other => Err(format!("sequence bit must be 0 or 1, got {other}")),
        }
    }
}

impl fmt::Display for SeqBit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Checksum of a single payload unit: its code point.
pub fn checksum(payload: char) -> u32 {
    payload as u32
}

/// Checksum of an acknowledgement, computed over the ack bit's symbol.
pub fn ack_checksum(bit: SeqBit) -> u32 {
    checksum(bit.symbol())
}

/// Anything carrying a stored checksum next to the content it covers.
pub trait Checksummed {
    /// Checksum as carried in the packet.
    fn stored_checksum(&self) -> u32;

    /// Checksum recomputed over the packet's content field.
    fn content_checksum(&self) -> u32;
}

pub fn is_corrupted<P: Checksummed + ?Sized>(packet: &P) -> bool {
    packet.stored_checksum() != packet.content_checksum()
}

pub fn is_expected_seq(seq: SeqBit, expected: SeqBit) -> bool {
    seq == expected
}

/// Sender -> receiver packet carrying one payload unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataPacket {
    pub sequence_bit: SeqBit,
    pub payload: char,
    pub checksum: u32,
}

impl DataPacket {
    /// Build a packet with a freshly computed checksum.
    pub fn new(sequence_bit: SeqBit, payload: char) -> Self {
        Self {
            sequence_bit,
            payload,
            checksum: checksum(payload),
        }
    }
}

impl Checksummed for DataPacket {
    fn stored_checksum(&self) -> u32 {
        self.checksum
    }

    fn content_checksum(&self) -> u32 {
        checksum(self.payload)
    }
}

impl fmt::Display for DataPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{sequence_number: {}, data: {:?}, checksum: {}}}",
            self.sequence_bit, self.payload, self.checksum
        )
    }
}

/// Receiver -> sender acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckPacket {
    pub ack_bit: SeqBit,
    pub checksum: u32,
}

impl AckPacket {
    pub fn new(ack_bit: SeqBit) -> Self {
        Self {
            ack_bit,
            checksum: ack_checksum(ack_bit),
        }
    }
}

impl Checksummed for AckPacket {
    fn stored_checksum(&self) -> u32 {
        self.checksum
    }

    fn content_checksum(&self) -> u32 {
        ack_checksum(self.ack_bit)
    }
}

impl fmt::Display for AckPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{ack: {}, checksum: {}}}", self.ack_bit, self.checksum)
    }
}
