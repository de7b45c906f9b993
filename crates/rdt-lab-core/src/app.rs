//! Application-layer endpoints on either side of the protocol.
//!
//! Both are plain owned buffers. The sender side is filled by the harness and read
//! by [`crate::RdtSender`]; the receiver side is written only by
//! [`crate::RdtReceiver`] and handed out to readers as a copy.

use tracing::debug;

/// Outgoing message of the sending process.
#[derive(Debug, Clone, Default)]
pub struct SenderProcess {
    buffer: Vec<char>,
}

impl SenderProcess {
    pub fn new(units: impl IntoIterator<Item = char>) -> Self {
        Self {
            buffer: units.into_iter().collect(),
        }
    }

    pub fn set_outgoing(&mut self, units: impl IntoIterator<Item = char>) {
        self.buffer = units.into_iter().collect();
    }

    pub fn get_outgoing(&self) -> &[char] {
        &self.buffer
    }
}

/// Everything the receiving process has been handed so far. Append-only.
#[derive(Debug, Clone, Default)]
pub struct ReceiverProcess {
    buffer: Vec<char>,
}

impl ReceiverProcess {
    pub(crate) fn deliver_data(&mut self, unit: char) {
        self.buffer.push(unit);
        debug!("Receiver process buffer: {:?}", self.buffer);
    }

    /// Snapshot of the delivered units, in delivery order.
    pub fn get_delivered(&self) -> Vec<char> {
        self.buffer.clone()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}
