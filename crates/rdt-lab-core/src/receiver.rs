use crate::app::ReceiverProcess;
use crate::fault::{Fault, validate};
use rdt_lab_abstract::{AckPacket, DataPacket, SeqBit};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReceiverStats {
    pub packets_received: u32,
    pub corrupted_packets: u32,
    pub duplicate_packets: u32,
    pub delivered: u32,
}

/// Receiving end of the alternating-bit protocol.
#[derive(Debug, Default)]
pub struct RdtReceiver {
    sequence: SeqBit,
    process: ReceiverProcess,
    stats: ReceiverStats,
}

impl RdtReceiver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expected_seq(&self) -> SeqBit {
        self.sequence
    }

    pub fn process(&self) -> &ReceiverProcess {
        &self.process
    }

    pub fn delivered(&self) -> Vec<char> {
        self.process.get_delivered()
    }

    pub fn stats(&self) -> &ReceiverStats {
        &self.stats
    }

    /// Handle one packet from the channel and produce the reply.
    ///
    /// Any packet that fails validation is answered with the opposite of the
    /// expected bit, i.e. the last bit this side accepted. Corrupted packets and
    /// duplicates are deliberately treated the same way.
    pub fn receive(&mut self, packet: DataPacket) -> AckPacket {
        info!("Receiver expected seq number: {}", self.sequence);
        info!("Receiver received: {}", packet);
        self.stats.packets_received += 1;

        let reply = match validate(&packet, packet.sequence_bit, self.sequence) {
            Ok(()) => {
                let confirmed = self.sequence;
                self.sequence = self.sequence.flip();
                self.process.deliver_data(packet.payload);
                self.stats.delivered += 1;
                AckPacket::new(confirmed)
            }
            Err(fault) => {
                warn!("Receiver: {}", fault);
                match fault {
                    Fault::Corruption => self.stats.corrupted_packets += 1,
                    _ => self.stats.duplicate_packets += 1,
                }
                AckPacket::new(self.sequence.flip())
            }
        };

        info!("Receiver is sending: {}", reply);
        reply
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_in_order_and_flips() {
        let mut rx = RdtReceiver::new();
        let ack = rx.receive(DataPacket::new(SeqBit::Zero, 'A'));
        assert_eq!(ack, AckPacket::new(SeqBit::Zero));
        assert_eq!(rx.expected_seq(), SeqBit::One);

        let ack = rx.receive(DataPacket::new(SeqBit::One, 'B'));
        assert_eq!(ack, AckPacket::new(SeqBit::One));
        assert_eq!(rx.expected_seq(), SeqBit::Zero);
        assert_eq!(rx.delivered(), vec!['A', 'B']);
    }

    #[test]
    fn duplicate_gets_previous_ack_without_redelivery() {
        let mut rx = RdtReceiver::new();
        let pkt = DataPacket::new(SeqBit::Zero, 'A');
        let first = rx.receive(pkt);
        let second = rx.receive(pkt);

        assert_eq!(first, AckPacket::new(SeqBit::Zero));
        assert_eq!(second, AckPacket::new(SeqBit::Zero));
        assert_eq!(rx.delivered(), vec!['A']);
        assert_eq!(rx.expected_seq(), SeqBit::One);
        assert_eq!(rx.stats().duplicate_packets, 1);
    }

    #[test]
    fn corrupted_packet_is_not_delivered() {
        let mut rx = RdtReceiver::new();
        let mut pkt = DataPacket::new(SeqBit::Zero, 'A');
        pkt.checksum = !pkt.checksum;

        let ack = rx.receive(pkt);
        // Nothing accepted yet, so the "previous" bit is the opposite of Zero.
        assert_eq!(ack, AckPacket::new(SeqBit::One));
        assert_eq!(rx.expected_seq(), SeqBit::Zero);
        assert!(rx.process().is_empty());
        assert_eq!(rx.stats().corrupted_packets, 1);
    }

    #[test]
    fn fresh_receiver_re_acks_unexpected_seq() {
        let mut rx = RdtReceiver::new();
        let ack = rx.receive(DataPacket::new(SeqBit::One, 'A'));

        assert_eq!(ack, AckPacket::new(SeqBit::One));
        assert!(rx.process().is_empty());
        assert_eq!(rx.expected_seq(), SeqBit::Zero);
        assert_eq!(rx.stats().duplicate_packets, 1);
        assert_eq!(rx.stats().corrupted_packets, 0);
    }

    #[test]
    fn corrupted_payload_with_right_seq_is_rejected() {
        let mut rx = RdtReceiver::new();
        rx.receive(DataPacket::new(SeqBit::Zero, 'A'));

        let mut pkt = DataPacket::new(SeqBit::One, 'B');
        pkt.payload = 'C';
        let ack = rx.receive(pkt);

        assert_eq!(ack, AckPacket::new(SeqBit::Zero));
        assert_eq!(rx.delivered(), vec!['A']);
    }

    #[test]
    fn replies_are_always_intact() {
        let mut rx = RdtReceiver::new();
        let mut bad = DataPacket::new(SeqBit::One, 'q');
        bad.checksum = 0;
        for pkt in [DataPacket::new(SeqBit::Zero, 'p'), bad] {
            let ack = rx.receive(pkt);
            assert!(!rdt_lab_abstract::is_corrupted(&ack));
        }
    }
}
