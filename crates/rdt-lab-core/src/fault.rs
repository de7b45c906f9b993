use rdt_lab_abstract::{Checksummed, SeqBit, is_corrupted, is_expected_seq};
use std::time::Duration;
use thiserror::Error;

/// Everything that can go wrong on a single exchange.
///
/// None of these ever reach the caller of the protocol: each one is answered
/// with the same blind resend (sender) or re-acknowledgement (receiver).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Fault {
    #[error("incorrect checksum")]
    Corruption,
    #[error("incorrect sequence number (expected {expected}, got {got})")]
    SequenceMismatch { expected: SeqBit, got: SeqBit },
    #[error("no reply within {0:?}")]
    ExchangeTimeout(Duration),
}

/// Shared acceptance test for both ends: the packet must be intact and carry `expected`.
/// Corruption is checked first, so a corrupted packet never reports a mismatch.
pub fn validate<P: Checksummed>(packet: &P, seq: SeqBit, expected: SeqBit) -> Result<(), Fault> {
    if is_corrupted(packet) {
        return Err(Fault::Corruption);
    }
    if !is_expected_seq(seq, expected) {
        return Err(Fault::SequenceMismatch { expected, got: seq });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdt_lab_abstract::{AckPacket, DataPacket};

    #[test]
    fn intact_matching_packet_passes() {
        let pkt = DataPacket::new(SeqBit::One, 'x');
        assert_eq!(validate(&pkt, pkt.sequence_bit, SeqBit::One), Ok(()));
    }

    #[test]
    fn corruption_wins_over_mismatch() {
        let mut ack = AckPacket::new(SeqBit::Zero);
        ack.checksum += 1;
        assert_eq!(
            validate(&ack, ack.ack_bit, SeqBit::One),
            Err(Fault::Corruption)
        );
    }

    #[test]
    fn mismatch_reports_both_bits() {
        let ack = AckPacket::new(SeqBit::Zero);
        assert_eq!(
            validate(&ack, ack.ack_bit, SeqBit::One),
            Err(Fault::SequenceMismatch {
                expected: SeqBit::One,
                got: SeqBit::Zero
            })
        );
    }

    #[test]
    fn messages_are_readable() {
        let fault = Fault::SequenceMismatch {
            expected: SeqBit::One,
            got: SeqBit::Zero,
        };
        assert_eq!(
            fault.to_string(),
            "incorrect sequence number (expected 1, got 0)"
        );
        assert_eq!(Fault::Corruption.to_string(), "incorrect checksum");
    }
}
