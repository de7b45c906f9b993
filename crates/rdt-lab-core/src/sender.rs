use crate::app::SenderProcess;
use crate::fault::{Fault, validate};
use rdt_lab_abstract::{AckPacket, AsyncChannel, Channel, DataPacket, SeqBit};
use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, Serialize)]
pub struct SenderStats {
    /// Units whose ack has been validated.
    pub units_sent: u32,
    /// Every packet handed to the channel, retransmissions included.
    pub packets_sent: u32,
    pub retransmissions: u32,
    pub corrupted_acks: u32,
    pub mismatched_acks: u32,
    pub timeouts: u32,
}

/// Sending end of the alternating-bit protocol.
///
/// The sender owns its channel; a harness gets it back with
/// [`RdtSender::into_channel`] once the session is over.
pub struct RdtSender<C> {
    sequence: SeqBit,
    channel: C,
    stats: SenderStats,
}

impl<C> RdtSender<C> {
    pub fn new(channel: C) -> Self {
        Self {
            sequence: SeqBit::Zero,
            channel,
            stats: SenderStats::default(),
        }
    }

    pub fn expected_seq(&self) -> SeqBit {
        self.sequence
    }

    pub fn stats(&self) -> &SenderStats {
        &self.stats
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    pub fn into_channel(self) -> C {
        self.channel
    }

    fn make_packet(&self, unit: char) -> DataPacket {
        let packet = DataPacket::new(self.sequence, unit);
        info!("--------------------------------------------");
        info!("Sender is sending: {}", packet);
        packet
    }

    fn check_reply(&self, reply: &AckPacket) -> Result<(), Fault> {
        info!("Sender expected seq number: {}", self.sequence);
        info!("Sender received: {}", reply);
        validate(reply, reply.ack_bit, self.sequence)
    }

    /// Bookkeeping for a failed exchange. The caller resends unconditionally.
    fn record_fault(&mut self, fault: Fault, packet: &DataPacket) {
        warn!("Sender: {}", fault);
        match fault {
            Fault::Corruption => self.stats.corrupted_acks += 1,
            Fault::SequenceMismatch { .. } => self.stats.mismatched_acks += 1,
            Fault::ExchangeTimeout(_) => self.stats.timeouts += 1,
        }
        self.stats.retransmissions += 1;
        info!("Sender is resending: {}", packet);
    }

    fn confirm(&mut self) {
        self.sequence = self.sequence.flip();
        self.stats.units_sent += 1;
    }
}

impl<C: Channel> RdtSender<C> {
    /// Send every unit in order, blocking on each until its ack validates.
    ///
    /// There is no retry limit: the channel never drops, so a clean ack always
    /// arrives eventually.
    pub fn send(&mut self, units: &[char]) {
        for &unit in units {
            self.send_unit(unit);
        }
        info!("Sender done!");
    }

    pub fn send_app_data(&mut self, process: &SenderProcess) {
        self.send(process.get_outgoing());
    }

    fn send_unit(&mut self, unit: char) {
        let packet = self.make_packet(unit);
        loop {
            self.stats.packets_sent += 1;
            let reply = self.channel.exchange(packet);
            match self.check_reply(&reply) {
                Ok(()) => break,
                Err(fault) => self.record_fault(fault, &packet),
            }
        }
        self.confirm();
    }
}

impl<C: AsyncChannel> RdtSender<C> {
    /// Like [`RdtSender::send`], but every exchange is given `deadline` to
    /// produce a reply. A late reply is abandoned and counts as a failed
    /// exchange, answered by the same resend as a bad ack.
    pub async fn send_bounded(&mut self, units: &[char], deadline: Duration) {
        for &unit in units {
            self.send_unit_bounded(unit, deadline).await;
        }
        info!("Sender done!");
    }

    pub async fn send_app_data_bounded(&mut self, process: &SenderProcess, deadline: Duration) {
        self.send_bounded(process.get_outgoing(), deadline).await;
    }

    async fn send_unit_bounded(&mut self, unit: char, deadline: Duration) {
        let packet = self.make_packet(unit);
        loop {
            let outcome = self
                .exchange_bounded(packet, deadline)
                .await
                .and_then(|reply| self.check_reply(&reply));
            match outcome {
                Ok(()) => break,
                Err(fault) => self.record_fault(fault, &packet),
            }
        }
        self.confirm();
    }

    async fn exchange_bounded(
        &mut self,
        packet: DataPacket,
        deadline: Duration,
    ) -> Result<AckPacket, Fault> {
        self.stats.packets_sent += 1;
        tokio::time::timeout(deadline, self.channel.exchange_async(packet))
            .await
            .map_err(|_| Fault::ExchangeTimeout(deadline))
    }
}
