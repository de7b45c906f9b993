use anyhow::{Result, ensure};
use rdt_lab_abstract::ChannelConfig;
use rdt_lab_core::{RdtSender, SenderProcess};
use std::time::Duration;
use tracing::info;

use crate::channel::SimChannel;
use crate::trace::SessionReport;

/// One sender talking to one receiver over a simulated channel.
pub struct Session {
    process: SenderProcess,
    sender: RdtSender<SimChannel>,
    finished: bool,
}

impl Session {
    pub fn new(config: ChannelConfig, process: SenderProcess) -> Result<Self> {
        Ok(Self {
            process,
            sender: RdtSender::new(SimChannel::new(config)?),
            finished: false,
        })
    }

    /// Channel access, e.g. to register deterministic faults before running.
    pub fn channel_mut(&mut self) -> &mut SimChannel {
        self.sender.channel_mut()
    }

    pub fn channel(&self) -> &SimChannel {
        self.sender.channel()
    }

    pub fn sender(&self) -> &RdtSender<SimChannel> {
        &self.sender
    }

    /// A session sends its buffer once; a second run would deliver it again.
    fn start(&mut self) -> Result<()> {
        ensure!(
            !self.finished,
            "Session already ran; build a new one to send again"
        );
        self.finished = true;
        Ok(())
    }

    /// Synchronous stop-and-wait run over the whole outgoing buffer.
    pub fn run(&mut self) -> Result<()> {
        self.start()?;
        info!(
            "Starting session: {} units",
            self.process.get_outgoing().len()
        );
        self.sender.send_app_data(&self.process);
        Ok(())
    }

    /// Run with every exchange bounded by `deadline`.
    pub async fn run_bounded(&mut self, deadline: Duration) -> Result<()> {
        self.start()?;
        info!(
            "Starting bounded session: {} units, reply deadline {:?}",
            self.process.get_outgoing().len(),
            deadline
        );
        self.sender
            .send_app_data_bounded(&self.process, deadline)
            .await;
        Ok(())
    }

    /// Pick the variant the channel config asks for.
    pub async fn run_configured(&mut self) -> Result<()> {
        let timeout = self.channel().config().exchange_timeout_ms;
        match timeout {
            Some(ms) => self.run_bounded(Duration::from_millis(ms)).await,
            None => self.run(),
        }
    }

    pub fn export_report(&self) -> SessionReport {
        let channel = self.sender.channel();
        let receiver = channel.receiver();
        SessionReport {
            config: channel.config().clone(),
            input: self.process.get_outgoing().iter().collect(),
            delivered: receiver.delivered().into_iter().collect(),
            sender: self.sender.stats().clone(),
            receiver: receiver.stats().clone(),
            sender_seq: self.sender.expected_seq(),
            receiver_seq: receiver.expected_seq(),
            link_events: channel.link_events().to_vec(),
        }
    }
}
