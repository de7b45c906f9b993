//! Alternating-bit (RDT 2.2) sender and receiver state machines.

pub mod app;
pub mod fault;
pub mod receiver;
pub mod sender;

pub use app::{ReceiverProcess, SenderProcess};
pub use fault::Fault;
pub use receiver::{RdtReceiver, ReceiverStats};
pub use sender::{RdtSender, SenderStats};

pub use rdt_lab_abstract::{AckPacket, AsyncChannel, Channel, DataPacket, SeqBit};
