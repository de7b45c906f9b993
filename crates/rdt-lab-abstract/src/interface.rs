use crate::packet::{AckPacket, DataPacket};
use std::future::Future;

/// The unreliable channel between sender and receiver.
/// One call is one exchange: the data packet goes out, the receiver's reply comes back.
/// Implementations may corrupt any field but never drop or reorder packets.
pub trait Channel {
    fn exchange(&mut self, packet: DataPacket) -> AckPacket;
}

/// Asynchronous flavour of [`Channel`], used when the sender bounds each exchange
/// with a deadline. Dropping the returned future abandons the reply.
pub trait AsyncChannel {
    fn exchange_async(&mut self, packet: DataPacket) -> impl Future<Output = AckPacket>;
}
