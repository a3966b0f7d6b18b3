use std::net::SocketAddr;

use super::error::ReceiverError;
use super::source::Source;
use crate::protocols::Packet;
use crate::protocols::common::error::PacketValidationError;

/// Notifications emitted by the receiver, in the order they happened.
///
/// For one datagram, `SourceDetected` precedes the matching `Packet`.
#[derive(Debug)]
pub enum ReceiverEvent {
    /// A datagram parsed as a data or discovery packet.
    Packet(Packet),
    /// First discovery datagram from an unseen CID and address.
    SourceDetected(Source),
    /// A source went silent; carries its last state.
    SourceTimeout(Source),
    /// A datagram failed validation. The source table is untouched.
    PacketCorrupted {
        from: SocketAddr,
        error: PacketValidationError,
    },
    /// Local socket failure.
    TransportError(ReceiverError),
}
