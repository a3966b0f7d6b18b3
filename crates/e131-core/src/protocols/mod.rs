//! Protocol codecs.
//!
//! Each packet kind follows the same layered structure:
//! - `layout`: field offsets and protocol constants (source of truth)
//! - `parser`: validation and decoding through `common::reader`
//! - `writer`: encoding through `common::writer`
//! - `packet`: the immutable packet value and its build options
//!
//! Parsers and writers are pure and contain no I/O; the receiver owns the
//! socket.

use std::net::IpAddr;

pub mod common;
pub mod data;
pub mod discovery;

use common::error::PacketValidationError;
use common::layout::{ROOT_VECTOR, ROOT_VECTOR_DATA};
use common::reader::PacketReader;
use data::DataPacket;
use discovery::DiscoveryPacket;

/// Any packet the receiver understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    Data(DataPacket),
    Discovery(DiscoveryPacket),
}

impl Packet {
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Packet::Data(packet) => packet.to_bytes(),
            Packet::Discovery(packet) => packet.to_bytes(),
        }
    }

    pub fn source_address(&self) -> Option<IpAddr> {
        match self {
            Packet::Data(packet) => packet.source_address(),
            Packet::Discovery(packet) => packet.source_address(),
        }
    }
}

/// Parse a datagram as whichever packet kind its root vector names.
///
/// Anything that is not a DATA packet is handed to the discovery parser,
/// which reports the mismatch when it is not a discovery packet either.
pub fn parse_packet(
    payload: &[u8],
    source_address: Option<IpAddr>,
) -> Result<Packet, PacketValidationError> {
    let reader = PacketReader::new(payload);
    let root_vector = reader.read_u32_be(ROOT_VECTOR)?;
    if root_vector == ROOT_VECTOR_DATA {
        data::parse_data_packet(payload, source_address).map(Packet::Data)
    } else {
        discovery::parse_discovery_packet(payload, source_address).map(Packet::Discovery)
    }
}

#[cfg(test)]
mod tests {
    use super::{Packet, parse_packet};
    use crate::protocols::common::bytes::Payload;
    use crate::protocols::common::error::PacketValidationError;
    use crate::protocols::data::{DataOptions, DataPacket};
    use crate::protocols::discovery::{DiscoveryOptions, DiscoveryPacket};

    #[test]
    fn dispatches_on_root_vector() {
        let data = DataPacket::new(DataOptions {
            universe: 1,
            ..Default::default()
        })
        .to_bytes();
        let discovery = DiscoveryPacket::new(DiscoveryOptions {
            universes: Payload::from([(1, 1)]),
            ..Default::default()
        })
        .unwrap()
        .to_bytes();

        assert!(matches!(parse_packet(&data, None), Ok(Packet::Data(_))));
        assert!(matches!(
            parse_packet(&discovery, None),
            Ok(Packet::Discovery(_))
        ));
    }

    #[test]
    fn unknown_root_vector_is_a_validation_error() {
        let mut bytes = DataPacket::new(DataOptions::default()).to_bytes();
        bytes[21] = 0x09;
        assert_eq!(
            parse_packet(&bytes, None).unwrap_err(),
            PacketValidationError::InvalidRootVector { value: 9 }
        );
    }

    #[test]
    fn tiny_datagram_is_too_short() {
        assert!(matches!(
            parse_packet(&[0x00, 0x10], None),
            Err(PacketValidationError::TooShort { .. })
        ));
    }
}
