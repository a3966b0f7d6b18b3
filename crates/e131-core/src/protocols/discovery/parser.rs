use std::net::IpAddr;

use super::layout;
use super::packet::{DiscoveryPacket, UniverseList};
use crate::protocols::common::error::PacketValidationError;
use crate::protocols::common::header::RootHeader;
use crate::protocols::common::layout::{FRAME_VECTOR_EXTENDED_DISCOVERY, ROOT_VECTOR_EXTENDED};
use crate::protocols::common::reader::PacketReader;

/// Parse and validate an E1.31 universe discovery packet.
///
/// The universe list runs from offset 120 to the end of the datagram and
/// must hold whole 16-bit entries.
pub fn parse_discovery_packet(
    payload: &[u8],
    source_address: Option<IpAddr>,
) -> Result<DiscoveryPacket, PacketValidationError> {
    let reader = PacketReader::new(payload);
    reader.require_len(layout::MIN_LEN)?;

    let header = RootHeader::read(&reader, ROOT_VECTOR_EXTENDED, FRAME_VECTOR_EXTENDED_DISCOVERY)?;

    let value = reader.read_u32_be(layout::DISCOVERY_VECTOR)?;
    if value != layout::DISCOVERY_VECTOR_LIST {
        return Err(PacketValidationError::InvalidDiscoveryVector { value });
    }

    let list = reader.read_tail(layout::UNIVERSE_LIST_OFFSET)?;
    if list.len() % 2 != 0 {
        return Err(PacketValidationError::OddUniverseList { length: list.len() });
    }

    Ok(DiscoveryPacket {
        header,
        reserved: reader.read_u32_be(layout::RESERVED)?,
        discovery_flags_length: reader.read_u16_be(layout::DISCOVERY_FLAGS_LENGTH)?,
        page: reader.read_u8(layout::PAGE)?,
        last_page: reader.read_u8(layout::LAST_PAGE)?,
        list: UniverseList::Raw(list.to_vec()),
        source_address,
    })
}

impl DiscoveryPacket {
    /// See [`parse_discovery_packet`].
    pub fn parse(
        payload: &[u8],
        source_address: Option<IpAddr>,
    ) -> Result<Self, PacketValidationError> {
        parse_discovery_packet(payload, source_address)
    }
}

#[cfg(test)]
mod tests {
    use super::parse_discovery_packet;
    use crate::protocols::common::bytes::Payload;
    use crate::protocols::common::error::PacketValidationError;
    use crate::protocols::common::layout as root;
    use crate::protocols::discovery::layout;
    use crate::protocols::discovery::packet::{DiscoveryOptions, DiscoveryPacket};

    fn sample_bytes(page: u8) -> Vec<u8> {
        DiscoveryPacket::new(DiscoveryOptions {
            universes: Payload::from([(1, 3), (2, 4)]),
            page,
            last_page: 2,
            ..Default::default()
        })
        .unwrap()
        .to_bytes()
    }

    #[test]
    fn parse_keys_entries_by_page() {
        let packet = parse_discovery_packet(&sample_bytes(1), None).unwrap();
        assert_eq!(packet.page(), 1);
        assert_eq!(packet.last_page(), 2);
        assert_eq!(packet.list(), Payload::from([(513, 3), (514, 4)]));
        assert_eq!(packet.list_bytes(), Some(&[0, 3, 0, 4][..]));
    }

    #[test]
    fn parse_short_payload() {
        let err = parse_discovery_packet(&[0u8; layout::MIN_LEN - 1], None).unwrap_err();
        assert!(err.to_string().contains("payload too short"));
    }

    #[test]
    fn parse_rejects_data_root_vector() {
        let mut bytes = sample_bytes(0);
        bytes[root::ROOT_VECTOR.end() - 1] = 0x04;
        let err = parse_discovery_packet(&bytes, None).unwrap_err();
        assert_eq!(err, PacketValidationError::InvalidRootVector { value: 4 });
    }

    #[test]
    fn parse_rejects_wrong_framing_vector() {
        let mut bytes = sample_bytes(0);
        bytes[root::FRAME_VECTOR.end() - 1] = 0x01;
        let err = parse_discovery_packet(&bytes, None).unwrap_err();
        assert_eq!(err, PacketValidationError::InvalidFramingVector { value: 1 });
    }

    #[test]
    fn parse_rejects_wrong_discovery_vector() {
        let mut bytes = sample_bytes(0);
        bytes[layout::DISCOVERY_VECTOR.end() - 1] = 0x02;
        let err = parse_discovery_packet(&bytes, None).unwrap_err();
        assert_eq!(err, PacketValidationError::InvalidDiscoveryVector { value: 2 });
    }

    #[test]
    fn parse_rejects_half_entries() {
        let mut bytes = sample_bytes(0);
        bytes.push(0x01);
        let err = parse_discovery_packet(&bytes, None).unwrap_err();
        assert_eq!(err, PacketValidationError::OddUniverseList { length: 5 });
    }
}
