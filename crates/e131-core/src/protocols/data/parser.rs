use std::net::IpAddr;

use super::layout;
use super::packet::{ChannelData, DataPacket};
use crate::protocols::common::error::PacketValidationError;
use crate::protocols::common::header::RootHeader;
use crate::protocols::common::layout::{FRAME_VECTOR_DATA, ROOT_VECTOR_DATA};
use crate::protocols::common::reader::PacketReader;

/// Parse and validate an E1.31 data packet.
///
/// Every fixed protocol field is checked; the first mismatch is returned as
/// a [`PacketValidationError`]. Channel bytes are kept raw so the packet
/// re-serializes byte for byte.
pub fn parse_data_packet(
    payload: &[u8],
    source_address: Option<IpAddr>,
) -> Result<DataPacket, PacketValidationError> {
    let reader = PacketReader::new(payload);
    reader.require_len(layout::MIN_LEN)?;

    let header = RootHeader::read(&reader, ROOT_VECTOR_DATA, FRAME_VECTOR_DATA)?;

    let value = reader.read_u8(layout::DMP_VECTOR)?;
    if value != layout::DMP_VECTOR_SET_PROPERTY {
        return Err(PacketValidationError::InvalidDmpVector { value });
    }
    let value = reader.read_u8(layout::ADDRESS_TYPE)?;
    if value != layout::ADDRESS_TYPE_VALUE {
        return Err(PacketValidationError::InvalidAddressType { value });
    }
    let value = reader.read_u16_be(layout::FIRST_ADDRESS)?;
    if value != layout::FIRST_ADDRESS_VALUE {
        return Err(PacketValidationError::InvalidFirstAddress { value });
    }
    let value = reader.read_u16_be(layout::ADDRESS_INCREMENT)?;
    if value != layout::ADDRESS_INCREMENT_VALUE {
        return Err(PacketValidationError::InvalidAddressIncrement { value });
    }
    let value = reader.read_u8(layout::START_CODE)?;
    if value != layout::START_CODE_DMX {
        return Err(PacketValidationError::InvalidStartCode { value });
    }

    Ok(DataPacket {
        header,
        priority: reader.read_u8(layout::PRIORITY)?,
        sync_universe: reader.read_u16_be(layout::SYNC_UNIVERSE)?,
        sequence: reader.read_u8(layout::SEQUENCE)?,
        options: reader.read_u8(layout::OPTIONS)?,
        universe: reader.read_u16_be(layout::UNIVERSE)?,
        dmp_flags_length: reader.read_u16_be(layout::DMP_FLAGS_LENGTH)?,
        property_value_count: reader.read_u16_be(layout::PROPERTY_VALUE_COUNT)?,
        channels: ChannelData::Raw(reader.read_tail(layout::CHANNELS.offset)?.to_vec()),
        source_address,
    })
}

impl DataPacket {
    /// See [`parse_data_packet`].
    pub fn parse(
        payload: &[u8],
        source_address: Option<IpAddr>,
    ) -> Result<Self, PacketValidationError> {
        parse_data_packet(payload, source_address)
    }
}
