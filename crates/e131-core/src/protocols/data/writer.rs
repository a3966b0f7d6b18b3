use std::borrow::Cow;

use super::layout;
use super::packet::{ChannelData, DataPacket};
use crate::protocols::common::bytes::channels_to_bytes;
use crate::protocols::common::writer::PacketWriter;

/// Serialize a data packet.
///
/// Locally built packets always emit 512 slots, each present channel as
/// `clamp_byte(level * 2.55)`; received packets re-emit their raw slots.
pub fn write_data_packet(packet: &DataPacket) -> Vec<u8> {
    let slots: Cow<'_, [u8]> = match &packet.channels {
        ChannelData::Raw(bytes) => Cow::Borrowed(bytes),
        ChannelData::Levels(levels) => Cow::Owned(channels_to_bytes(levels).to_vec()),
    };

    let mut writer = PacketWriter::with_len(layout::CHANNELS.offset + slots.len());
    packet.header.write(&mut writer);

    writer.put_uint(layout::PRIORITY, u64::from(packet.priority));
    writer.put_uint(layout::SYNC_UNIVERSE, u64::from(packet.sync_universe));
    writer.put_uint(layout::SEQUENCE, u64::from(packet.sequence));
    writer.put_uint(layout::OPTIONS, u64::from(packet.options));
    writer.put_uint(layout::UNIVERSE, u64::from(packet.universe));

    writer.put_uint(layout::DMP_FLAGS_LENGTH, u64::from(packet.dmp_flags_length));
    writer.put_uint(layout::DMP_VECTOR, u64::from(layout::DMP_VECTOR_SET_PROPERTY));
    writer.put_uint(layout::ADDRESS_TYPE, u64::from(layout::ADDRESS_TYPE_VALUE));
    writer.put_uint(layout::FIRST_ADDRESS, u64::from(layout::FIRST_ADDRESS_VALUE));
    writer.put_uint(
        layout::ADDRESS_INCREMENT,
        u64::from(layout::ADDRESS_INCREMENT_VALUE),
    );
    writer.put_uint(
        layout::PROPERTY_VALUE_COUNT,
        u64::from(packet.property_value_count),
    );
    writer.put_uint(layout::START_CODE, u64::from(layout::START_CODE_DMX));
    writer.put_tail(layout::CHANNELS.offset, &slots);

    writer.finish()
}
