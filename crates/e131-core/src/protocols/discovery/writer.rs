use std::borrow::Cow;

use super::layout;
use super::packet::{DiscoveryPacket, UniverseList};
use crate::protocols::common::bytes::universes_to_bytes;
use crate::protocols::common::writer::PacketWriter;

/// Serialize a discovery packet; the length follows the list size.
pub fn write_discovery_packet(packet: &DiscoveryPacket) -> Vec<u8> {
    let list: Cow<'_, [u8]> = match &packet.list {
        UniverseList::Raw(bytes) => Cow::Borrowed(bytes),
        UniverseList::Entries(entries) => Cow::Owned(universes_to_bytes(entries)),
    };

    let mut writer = PacketWriter::with_len(layout::UNIVERSE_LIST_OFFSET + list.len());
    packet.header.write(&mut writer);

    writer.put_uint(layout::RESERVED, u64::from(packet.reserved));
    writer.put_uint(
        layout::DISCOVERY_FLAGS_LENGTH,
        u64::from(packet.discovery_flags_length),
    );
    writer.put_uint(layout::DISCOVERY_VECTOR, u64::from(layout::DISCOVERY_VECTOR_LIST));
    writer.put_uint(layout::PAGE, u64::from(packet.page));
    writer.put_uint(layout::LAST_PAGE, u64::from(packet.last_page));
    writer.put_tail(layout::UNIVERSE_LIST_OFFSET, &list);

    writer.finish()
}
