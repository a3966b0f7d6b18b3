//! E1.31 (streaming ACN) packet codecs and a universe discovery receiver.
//!
//! The crate is split the same way on both directions of the wire:
//! protocol modules describe each packet as a `layout` table of fields, a
//! `parser` that validates received bytes through a bounds-checked reader,
//! and a `writer` that fills a zeroed buffer from the same table. Parsing is
//! byte-oriented and side-effect free. All socket I/O lives in `receiver`.
//!
//! Invariants:
//! - Parsing a received datagram and serializing it again yields the same
//!   bytes.
//! - Validation failures are values, never panics, and never touch receiver
//!   state.
//! - Discovery sources expire 11 seconds after their last datagram.
//!
//! # Examples
//! ```
//! use e131_core::{DataOptions, DataPacket, Packet, Payload, parse_packet};
//!
//! let packet = DataPacket::new(DataOptions {
//!     universe: 1,
//!     payload: Payload::from([(1, 100)]),
//!     ..Default::default()
//! });
//! let Packet::Data(parsed) = parse_packet(&packet.to_bytes(), None)? else {
//!     unreachable!();
//! };
//! assert_eq!(parsed.slots()[0], 255);
//! # Ok::<(), e131_core::PacketValidationError>(())
//! ```

use std::collections::BTreeMap;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

mod config;
pub mod protocols;
pub mod receiver;

pub use config::{DEFAULT_PORT, ReceiverConfig};
pub use protocols::common::bytes::{
    DMX_MAX_SLOTS, LEVEL_SCALE, Payload, be_bytes, channels_from_bytes, channels_to_bytes,
    clamp_byte, truncate_utf8, universes_from_bytes, universes_to_bytes, zero_run,
};
pub use protocols::common::cid::{Cid, DEFAULT_CID, ParseCidError};
pub use protocols::common::error::{PacketValidationError, UsageError};
pub use protocols::data::{ChannelData, DEFAULT_SOURCE_NAME, DataOptions, DataPacket};
pub use protocols::discovery::layout::{DISCOVERY_INTERVAL_SECS, DISCOVERY_UNIVERSE};
pub use protocols::discovery::{DiscoveryOptions, DiscoveryPacket, UniverseList, discovery_pages};
pub use protocols::{Packet, parse_packet};
pub use receiver::transport::multicast_group;
pub use receiver::{
    DiscoveryReceiver, EventReceiver, ReceiverError, ReceiverEvent, SOURCE_TIMEOUT, Source,
    SourceKey, SourceTable,
};

/// JSON view of a decoded packet, tagged by `kind`.
///
/// # Examples
/// ```
/// use e131_core::{DiscoveryOptions, DiscoveryPacket, Packet, PacketReport, Payload};
///
/// let packet = DiscoveryPacket::new(DiscoveryOptions {
///     universes: Payload::from([(1, 7)]),
///     ..Default::default()
/// })?;
/// let report = PacketReport::from(&Packet::Discovery(packet));
/// let json = serde_json::to_value(&report).unwrap();
/// assert_eq!(json["kind"], "discovery");
/// assert_eq!(json["universes"][0], 7);
/// # Ok::<(), e131_core::UsageError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PacketReport {
    Data(DataReport),
    Discovery(DiscoveryReport),
}

/// Data packet fields, with non-zero slots as raw byte values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataReport {
    /// CID as 32 lowercase hex digits.
    pub cid: String,
    pub source_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_address: Option<IpAddr>,
    pub universe: u16,
    pub sequence: u8,
    pub priority: u8,
    pub sync_universe: u16,
    pub options: u8,
    pub preview: bool,
    pub stream_terminated: bool,
    pub property_value_count: u16,
    /// Slot number (1–512) to wire value; zero slots are omitted.
    pub slots: BTreeMap<u32, u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryReport {
    pub cid: String,
    pub source_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_address: Option<IpAddr>,
    pub page: u8,
    pub last_page: u8,
    pub universes: Vec<u16>,
}

/// JSON view of a tracked discovery source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceReport {
    pub cid: String,
    pub source_name: String,
    pub address: IpAddr,
    pub last_page: u8,
    /// All pages of the current announcement cycle have arrived.
    pub complete: bool,
    pub universes: Vec<u16>,
}

impl From<&DataPacket> for DataReport {
    fn from(packet: &DataPacket) -> Self {
        let slots = packet
            .slots()
            .iter()
            .zip(1u32..)
            .filter(|(value, _)| **value != 0)
            .map(|(value, slot)| (slot, *value))
            .collect();
        Self {
            cid: packet.cid().to_string(),
            source_name: packet.source_name().to_string(),
            source_address: packet.source_address(),
            universe: packet.universe(),
            sequence: packet.sequence(),
            priority: packet.priority(),
            sync_universe: packet.sync_universe(),
            options: packet.options(),
            preview: packet.is_preview(),
            stream_terminated: packet.is_stream_terminated(),
            property_value_count: packet.property_value_count(),
            slots,
        }
    }
}

impl From<&DiscoveryPacket> for DiscoveryReport {
    fn from(packet: &DiscoveryPacket) -> Self {
        Self {
            cid: packet.cid().to_string(),
            source_name: packet.source_name().to_string(),
            source_address: packet.source_address(),
            page: packet.page(),
            last_page: packet.last_page(),
            universes: packet.universes(),
        }
    }
}

impl From<&Packet> for PacketReport {
    fn from(packet: &Packet) -> Self {
        match packet {
            Packet::Data(data) => Self::Data(data.into()),
            Packet::Discovery(discovery) => Self::Discovery(discovery.into()),
        }
    }
}

impl From<&Source> for SourceReport {
    fn from(source: &Source) -> Self {
        Self {
            cid: source.cid.to_string(),
            source_name: source.source_name.clone(),
            address: source.address,
            last_page: source.last_page,
            complete: source.is_complete(),
            universes: source.universes(),
        }
    }
}
