use std::net::IpAddr;

use super::layout;
use crate::protocols::common::bytes::{
    DMX_MAX_SLOTS, Payload, channels_from_bytes, channels_to_bytes,
};
use crate::protocols::common::cid::Cid;
use crate::protocols::common::header::RootHeader;
use crate::protocols::common::layout::{FRAME_VECTOR_DATA, ROOT_VECTOR_DATA};

/// Default source name for packets built from options.
pub const DEFAULT_SOURCE_NAME: &str = "sACN nodejs";

/// Channel storage: raw wire slots for received packets, sparse 0–100
/// levels for packets built locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelData {
    Raw(Vec<u8>),
    Levels(Payload),
}

/// Options for building a [`DataPacket`].
#[derive(Debug, Clone, Default)]
pub struct DataOptions {
    pub universe: u16,
    pub sequence: u8,
    /// Channel number (1–512) to level (0–100).
    pub payload: Payload,
    pub source_name: Option<String>,
    pub priority: Option<u8>,
    pub cid: Option<Cid>,
}

/// An E1.31 DMX data packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPacket {
    pub(crate) header: RootHeader,
    pub(crate) priority: u8,
    pub(crate) sync_universe: u16,
    pub(crate) sequence: u8,
    pub(crate) options: u8,
    pub(crate) universe: u16,
    pub(crate) dmp_flags_length: u16,
    pub(crate) property_value_count: u16,
    pub(crate) channels: ChannelData,
    pub(crate) source_address: Option<IpAddr>,
}

impl DataPacket {
    /// Build a packet for sending. Unset options fall back to the default
    /// CID, `"sACN nodejs"` and priority 100.
    ///
    /// # Examples
    /// ```
    /// use e131_core::{DataOptions, DataPacket, Payload};
    ///
    /// let packet = DataPacket::new(DataOptions {
    ///     universe: 1,
    ///     sequence: 0,
    ///     payload: Payload::from([(1, 100)]),
    ///     ..Default::default()
    /// });
    /// assert_eq!(packet.to_bytes()[126], 255);
    /// ```
    pub fn new(options: DataOptions) -> Self {
        let source_name = options.source_name.as_deref().unwrap_or(DEFAULT_SOURCE_NAME);
        Self {
            header: RootHeader::new(
                ROOT_VECTOR_DATA,
                FRAME_VECTOR_DATA,
                options.cid.unwrap_or_default(),
                source_name,
                layout::PACKET_LEN,
            ),
            priority: options.priority.unwrap_or(layout::DEFAULT_PRIORITY),
            sync_universe: 0,
            sequence: options.sequence,
            options: 0,
            universe: options.universe,
            dmp_flags_length: layout::DMP_FLAGS_LENGTH_FULL,
            property_value_count: layout::PROPERTY_VALUE_COUNT_FULL,
            channels: ChannelData::Levels(options.payload),
            source_address: None,
        }
    }

    pub fn cid(&self) -> Cid {
        self.header.cid
    }

    pub fn source_name(&self) -> &str {
        &self.header.source_name
    }

    pub fn priority(&self) -> u8 {
        self.priority
    }

    pub fn sync_universe(&self) -> u16 {
        self.sync_universe
    }

    pub fn sequence(&self) -> u8 {
        self.sequence
    }

    pub fn options(&self) -> u8 {
        self.options
    }

    pub fn is_preview(&self) -> bool {
        self.options & layout::OPTION_PREVIEW_DATA != 0
    }

    pub fn is_stream_terminated(&self) -> bool {
        self.options & layout::OPTION_STREAM_TERMINATED != 0
    }

    pub fn is_force_synchronization(&self) -> bool {
        self.options & layout::OPTION_FORCE_SYNCHRONIZATION != 0
    }

    pub fn universe(&self) -> u16 {
        self.universe
    }

    pub fn property_value_count(&self) -> u16 {
        self.property_value_count
    }

    /// Address the packet was received from; `None` for local packets.
    pub fn source_address(&self) -> Option<IpAddr> {
        self.source_address
    }

    pub fn channel_data(&self) -> &ChannelData {
        &self.channels
    }

    /// Sparse channel view.
    ///
    /// Received packets yield raw wire bytes (0–255) for non-zero slots;
    /// locally built packets return the 0–100 levels they were given.
    pub fn payload(&self) -> Payload {
        match &self.channels {
            ChannelData::Raw(bytes) => channels_from_bytes(bytes),
            ChannelData::Levels(levels) => levels.clone(),
        }
    }

    /// Raw channel bytes as received, `None` for locally built packets.
    pub fn payload_bytes(&self) -> Option<&[u8]> {
        match &self.channels {
            ChannelData::Raw(bytes) => Some(bytes),
            ChannelData::Levels(_) => None,
        }
    }

    /// The 512 channel slots as they appear on the wire.
    pub fn slots(&self) -> [u8; DMX_MAX_SLOTS] {
        match &self.channels {
            ChannelData::Raw(bytes) => {
                let mut slots = [0u8; DMX_MAX_SLOTS];
                let len = bytes.len().min(slots.len());
                slots[..len].copy_from_slice(&bytes[..len]);
                slots
            }
            ChannelData::Levels(levels) => channels_to_bytes(levels),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        super::writer::write_data_packet(self)
    }
}
