use std::net::IpAddr;

use super::layout;
use crate::protocols::common::bytes::{Payload, universes_from_bytes};
use crate::protocols::common::cid::Cid;
use crate::protocols::common::error::UsageError;
use crate::protocols::common::header::{RootHeader, flags_length};
use crate::protocols::common::layout::{FRAME_VECTOR_EXTENDED_DISCOVERY, ROOT_VECTOR_EXTENDED};
use crate::protocols::data::DEFAULT_SOURCE_NAME;

/// Universe list storage: raw wire entries for received packets, a keyed
/// payload for packets built locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UniverseList {
    Raw(Vec<u8>),
    Entries(Payload),
}

/// Options for building a [`DiscoveryPacket`].
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions {
    /// List position to universe number; at most 512 entries.
    pub universes: Payload,
    pub page: u8,
    pub last_page: u8,
    pub source_name: Option<String>,
    pub cid: Option<Cid>,
}

/// An E1.31 universe discovery packet: one page of a source's universe list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryPacket {
    pub(crate) header: RootHeader,
    pub(crate) reserved: u32,
    pub(crate) discovery_flags_length: u16,
    pub(crate) page: u8,
    pub(crate) last_page: u8,
    pub(crate) list: UniverseList,
    pub(crate) source_address: Option<IpAddr>,
}

impl DiscoveryPacket {
    /// Build one page for sending.
    ///
    /// # Errors
    /// Returns [`UsageError::ListTooLarge`] when `universes` holds more than
    /// 512 entries; use [`discovery_pages`] to split longer lists.
    ///
    /// # Examples
    /// ```
    /// use e131_core::{DiscoveryOptions, DiscoveryPacket, Payload};
    ///
    /// let packet = DiscoveryPacket::new(DiscoveryOptions {
    ///     universes: Payload::from([(1, 1), (2, 100)]),
    ///     ..Default::default()
    /// })?;
    /// assert_eq!(packet.to_bytes().len(), 124);
    /// # Ok::<(), e131_core::UsageError>(())
    /// ```
    pub fn new(options: DiscoveryOptions) -> Result<Self, UsageError> {
        let count = options.universes.len();
        if count > layout::UNIVERSES_PER_PAGE {
            return Err(UsageError::ListTooLarge {
                count,
                max: layout::UNIVERSES_PER_PAGE,
            });
        }
        Ok(Self::from_options(options))
    }

    fn from_options(options: DiscoveryOptions) -> Self {
        let packet_len = layout::packet_len(options.universes.len());
        let source_name = options.source_name.as_deref().unwrap_or(DEFAULT_SOURCE_NAME);
        Self {
            header: RootHeader::new(
                ROOT_VECTOR_EXTENDED,
                FRAME_VECTOR_EXTENDED_DISCOVERY,
                options.cid.unwrap_or_default(),
                source_name,
                packet_len,
            ),
            reserved: 0,
            discovery_flags_length: flags_length(
                packet_len - layout::DISCOVERY_FLAGS_LENGTH.offset,
            ),
            page: options.page,
            last_page: options.last_page,
            list: UniverseList::Entries(options.universes),
            source_address: None,
        }
    }

    pub fn cid(&self) -> Cid {
        self.header.cid
    }

    pub fn source_name(&self) -> &str {
        &self.header.source_name
    }

    pub fn page(&self) -> u8 {
        self.page
    }

    pub fn last_page(&self) -> u8 {
        self.last_page
    }

    /// Address the packet was received from; `None` for local packets.
    pub fn source_address(&self) -> Option<IpAddr> {
        self.source_address
    }

    pub fn universe_list(&self) -> &UniverseList {
        &self.list
    }

    /// Universe list keyed by absolute list position (`page * 512 + i + 1`
    /// for received packets).
    pub fn list(&self) -> Payload {
        match &self.list {
            UniverseList::Raw(bytes) => universes_from_bytes(bytes, self.first_key()),
            UniverseList::Entries(entries) => entries.clone(),
        }
    }

    /// Raw list bytes as received, `None` for locally built packets.
    pub fn list_bytes(&self) -> Option<&[u8]> {
        match &self.list {
            UniverseList::Raw(bytes) => Some(bytes),
            UniverseList::Entries(_) => None,
        }
    }

    /// Universe numbers on this page in list order.
    pub fn universes(&self) -> Vec<u16> {
        self.list().into_values().collect()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        super::writer::write_discovery_packet(self)
    }

    fn first_key(&self) -> u32 {
        u32::from(self.page) * layout::UNIVERSES_PER_PAGE as u32 + 1
    }
}

/// Split a universe list into discovery pages of at most 512 entries.
///
/// Universes are sorted and de-duplicated first, as receivers expect an
/// ascending list. An empty input still yields a single empty page.
pub fn discovery_pages(
    universes: &[u16],
    source_name: Option<&str>,
    cid: Option<Cid>,
) -> Vec<DiscoveryPacket> {
    let mut sorted = universes.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let pages: Vec<&[u16]> = if sorted.is_empty() {
        vec![&sorted[..]]
    } else {
        sorted.chunks(layout::UNIVERSES_PER_PAGE).collect()
    };
    let last_page = (pages.len() - 1) as u8;

    pages
        .iter()
        .enumerate()
        .map(|(page, chunk)| {
            let first_key = page as u32 * layout::UNIVERSES_PER_PAGE as u32 + 1;
            let entries = chunk.iter().copied().zip(first_key..).map(|(u, k)| (k, u));
            DiscoveryPacket::from_options(DiscoveryOptions {
                universes: entries.collect(),
                page: page as u8,
                last_page,
                source_name: source_name.map(str::to_string),
                cid,
            })
        })
        .collect()
}
