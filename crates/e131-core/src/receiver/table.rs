//! Source bookkeeping driven by datagrams and a caller-supplied clock.
//!
//! The table never reads the time itself. The receiver task passes
//! `Instant::now()` in; tests pass synthetic instants.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, SystemTime};

use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::event::ReceiverEvent;
use super::source::{Source, SourceKey};
use crate::protocols::discovery::DiscoveryPacket;
use crate::protocols::discovery::layout::DISCOVERY_INTERVAL_SECS;
use crate::protocols::{Packet, parse_packet};

/// One second of grace on top of the discovery interval.
pub const SOURCE_TIMEOUT: Duration = Duration::from_secs(DISCOVERY_INTERVAL_SECS + 1);

#[derive(Debug)]
pub struct SourceTable {
    sources: HashMap<SourceKey, Source>,
    timeout: Duration,
}

impl Default for SourceTable {
    fn default() -> Self {
        Self::with_timeout(SOURCE_TIMEOUT)
    }
}

impl SourceTable {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            sources: HashMap::new(),
            timeout,
        }
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn get(&self, key: &SourceKey) -> Option<&Source> {
        self.sources.get(key)
    }

    /// Parse one datagram and update the table.
    ///
    /// Malformed datagrams produce a single `PacketCorrupted` event and leave
    /// the table as it was.
    pub fn ingest(
        &mut self,
        datagram: &[u8],
        from: SocketAddr,
        now: Instant,
        heard_at: SystemTime,
    ) -> Vec<ReceiverEvent> {
        let packet = match parse_packet(datagram, Some(from.ip())) {
            Ok(packet) => packet,
            Err(error) => {
                warn!(%from, %error, len = datagram.len(), "dropping malformed datagram");
                return vec![ReceiverEvent::PacketCorrupted { from, error }];
            }
        };

        let mut events = Vec::with_capacity(2);
        if let Packet::Discovery(discovery) = &packet {
            if let Some(source) = self.track(discovery, from.ip(), now, heard_at) {
                events.push(ReceiverEvent::SourceDetected(source));
            }
        }
        events.push(ReceiverEvent::Packet(packet));
        events
    }

    /// Record a discovery page. Returns the new source on first sight.
    ///
    /// Page 0 starts a new announcement cycle and discards earlier pages;
    /// any other page is merged in.
    pub fn track(
        &mut self,
        packet: &DiscoveryPacket,
        address: IpAddr,
        now: Instant,
        heard_at: SystemTime,
    ) -> Option<Source> {
        let key = SourceKey {
            cid: packet.cid(),
            address,
        };
        let expires_at = now + self.timeout;

        match self.sources.entry(key) {
            Entry::Occupied(mut entry) => {
                let source = entry.get_mut();
                source.source_name = packet.source_name().to_string();
                source.last_heard = heard_at;
                source.last_page = packet.last_page();
                source.expires_at = expires_at;
                if packet.page() == 0 {
                    source.pages.clear();
                }
                source.pages.insert(packet.page(), packet.list());
                debug!(
                    cid = %key.cid,
                    %address,
                    page = packet.page(),
                    last_page = packet.last_page(),
                    "discovery page updated"
                );
                None
            }
            Entry::Vacant(entry) => {
                let source = Source {
                    cid: key.cid,
                    source_name: packet.source_name().to_string(),
                    address,
                    last_heard: heard_at,
                    last_page: packet.last_page(),
                    pages: BTreeMap::from([(packet.page(), packet.list())]),
                    expires_at,
                };
                info!(
                    cid = %key.cid,
                    %address,
                    name = %source.source_name,
                    "source detected"
                );
                Some(entry.insert(source).clone())
            }
        }
    }

    /// Remove every source whose deadline is at or before `now`.
    pub fn expire(&mut self, now: Instant) -> Vec<ReceiverEvent> {
        let mut expired: Vec<SourceKey> = self
            .sources
            .iter()
            .filter(|(_, source)| source.expires_at <= now)
            .map(|(key, _)| *key)
            .collect();
        expired.sort();

        expired
            .into_iter()
            .filter_map(|key| self.sources.remove(&key))
            .map(|source| {
                info!(cid = %source.cid, address = %source.address, "source timed out");
                ReceiverEvent::SourceTimeout(source)
            })
            .collect()
    }

    /// Earliest pending source deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.sources.values().map(|source| source.expires_at).min()
    }

    /// Copy of every live source, ordered by CID then address.
    pub fn snapshot(&self) -> Vec<Source> {
        let mut sources: Vec<Source> = self.sources.values().cloned().collect();
        sources.sort_by_key(Source::key);
        sources
    }
}
