use std::collections::BTreeMap;
use std::net::IpAddr;
use std::time::SystemTime;

use tokio::time::Instant;

use crate::protocols::common::bytes::Payload;
use crate::protocols::common::cid::Cid;

/// Sources are tracked per CID and sender IP, so one CID seen from two
/// addresses is two sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceKey {
    pub cid: Cid,
    pub address: IpAddr,
}

/// A remote transmitter currently believed live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub cid: Cid,
    pub source_name: String,
    pub address: IpAddr,
    pub last_heard: SystemTime,
    /// Last page index announced by the most recent datagram.
    pub last_page: u8,
    /// Universe list per discovery page, keyed by absolute list position.
    pub pages: BTreeMap<u8, Payload>,
    pub(crate) expires_at: Instant,
}

impl Source {
    pub fn key(&self) -> SourceKey {
        SourceKey {
            cid: self.cid,
            address: self.address,
        }
    }

    /// When the source is dropped unless another datagram arrives.
    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    /// Every page from 0 to `last_page` has been received in this cycle.
    pub fn is_complete(&self) -> bool {
        (0..=self.last_page).all(|page| self.pages.contains_key(&page))
    }

    /// Flattened universe list, pages in ascending order.
    pub fn universes(&self) -> Vec<u16> {
        self.pages
            .values()
            .flat_map(|page| page.values().copied())
            .collect()
    }
}
