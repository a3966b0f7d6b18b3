//! E1.31 universe discovery packets (root vector EXTENDED, framing vector
//! EXTENDED_DISCOVERY, discovery vector LIST).
//!
//! A source announces the universes it transmits every ten seconds, split
//! into pages of up to 512 entries. Unlike data packets the wire length
//! varies with the list size, so the three flags/length words are computed
//! from the entry count when building.

pub mod layout;
pub mod packet;
pub mod parser;
pub mod writer;

pub use packet::{DiscoveryOptions, DiscoveryPacket, UniverseList, discovery_pages};
pub use parser::parse_discovery_packet;
