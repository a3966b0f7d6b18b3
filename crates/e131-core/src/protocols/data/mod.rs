//! E1.31 data packets (root vector DATA, framing vector DATA, DMP set
//! property).
//!
//! Received packets keep their channel slots and flags/length words as
//! they arrived so `to_bytes` reproduces the datagram exactly. Packets
//! built from [`DataOptions`] hold sparse 0–100 levels and are encoded as
//! a fixed 638 byte frame with a property value count of 513.

pub mod layout;
pub mod packet;
pub mod parser;
pub mod writer;

pub use packet::{ChannelData, DEFAULT_SOURCE_NAME, DataOptions, DataPacket};
pub use parser::parse_data_packet;
