use crate::protocols::common::layout::Field;

pub const RESERVED: Field = Field::new("reserved", 108, 4);
pub const DISCOVERY_FLAGS_LENGTH: Field = Field::new("discovery flags/length", 112, 2);
pub const DISCOVERY_VECTOR: Field = Field::new("discovery vector", 114, 4);
pub const PAGE: Field = Field::new("page", 118, 1);
pub const LAST_PAGE: Field = Field::new("last page", 119, 1);

/// Framing tail and universe discovery layer header, in wire order.
pub const DISCOVERY_LAYOUT: &[Field] = &[
    RESERVED,
    DISCOVERY_FLAGS_LENGTH,
    DISCOVERY_VECTOR,
    PAGE,
    LAST_PAGE,
];

/// Start of the variable-length list of 16-bit universe numbers.
pub const UNIVERSE_LIST_OFFSET: usize = LAST_PAGE.end();
pub const MIN_LEN: usize = UNIVERSE_LIST_OFFSET;

pub const DISCOVERY_VECTOR_LIST: u32 = 0x0000_0001;
pub const UNIVERSES_PER_PAGE: usize = 512;

/// Reserved universe whose multicast group carries discovery traffic.
pub const DISCOVERY_UNIVERSE: u16 = 64214;
/// Seconds between discovery announcements from a live source.
pub const DISCOVERY_INTERVAL_SECS: u64 = 10;

pub const fn packet_len(entries: usize) -> usize {
    UNIVERSE_LIST_OFFSET + entries * 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocols::common::layout::is_contiguous;

    #[test]
    fn discovery_layout_continues_root_layout() {
        assert!(is_contiguous(108, DISCOVERY_LAYOUT));
        assert_eq!(UNIVERSE_LIST_OFFSET, 120);
    }

    #[test]
    fn packet_len_grows_two_bytes_per_entry() {
        assert_eq!(packet_len(0), 120);
        assert_eq!(packet_len(512), 1144);
    }
}
