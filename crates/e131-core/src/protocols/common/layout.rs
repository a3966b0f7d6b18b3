//! Root and framing layer layout shared by every E1.31 packet kind.
//!
//! Offsets are declared once as [`Field`] values; readers and writers take a
//! `Field` instead of raw ranges so both directions use the same table.

use std::ops::Range;

/// A named, fixed-offset region of a packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub offset: usize,
    pub width: usize,
}

impl Field {
    pub const fn new(name: &'static str, offset: usize, width: usize) -> Self {
        Self {
            name,
            offset,
            width,
        }
    }

    pub const fn end(&self) -> usize {
        self.offset + self.width
    }

    pub const fn range(&self) -> Range<usize> {
        self.offset..self.end()
    }

    pub const fn bits(&self) -> u32 {
        (self.width * 8) as u32
    }
}

pub const PREAMBLE_SIZE: Field = Field::new("preamble size", 0, 2);
pub const POSTAMBLE_SIZE: Field = Field::new("postamble size", 2, 2);
pub const ACN_PID: Field = Field::new("ACN packet identifier", 4, 12);
pub const ROOT_FLAGS_LENGTH: Field = Field::new("root flags/length", 16, 2);
pub const ROOT_VECTOR: Field = Field::new("root vector", 18, 4);
pub const CID: Field = Field::new("CID", 22, 16);
pub const FRAME_FLAGS_LENGTH: Field = Field::new("frame flags/length", 38, 2);
pub const FRAME_VECTOR: Field = Field::new("frame vector", 40, 4);
pub const SOURCE_NAME: Field = Field::new("source name", 44, 64);

/// Fields common to data and discovery packets, in wire order.
pub const ROOT_LAYOUT: &[Field] = &[
    PREAMBLE_SIZE,
    POSTAMBLE_SIZE,
    ACN_PID,
    ROOT_FLAGS_LENGTH,
    ROOT_VECTOR,
    CID,
    FRAME_FLAGS_LENGTH,
    FRAME_VECTOR,
    SOURCE_NAME,
];

pub const ACN_PID_VALUE: &[u8; 12] = b"ASC-E1.17\0\0\0";
pub const PREAMBLE_SIZE_VALUE: u16 = 0x0010;
pub const POSTAMBLE_SIZE_VALUE: u16 = 0x0000;

pub const ROOT_VECTOR_DATA: u32 = 0x0000_0004;
pub const ROOT_VECTOR_EXTENDED: u32 = 0x0000_0008;
pub const FRAME_VECTOR_DATA: u32 = 0x0000_0002;
pub const FRAME_VECTOR_EXTENDED_DISCOVERY: u32 = 0x0000_0002;

/// High nibble of every flags/length word.
pub const FLAGS: u16 = 0x7000;
/// Source names are NUL-terminated inside a 64 byte field.
pub const SOURCE_NAME_MAX_LEN: usize = SOURCE_NAME.width - 1;

/// Check that `fields` tile the packet from `start` without gaps or overlaps.
pub fn is_contiguous(start: usize, fields: &[Field]) -> bool {
    let mut cursor = start;
    for field in fields {
        if field.offset != cursor || field.width == 0 {
            return false;
        }
        cursor = field.end();
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_layout_is_contiguous() {
        assert!(is_contiguous(0, ROOT_LAYOUT));
        assert_eq!(SOURCE_NAME.end(), 108);
    }

    #[test]
    fn gaps_are_detected() {
        let fields = [PREAMBLE_SIZE, ACN_PID];
        assert!(!is_contiguous(0, &fields));
    }

    #[test]
    fn field_bits_follow_width() {
        assert_eq!(ROOT_VECTOR.bits(), 32);
        assert_eq!(ROOT_VECTOR.range(), 18..22);
    }
}
