use crate::protocols::common::bytes::DMX_MAX_SLOTS;
use crate::protocols::common::header::flags_length;
use crate::protocols::common::layout::Field;

pub const PRIORITY: Field = Field::new("priority", 108, 1);
pub const SYNC_UNIVERSE: Field = Field::new("sync universe", 109, 2);
pub const SEQUENCE: Field = Field::new("sequence", 111, 1);
pub const OPTIONS: Field = Field::new("options", 112, 1);
pub const UNIVERSE: Field = Field::new("universe", 113, 2);
pub const DMP_FLAGS_LENGTH: Field = Field::new("DMP flags/length", 115, 2);
pub const DMP_VECTOR: Field = Field::new("DMP vector", 117, 1);
pub const ADDRESS_TYPE: Field = Field::new("address/data type", 118, 1);
pub const FIRST_ADDRESS: Field = Field::new("first property address", 119, 2);
pub const ADDRESS_INCREMENT: Field = Field::new("address increment", 121, 2);
pub const PROPERTY_VALUE_COUNT: Field = Field::new("property value count", 123, 2);
pub const START_CODE: Field = Field::new("start code", 125, 1);
pub const CHANNELS: Field = Field::new("DMX channels", 126, DMX_MAX_SLOTS);

/// Framing tail and DMP layer of a data packet, in wire order.
pub const DATA_LAYOUT: &[Field] = &[
    PRIORITY,
    SYNC_UNIVERSE,
    SEQUENCE,
    OPTIONS,
    UNIVERSE,
    DMP_FLAGS_LENGTH,
    DMP_VECTOR,
    ADDRESS_TYPE,
    FIRST_ADDRESS,
    ADDRESS_INCREMENT,
    PROPERTY_VALUE_COUNT,
    START_CODE,
    CHANNELS,
];

pub const DMP_VECTOR_SET_PROPERTY: u8 = 0x02;
pub const ADDRESS_TYPE_VALUE: u8 = 0xa1;
pub const FIRST_ADDRESS_VALUE: u16 = 0x0000;
pub const ADDRESS_INCREMENT_VALUE: u16 = 0x0001;
pub const START_CODE_DMX: u8 = 0x00;

/// Start code slot plus every channel, so unset channels read as zero
/// rather than as a shortened frame.
pub const PROPERTY_VALUE_COUNT_FULL: u16 = 1 + DMX_MAX_SLOTS as u16;

pub const PACKET_LEN: usize = CHANNELS.end();
pub const MIN_LEN: usize = CHANNELS.offset;
pub const DMP_FLAGS_LENGTH_FULL: u16 = flags_length(PACKET_LEN - DMP_FLAGS_LENGTH.offset);

pub const DEFAULT_PRIORITY: u8 = 100;

pub const OPTION_PREVIEW_DATA: u8 = 0x80;
pub const OPTION_STREAM_TERMINATED: u8 = 0x40;
pub const OPTION_FORCE_SYNCHRONIZATION: u8 = 0x20;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocols::common::layout::{ROOT_LAYOUT, is_contiguous};

    #[test]
    fn data_layout_continues_root_layout() {
        assert!(is_contiguous(0, ROOT_LAYOUT));
        assert!(is_contiguous(108, DATA_LAYOUT));
        assert_eq!(PACKET_LEN, 638);
    }

    #[test]
    fn fixed_lengths_match_wire_constants() {
        assert_eq!(DMP_FLAGS_LENGTH_FULL, 0x720b);
        assert_eq!(PROPERTY_VALUE_COUNT_FULL, 0x0201);
    }
}
