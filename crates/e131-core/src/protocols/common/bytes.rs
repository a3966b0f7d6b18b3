//! Byte-level helpers shared by the packet writers and the payload views.

use std::collections::BTreeMap;

/// Sparse 1-based mapping used for DMX levels and universe lists.
///
/// A missing key is not the same as a key present with value 0; the wire
/// format cannot tell them apart, the map can.
pub type Payload = BTreeMap<u32, u16>;

pub const DMX_MAX_SLOTS: usize = 512;

/// Multiplier from a 0–100 level to a wire byte.
pub const LEVEL_SCALE: f64 = 2.55;

/// Render `value` as `bit_width / 8` big-endian bytes, truncating high bits.
///
/// # Panics
/// Panics when `bit_width` is not a multiple of 8 between 8 and 64.
///
/// # Examples
/// ```
/// use e131_core::be_bytes;
///
/// assert_eq!(be_bytes(16, 0x0010), vec![0x00, 0x10]);
/// assert_eq!(be_bytes(32, 4), vec![0, 0, 0, 4]);
/// ```
pub fn be_bytes(bit_width: u32, value: u64) -> Vec<u8> {
    assert!(
        bit_width % 8 == 0 && (8..=64).contains(&bit_width),
        "bit width must be a multiple of 8 in 8..=64, got {bit_width}"
    );
    let width = (bit_width / 8) as usize;
    value.to_be_bytes()[8 - width..].to_vec()
}

/// `len` zero bytes, used to reserve space a later pass fills in.
pub fn zero_run(len: usize) -> Vec<u8> {
    vec![0u8; len]
}

/// Round to the nearest integer and clamp into a byte.
///
/// # Examples
/// ```
/// use e131_core::clamp_byte;
///
/// assert_eq!(clamp_byte(100.0 * 2.55), 255);
/// assert_eq!(clamp_byte(-3.0), 0);
/// ```
pub fn clamp_byte(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 255.0) as u8
}

/// Cut `name` to at most `max_len` bytes without splitting a character.
pub fn truncate_utf8(name: &str, max_len: usize) -> &str {
    if name.len() <= max_len {
        return name;
    }
    let mut end = max_len;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    &name[..end]
}

/// Dense DMX slots to a sparse payload. Zero slots are omitted.
pub fn channels_from_bytes(slots: &[u8]) -> Payload {
    slots
        .iter()
        .take(DMX_MAX_SLOTS)
        .enumerate()
        .filter(|(_, value)| **value != 0)
        .map(|(index, value)| (index as u32 + 1, u16::from(*value)))
        .collect()
}

/// Sparse 0–100 levels to the 512 wire slots.
///
/// Keys outside 1..=512 are ignored.
pub fn channels_to_bytes(levels: &Payload) -> [u8; DMX_MAX_SLOTS] {
    let mut slots = [0u8; DMX_MAX_SLOTS];
    for (&channel, &level) in levels {
        if (1..=DMX_MAX_SLOTS as u32).contains(&channel) {
            slots[channel as usize - 1] = clamp_byte(f64::from(level) * LEVEL_SCALE);
        }
    }
    slots
}

/// Big-endian 16-bit entries to a payload keyed from `first_key` upward.
///
/// A trailing odd byte is ignored; parsers reject such lists before
/// calling this.
pub fn universes_from_bytes(bytes: &[u8], first_key: u32) -> Payload {
    bytes
        .chunks_exact(2)
        .zip(first_key..)
        .map(|(pair, key)| (key, u16::from_be_bytes([pair[0], pair[1]])))
        .collect()
}

/// Universe values in ascending key order, two bytes each.
pub fn universes_to_bytes(universes: &Payload) -> Vec<u8> {
    let mut out = Vec::with_capacity(universes.len() * 2);
    for &universe in universes.values() {
        out.extend(be_bytes(16, u64::from(universe)));
    }
    out
}
