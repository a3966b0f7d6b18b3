use super::bytes::{be_bytes, zero_run};
use super::layout::Field;

/// Zero-filled output buffer written field by field.
pub struct PacketWriter {
    buf: Vec<u8>,
}

impl PacketWriter {
    pub fn with_len(len: usize) -> Self {
        Self { buf: zero_run(len) }
    }

    pub fn put_uint(&mut self, field: Field, value: u64) {
        let bytes = be_bytes(field.bits(), value);
        self.buf[field.range()].copy_from_slice(&bytes);
    }

    /// Copy `bytes` into `field`, NUL-padding and truncating to its width.
    pub fn put_padded(&mut self, field: Field, bytes: &[u8]) {
        let len = bytes.len().min(field.width);
        let target = &mut self.buf[field.range()];
        target[..len].copy_from_slice(&bytes[..len]);
        target[len..].fill(0);
    }

    /// Copy `bytes` starting at `offset`.
    pub fn put_tail(&mut self, offset: usize, bytes: &[u8]) {
        self.buf[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}
