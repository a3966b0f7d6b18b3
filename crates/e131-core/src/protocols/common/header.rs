use super::bytes::truncate_utf8;
use super::cid::Cid;
use super::error::PacketValidationError;
use super::layout;
use super::reader::PacketReader;
use super::writer::PacketWriter;

/// Root and framing layer fields shared by data and discovery packets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootHeader {
    pub root_flags_length: u16,
    pub root_vector: u32,
    pub cid: Cid,
    pub frame_flags_length: u16,
    pub frame_vector: u32,
    pub source_name: String,
    /// Name field exactly as received. Written back verbatim so bytes that
    /// are not valid UTF-8 survive a round trip.
    pub raw_source_name: Option<[u8; layout::SOURCE_NAME.width]>,
}

impl RootHeader {
    /// Source names longer than the field allows are cut to 63 bytes.
    pub fn new(
        root_vector: u32,
        frame_vector: u32,
        cid: Cid,
        source_name: &str,
        packet_len: usize,
    ) -> Self {
        Self {
            root_flags_length: flags_length(packet_len - layout::ROOT_FLAGS_LENGTH.offset),
            root_vector,
            cid,
            frame_flags_length: flags_length(packet_len - layout::FRAME_FLAGS_LENGTH.offset),
            frame_vector,
            source_name: truncate_utf8(source_name, layout::SOURCE_NAME_MAX_LEN).to_string(),
            raw_source_name: None,
        }
    }

    pub fn read(
        reader: &PacketReader<'_>,
        root_vector: u32,
        frame_vector: u32,
    ) -> Result<Self, PacketValidationError> {
        reader.check_root_preamble()?;

        let value = reader.read_u32_be(layout::ROOT_VECTOR)?;
        if value != root_vector {
            return Err(PacketValidationError::InvalidRootVector { value });
        }
        let value = reader.read_u32_be(layout::FRAME_VECTOR)?;
        if value != frame_vector {
            return Err(PacketValidationError::InvalidFramingVector { value });
        }

        let mut raw_source_name = [0u8; layout::SOURCE_NAME.width];
        raw_source_name.copy_from_slice(reader.read_slice(layout::SOURCE_NAME)?);

        Ok(Self {
            root_flags_length: reader.read_u16_be(layout::ROOT_FLAGS_LENGTH)?,
            root_vector,
            cid: Cid(reader.read_cid()?),
            frame_flags_length: reader.read_u16_be(layout::FRAME_FLAGS_LENGTH)?,
            frame_vector,
            source_name: reader.read_ascii_string(layout::SOURCE_NAME)?,
            raw_source_name: Some(raw_source_name),
        })
    }

    pub fn write(&self, writer: &mut PacketWriter) {
        writer.put_uint(layout::PREAMBLE_SIZE, u64::from(layout::PREAMBLE_SIZE_VALUE));
        writer.put_uint(layout::POSTAMBLE_SIZE, u64::from(layout::POSTAMBLE_SIZE_VALUE));
        writer.put_padded(layout::ACN_PID, layout::ACN_PID_VALUE);
        writer.put_uint(layout::ROOT_FLAGS_LENGTH, u64::from(self.root_flags_length));
        writer.put_uint(layout::ROOT_VECTOR, u64::from(self.root_vector));
        writer.put_padded(layout::CID, self.cid.as_ref());
        writer.put_uint(layout::FRAME_FLAGS_LENGTH, u64::from(self.frame_flags_length));
        writer.put_uint(layout::FRAME_VECTOR, u64::from(self.frame_vector));
        match &self.raw_source_name {
            Some(raw) => writer.put_padded(layout::SOURCE_NAME, raw),
            None => writer.put_padded(layout::SOURCE_NAME, self.source_name.as_bytes()),
        }
    }
}

/// PDU flags/length word for a layer of `len` bytes.
pub const fn flags_length(len: usize) -> u16 {
    layout::FLAGS | (len as u16 & 0x0fff)
}
