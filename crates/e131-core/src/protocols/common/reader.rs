use super::error::PacketValidationError;
use super::layout::{self, Field};

/// Bounds-checked big-endian reads addressed by [`Field`].
pub struct PacketReader<'a> {
    payload: &'a [u8],
}

impl<'a> PacketReader<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self { payload }
    }

    pub fn require_len(&self, needed: usize) -> Result<(), PacketValidationError> {
        if self.payload.len() < needed {
            return Err(PacketValidationError::TooShort {
                needed,
                actual: self.payload.len(),
            });
        }
        Ok(())
    }

    pub fn read_u8(&self, field: Field) -> Result<u8, PacketValidationError> {
        let bytes = self.read_slice(field)?;
        Ok(bytes[0])
    }

    pub fn read_u16_be(&self, field: Field) -> Result<u16, PacketValidationError> {
        let bytes = self.read_slice(field)?;
        if bytes.len() != 2 {
            return Err(PacketValidationError::TooShort {
                needed: 2,
                actual: bytes.len(),
            });
        }
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_u32_be(&self, field: Field) -> Result<u32, PacketValidationError> {
        let bytes = self.read_slice(field)?;
        if bytes.len() != 4 {
            return Err(PacketValidationError::TooShort {
                needed: 4,
                actual: bytes.len(),
            });
        }
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_slice(&self, field: Field) -> Result<&'a [u8], PacketValidationError> {
        self.payload
            .get(field.range())
            .ok_or(PacketValidationError::TooShort {
                needed: field.end(),
                actual: self.payload.len(),
            })
    }

    /// Everything from `offset` to the end of the datagram.
    pub fn read_tail(&self, offset: usize) -> Result<&'a [u8], PacketValidationError> {
        self.payload
            .get(offset..)
            .ok_or(PacketValidationError::TooShort {
                needed: offset,
                actual: self.payload.len(),
            })
    }

    pub fn read_ascii_string(&self, field: Field) -> Result<String, PacketValidationError> {
        let bytes = self.read_slice(field)?;
        let raw = String::from_utf8_lossy(bytes);
        Ok(raw.trim_end_matches('\0').to_string())
    }

    pub fn read_cid(&self) -> Result<[u8; 16], PacketValidationError> {
        let bytes = self.read_slice(layout::CID)?;
        let mut cid = [0u8; 16];
        cid.copy_from_slice(bytes);
        Ok(cid)
    }

    /// Validate the preamble, postamble and ACN packet identifier.
    pub fn check_root_preamble(&self) -> Result<(), PacketValidationError> {
        let preamble = self.read_u16_be(layout::PREAMBLE_SIZE)?;
        if preamble != layout::PREAMBLE_SIZE_VALUE {
            return Err(PacketValidationError::InvalidPreamble { value: preamble });
        }
        let postamble = self.read_u16_be(layout::POSTAMBLE_SIZE)?;
        if postamble != layout::POSTAMBLE_SIZE_VALUE {
            return Err(PacketValidationError::InvalidPostamble { value: postamble });
        }
        let acn_pid = self.read_slice(layout::ACN_PID)?;
        if acn_pid != layout::ACN_PID_VALUE {
            return Err(PacketValidationError::InvalidAcnPid);
        }
        Ok(())
    }
}
