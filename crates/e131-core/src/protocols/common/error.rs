use thiserror::Error;

/// A datagram that does not conform to the E1.31 wire format.
///
/// Other traffic on a shared multicast group produces these routinely;
/// callers should log and drop the datagram rather than stop.
///
/// # Examples
/// ```
/// use e131_core::PacketValidationError;
///
/// let err = PacketValidationError::InvalidStartCode { value: 1 };
/// assert!(err.to_string().contains("invalid start code"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PacketValidationError {
    #[error("payload too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
    #[error("invalid preamble size: {value:#06x}")]
    InvalidPreamble { value: u16 },
    #[error("invalid postamble size: {value:#06x}")]
    InvalidPostamble { value: u16 },
    #[error("invalid ACN PID")]
    InvalidAcnPid,
    #[error("invalid root vector: {value:#010x}")]
    InvalidRootVector { value: u32 },
    #[error("invalid framing vector: {value:#010x}")]
    InvalidFramingVector { value: u32 },
    #[error("invalid DMP vector: {value:#04x}")]
    InvalidDmpVector { value: u8 },
    #[error("invalid address/data type: {value:#04x}")]
    InvalidAddressType { value: u8 },
    #[error("invalid first property address: {value}")]
    InvalidFirstAddress { value: u16 },
    #[error("invalid address increment: {value}")]
    InvalidAddressIncrement { value: u16 },
    #[error("invalid start code: {value}")]
    InvalidStartCode { value: u8 },
    #[error("invalid universe discovery vector: {value:#010x}")]
    InvalidDiscoveryVector { value: u32 },
    #[error("universe list has odd length: {length} bytes")]
    OddUniverseList { length: usize },
}

/// Invalid options passed when building a packet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error("universe list has {count} entries, a page holds at most {max}; split it into pages")]
    ListTooLarge { count: usize, max: usize },
}
