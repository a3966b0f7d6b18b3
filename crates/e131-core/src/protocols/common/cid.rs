use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use uuid::Uuid;

/// 16-byte component identifier of a transmitting source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cid(pub [u8; 16]);

/// CID used when packet options leave it unset.
pub const DEFAULT_CID: Cid = Cid(*b"e131 default cid");

impl Default for Cid {
    fn default() -> Self {
        DEFAULT_CID
    }
}

impl From<[u8; 16]> for Cid {
    fn from(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }
}

impl From<Uuid> for Cid {
    fn from(uuid: Uuid) -> Self {
        Self(uuid.into_bytes())
    }
}

impl AsRef<[u8]> for Cid {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// 32 lowercase hex digits, no separators.
impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Uuid::from_bytes(self.0).simple(), f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid CID '{input}': {source}")]
pub struct ParseCidError {
    input: String,
    #[source]
    source: uuid::Error,
}

impl FromStr for Cid {
    type Err = ParseCidError;

    /// Accepts any UUID text form: simple, hyphenated, braced or URN.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Cid::from)
            .map_err(|source| ParseCidError {
                input: s.to_string(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EOS: [u8; 16] = [
        0x6c, 0x80, 0x9c, 0x90, 0x6e, 0x77, 0x40, 0x19, 0xa9, 0x37, 0xda, 0xc2, 0xe8, 0x56, 0x42,
        0x52,
    ];

    #[test]
    fn display_is_lowercase_hex() {
        let cid = Cid([0xab; 16]);
        assert_eq!(cid.to_string(), "ab".repeat(16));
    }

    #[test]
    fn parses_every_uuid_form() {
        for text in [
            "6c809c90-6e77-4019-a937-dac2e8564252",
            "6c809c906e774019a937dac2e8564252",
            "{6c809c90-6e77-4019-a937-dac2e8564252}",
            "urn:uuid:6c809c90-6e77-4019-a937-dac2e8564252",
            "6C809C90-6E77-4019-A937-DAC2E8564252",
        ] {
            let cid: Cid = text.parse().unwrap();
            assert_eq!(cid, Cid(EOS), "{text}");
        }
        assert_eq!(Cid(EOS).to_string(), "6c809c906e774019a937dac2e8564252");
    }

    #[test]
    fn rejects_misplaced_dashes() {
        assert!("--------6c809c906e774019a937dac2e8564252--".parse::<Cid>().is_err());
        assert!(
            "6c-80-9c-90-6e-77-40-19-a9-37-da-c2-e8-56-42-52"
                .parse::<Cid>()
                .is_err()
        );
        assert!("6c809c906e77-4019a937-dac2e8564252".parse::<Cid>().is_err());
    }

    #[test]
    fn rejects_wrong_length_and_non_hex() {
        assert!("abcd".parse::<Cid>().is_err());
        assert!("zz".repeat(16).parse::<Cid>().is_err());
        let err = "abcd".parse::<Cid>().unwrap_err();
        assert!(err.to_string().starts_with("invalid CID 'abcd'"));
    }
}
