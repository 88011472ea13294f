//! Container superblock: signature, version, flags and body extent.

use byteorder::{ByteOrder, LittleEndian};

use crate::checksum::lookup3;
use crate::error::FormatError;

/// The 8-byte container magic signature.
pub const SIGNATURE: [u8; 8] = [0x89, b'U', b'H', b'S', b'\r', b'\n', 0x1A, b'\n'];

/// Current superblock version. Version 2 widened the dataset rank to u32.
pub const VERSION: u8 = 2;

/// Encoded superblock size in bytes.
pub const SUPERBLOCK_SIZE: usize = 32;

/// Superblock and body carry lookup3 checksums.
pub const FLAG_CHECKSUM: u8 = 0x01;
/// At least one dataset payload is deflate-compressed.
pub const FLAG_DEFLATE: u8 = 0x02;

/// Parsed container superblock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Superblock {
    /// Superblock version.
    pub version: u8,
    /// Flag bits (`FLAG_*`).
    pub flags: u8,
    /// Number of node records in the body, root included.
    pub node_count: u64,
    /// Length of the body in bytes, excluding the trailing checksum.
    pub body_len: u64,
}

pub(crate) fn ensure_len(data: &[u8], needed: usize) -> Result<(), FormatError> {
    if data.len() < needed {
        Err(FormatError::UnexpectedEof {
            expected: needed,
            available: data.len(),
        })
    } else {
        Ok(())
    }
}

impl Superblock {
    pub fn has_checksum(&self) -> bool {
        self.flags & FLAG_CHECKSUM != 0
    }

    /// Encode to exactly [`SUPERBLOCK_SIZE`] bytes.
    pub fn encode(&self) -> [u8; SUPERBLOCK_SIZE] {
        let mut out = [0u8; SUPERBLOCK_SIZE];
        out[..8].copy_from_slice(&SIGNATURE);
        out[8] = self.version;
        out[9] = self.flags;
        // out[10..12] reserved
        LittleEndian::write_u64(&mut out[12..20], self.node_count);
        LittleEndian::write_u64(&mut out[20..28], self.body_len);
        if self.has_checksum() {
            let sum = lookup3(&out[..28]);
            LittleEndian::write_u32(&mut out[28..32], sum);
        }
        out
    }

    /// Parse the superblock at the start of `data`.
    pub fn parse(data: &[u8], verify_checksum: bool) -> Result<Superblock, FormatError> {
        if data.len() < 8 || data[..8] != SIGNATURE {
            return Err(FormatError::SignatureNotFound);
        }
        ensure_len(data, SUPERBLOCK_SIZE)?;

        let version = data[8];
        if version != VERSION {
            return Err(FormatError::UnsupportedVersion(version));
        }

        let sb = Superblock {
            version,
            flags: data[9],
            node_count: LittleEndian::read_u64(&data[12..20]),
            body_len: LittleEndian::read_u64(&data[20..28]),
        };

        if verify_checksum && sb.has_checksum() {
            let expected = LittleEndian::read_u32(&data[28..32]);
            let computed = lookup3(&data[..28]);
            if expected != computed {
                return Err(FormatError::ChecksumMismatch { expected, computed });
            }
        }
        Ok(sb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Superblock {
        Superblock {
            version: VERSION,
            flags: FLAG_CHECKSUM,
            node_count: 7,
            body_len: 1234,
        }
    }

    #[test]
    fn encode_then_parse() {
        let bytes = sample().encode();
        assert_eq!(Superblock::parse(&bytes, true).unwrap(), sample());
    }

    #[test]
    fn bad_signature() {
        let mut bytes = sample().encode();
        bytes[1] = b'X';
        assert!(matches!(
            Superblock::parse(&bytes, true),
            Err(FormatError::SignatureNotFound)
        ));
    }

    #[test]
    fn truncated() {
        let bytes = sample().encode();
        assert!(matches!(
            Superblock::parse(&bytes[..20], true),
            Err(FormatError::UnexpectedEof {
                expected: 32,
                available: 20
            })
        ));
    }

    #[test]
    fn future_version_rejected() {
        let mut bytes = sample().encode();
        bytes[8] = 9;
        assert!(matches!(
            Superblock::parse(&bytes, true),
            Err(FormatError::UnsupportedVersion(9))
        ));
    }

    #[test]
    fn corrupted_field_fails_checksum_unless_skipped() {
        let mut bytes = sample().encode();
        bytes[12] ^= 0xFF;
        assert!(matches!(
            Superblock::parse(&bytes, true),
            Err(FormatError::ChecksumMismatch { .. })
        ));
        assert!(Superblock::parse(&bytes, false).is_ok());
    }
}
