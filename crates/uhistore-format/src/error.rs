//! Error types for the container format.

use std::fmt;

/// Errors that can occur when building, encoding or parsing a container.
#[derive(Debug)]
pub enum FormatError {
    /// I/O error from the filesystem.
    Io(std::io::Error),
    /// The container magic signature was not found at offset 0.
    SignatureNotFound,
    /// The superblock version is not supported.
    UnsupportedVersion(u8),
    /// Unexpected end of data.
    UnexpectedEof {
        /// Number of bytes expected.
        expected: usize,
        /// Number of bytes actually available.
        available: usize,
    },
    /// Lookup3 checksum mismatch.
    ChecksumMismatch {
        /// The checksum stored in the file.
        expected: u32,
        /// The checksum we computed.
        computed: u32,
    },
    /// An unknown type tag was encountered while decoding.
    InvalidTag {
        /// What was being decoded (node kind, attribute, payload).
        what: &'static str,
        /// The raw tag byte.
        tag: u8,
    },
    /// A name or string value was not valid UTF-8.
    InvalidUtf8,
    /// An object reference does not name a node of this container.
    DanglingReference(u64),
    /// A node record names a parent that does not precede it.
    InvalidParent {
        /// Index of the offending node.
        node: u64,
        /// The parent index it names.
        parent: u64,
    },
    /// A sibling with the same name already exists.
    DuplicateName(String),
    /// The node at the given path is not a group.
    NotAGroup(String),
    /// Dataset shape does not match its element count.
    ShapeMismatch {
        /// Path of the dataset.
        path: String,
        /// Element count implied by the shape.
        expected: u64,
        /// Element count of the payload.
        found: u64,
    },
    /// Deflate (zlib) payload could not be decompressed.
    Compression(String),
    /// A length does not fit the field that encodes it.
    TooLarge {
        /// What was being encoded.
        what: &'static str,
        /// The length that overflowed.
        len: usize,
    },
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::Io(e) => write!(f, "I/O error: {e}"),
            FormatError::SignatureNotFound => write!(f, "container signature not found"),
            FormatError::UnsupportedVersion(v) => {
                write!(f, "unsupported superblock version: {v}")
            }
            FormatError::UnexpectedEof {
                expected,
                available,
            } => {
                write!(f, "unexpected EOF: need {expected} bytes, have {available}")
            }
            FormatError::ChecksumMismatch { expected, computed } => {
                write!(
                    f,
                    "checksum mismatch: expected {expected:#010x}, computed {computed:#010x}"
                )
            }
            FormatError::InvalidTag { what, tag } => {
                write!(f, "invalid {what} tag: {tag:#04x}")
            }
            FormatError::InvalidUtf8 => write!(f, "invalid UTF-8 in name or string value"),
            FormatError::DanglingReference(addr) => {
                write!(f, "object reference {addr:#x} does not resolve")
            }
            FormatError::InvalidParent { node, parent } => {
                write!(f, "node {node} names invalid parent {parent}")
            }
            FormatError::DuplicateName(path) => write!(f, "name already exists: {path}"),
            FormatError::NotAGroup(path) => write!(f, "not a group: {path}"),
            FormatError::ShapeMismatch {
                path,
                expected,
                found,
            } => {
                write!(
                    f,
                    "shape mismatch at {path}: shape holds {expected} elements, payload has {found}"
                )
            }
            FormatError::Compression(msg) => write!(f, "deflate error: {msg}"),
            FormatError::TooLarge { what, len } => {
                write!(f, "{what} of length {len} exceeds the format limit")
            }
        }
    }
}

impl std::error::Error for FormatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FormatError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for FormatError {
    fn from(e: std::io::Error) -> Self {
        FormatError::Io(e)
    }
}
