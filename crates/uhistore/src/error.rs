//! Error types for histogram serialization.

use uhistore_format::FormatError;

/// Errors that can occur while writing or reading histograms.
///
/// Decode errors carry the path of the offending container node.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown variant {name:?}{}", at(.path))]
    UnknownVariant { name: String, path: String },

    #[error("missing field {field:?} at {path}")]
    MissingField { field: String, path: String },

    #[error("field {field:?} at {path} is not a {expected}")]
    InvalidField {
        field: String,
        path: String,
        expected: &'static str,
    },

    #[error("shape mismatch at {path}: expected {expected} elements, found {found}")]
    ShapeMismatch {
        path: String,
        expected: usize,
        found: usize,
    },

    #[error("bin grid exceeds the addressable size{}", at(.path))]
    GridOverflow { path: String },

    #[error("axis kind {0:?} has no container representation")]
    UnsupportedAxisKind(String),

    #[error("container error: {0}")]
    Format(#[from] FormatError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn at(path: &str) -> String {
    if path.is_empty() {
        String::new()
    } else {
        format!(" at {path}")
    }
}

pub type Result<T> = std::result::Result<T, Error>;
