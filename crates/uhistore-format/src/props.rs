//! Property lists for file creation and file access.
//!
//! Property lists group related configuration into reusable bundles that
//! are passed to [`Container::write_to`](crate::Container::write_to) and
//! [`Container::open`](crate::Container::open).

/// File creation properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCreateProps {
    /// Append lookup3 checksums to the superblock and body.
    pub checksum: bool,
    /// Deflate (zlib) level for dataset payloads, 0-10. `None` stores raw.
    pub deflate_level: Option<u32>,
}

impl Default for FileCreateProps {
    fn default() -> Self {
        Self {
            checksum: true,
            deflate_level: None,
        }
    }
}

impl FileCreateProps {
    /// Create default file creation properties.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the deflate compression level for dataset payloads.
    pub fn deflate(mut self, level: u32) -> Self {
        self.deflate_level = Some(level.min(10));
        self
    }

    /// Skip writing checksums.
    pub fn without_checksum(mut self) -> Self {
        self.checksum = false;
        self
    }
}

/// File access properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAccessProps {
    /// Reject files whose stored checksums do not match.
    pub verify_checksum: bool,
}

impl Default for FileAccessProps {
    fn default() -> Self {
        Self {
            verify_checksum: true,
        }
    }
}

impl FileAccessProps {
    /// Create default file access properties.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept files without checking their checksums.
    pub fn skip_checksum(mut self) -> Self {
        self.verify_checksum = false;
        self
    }
}
