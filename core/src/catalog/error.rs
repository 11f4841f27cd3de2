//! Catalog error types

use std::io;

/// Error decoding or encoding a catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Header values that can never appear in a valid catalog
    #[error("invalid catalog format: {0}")]
    InvalidFormat(FormatViolation),

    /// Directory path is missing its terminator or exceeds the limit
    #[error("malformed directory path: {0}")]
    MalformedPath(PathViolation),

    /// Stream ended before the declared data was read
    #[error("catalog truncated while reading {section}")]
    TruncatedFile {
        /// Section being read when the stream ran out
        section: String,
    },

    /// Catalog value cannot be represented in the file format
    #[error("cannot encode catalog: {0}")]
    Encode(EncodeViolation),

    /// Catalog file could not be read from disk
    #[error("{0:#}")]
    Read(anyhow::Error),

    /// Underlying reader or writer failed
    #[error("catalog I/O error: {0}")]
    Io(#[source] io::Error),
}

impl CatalogError {
    /// Map an I/O error, turning an early end of stream into `TruncatedFile`.
    pub(crate) fn from_io(error: io::Error, section: impl Into<String>) -> Self {
        if error.kind() == io::ErrorKind::UnexpectedEof {
            Self::TruncatedFile {
                section: section.into(),
            }
        } else {
            Self::Io(error)
        }
    }
}

/// Reason a catalog header is invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatViolation {
    #[error("bad magic 0x{found:08X} (expected 0x{expected:08X})")]
    BadMagic { found: u32, expected: u32 },

    #[error("negative file count {0}")]
    NegativeFileCount(i32),
}

/// Reason a directory path is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathViolation {
    #[error("longer than {limit} bytes")]
    TooLong { limit: usize },

    #[error("stream ended after {read} bytes without a terminator")]
    Unterminated { read: usize },
}

/// Reason a catalog cannot be written.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeViolation {
    #[error("{field} '{value}' is {len} bytes (max {max})")]
    FieldTooLong {
        field: &'static str,
        value: String,
        len: usize,
        max: usize,
    },

    #[error("{field} '{value}' is not ASCII")]
    NonAscii { field: &'static str, value: String },

    #[error("directory path contains a NUL byte")]
    InteriorNul,

    #[error("{file_name} slot {slot} uses the reserved level {level}")]
    ReservedLevel {
        file_name: String,
        slot: usize,
        level: i32,
    },

    #[error("{0} entries exceed the format limit")]
    TooManyEntries(usize),
}
