//! Catalog reader
//!
//! Decodes `music.dat` streams. The reader never returns a partial catalog:
//! any failure discards everything decoded so far.

use std::io::{self, Read};

use byteorder::{LittleEndian, ReadBytesExt};
use o2launch_shared::{CATALOG_FORMAT, MAX_DIRECTORY_PATH_BYTES};

use super::error::{CatalogError, FormatViolation, PathViolation};
use super::{Catalog, CatalogEntry, DIFFICULTY_SLOTS, difficulty_from_raw};

/// Upper bound on entries preallocated from an untrusted count.
const MAX_PREALLOCATED_ENTRIES: usize = 4096;

/// Reader for the binary catalog format
pub struct CatalogReader<R: Read> {
    reader: R,
    max_directory_path: usize,
}

impl<R: Read> CatalogReader<R> {
    /// Create a new catalog reader
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            max_directory_path: MAX_DIRECTORY_PATH_BYTES,
        }
    }

    /// Override the maximum accepted directory path length.
    pub fn with_path_limit(mut self, limit: usize) -> Self {
        self.max_directory_path = limit;
        self
    }

    /// Read a complete catalog from the input
    pub fn read_catalog(&mut self) -> Result<Catalog, CatalogError> {
        let file_count = self.read_header()?;
        let directory = self.read_directory()?;

        let mut entries = Vec::with_capacity(file_count.min(MAX_PREALLOCATED_ENTRIES));
        for index in 0..file_count {
            let entry = self
                .read_entry()
                .map_err(|e| CatalogError::from_io(e, format!("entry {} of {}", index + 1, file_count)))?;
            entries.push(entry);
        }

        tracing::debug!(
            "Decoded catalog: {} entries from directory '{}'",
            entries.len(),
            directory
        );

        Ok(Catalog { directory, entries })
    }

    /// Read and validate magic and file count
    fn read_header(&mut self) -> Result<usize, CatalogError> {
        let magic = self
            .reader
            .read_u32::<LittleEndian>()
            .map_err(|e| CatalogError::from_io(e, "header"))?;
        if magic != CATALOG_FORMAT.magic {
            return Err(CatalogError::InvalidFormat(FormatViolation::BadMagic {
                found: magic,
                expected: CATALOG_FORMAT.magic,
            }));
        }

        let file_count = self
            .reader
            .read_i32::<LittleEndian>()
            .map_err(|e| CatalogError::from_io(e, "header"))?;

        usize::try_from(file_count)
            .map_err(|_| CatalogError::InvalidFormat(FormatViolation::NegativeFileCount(file_count)))
    }

    /// Read the NUL terminated directory path
    fn read_directory(&mut self) -> Result<String, CatalogError> {
        let mut bytes = Vec::new();

        loop {
            let byte = match self.reader.read_u8() {
                Ok(byte) => byte,
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    return Err(CatalogError::MalformedPath(PathViolation::Unterminated {
                        read: bytes.len(),
                    }));
                }
                Err(e) => return Err(CatalogError::Io(e)),
            };

            if byte == 0 {
                break;
            }
            if bytes.len() == self.max_directory_path {
                return Err(CatalogError::MalformedPath(PathViolation::TooLong {
                    limit: self.max_directory_path,
                }));
            }
            bytes.push(byte);
        }

        Ok(ascii_string(&bytes))
    }

    /// Read one fixed-size entry record
    fn read_entry(&mut self) -> io::Result<CatalogEntry> {
        let file_name = self.read_fixed_field(CATALOG_FORMAT.file_name_len)?;
        let display_name = self.read_fixed_field(CATALOG_FORMAT.display_name_len)?;

        let mut difficulties = [None; DIFFICULTY_SLOTS];
        for slot in difficulties.iter_mut() {
            *slot = difficulty_from_raw(self.reader.read_i32::<LittleEndian>()?);
        }

        Ok(CatalogEntry {
            file_name,
            display_name,
            difficulties,
        })
    }

    fn read_fixed_field(&mut self, len: usize) -> io::Result<String> {
        let mut field = vec![0u8; len];
        self.reader.read_exact(&mut field)?;
        Ok(fixed_ascii_field(&field))
    }
}

/// Decode a null padded fixed field.
///
/// Only trailing NUL bytes are trimmed; interior ones are kept.
pub(crate) fn fixed_ascii_field(bytes: &[u8]) -> String {
    let end = bytes
        .iter()
        .rposition(|&b| b != 0)
        .map_or(0, |last| last + 1);
    ascii_string(&bytes[..end])
}

/// Decode ASCII, replacing bytes outside the 7-bit range with `?`.
pub(crate) fn ascii_string(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| if b.is_ascii() { b as char } else { '?' })
        .collect()
}
