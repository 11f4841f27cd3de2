//! Catalog writer
//!
//! Encodes a [`Catalog`] in the `music.dat` layout. Values that do not fit
//! the fixed-width fields are rejected instead of being truncated.

use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};
use o2launch_shared::{CATALOG_FORMAT, MAX_DIRECTORY_PATH_BYTES};

use super::error::{CatalogError, EncodeViolation};
use super::{Catalog, CatalogEntry, difficulty_to_raw};

/// Writer for the binary catalog format
pub struct CatalogWriter<W: Write> {
    writer: W,
}

impl<W: Write> CatalogWriter<W> {
    /// Create a new catalog writer
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Write a complete catalog to the output
    pub fn write_catalog(&mut self, catalog: &Catalog) -> Result<(), CatalogError> {
        validate(catalog)?;

        let count = i32::try_from(catalog.entries.len()).map_err(|_| {
            CatalogError::Encode(EncodeViolation::TooManyEntries(catalog.entries.len()))
        })?;

        self.writer
            .write_u32::<LittleEndian>(CATALOG_FORMAT.magic)
            .map_err(CatalogError::Io)?;
        self.writer
            .write_i32::<LittleEndian>(count)
            .map_err(CatalogError::Io)?;
        self.writer
            .write_all(catalog.directory.as_bytes())
            .map_err(CatalogError::Io)?;
        self.writer.write_u8(0).map_err(CatalogError::Io)?;

        for entry in &catalog.entries {
            self.write_entry(entry).map_err(CatalogError::Io)?;
        }

        self.writer.flush().map_err(CatalogError::Io)
    }

    fn write_entry(&mut self, entry: &CatalogEntry) -> std::io::Result<()> {
        self.write_fixed_field(&entry.file_name, CATALOG_FORMAT.file_name_len)?;
        self.write_fixed_field(&entry.display_name, CATALOG_FORMAT.display_name_len)?;
        for level in entry.difficulties {
            self.writer
                .write_i32::<LittleEndian>(difficulty_to_raw(level))?;
        }
        Ok(())
    }

    fn write_fixed_field(&mut self, value: &str, len: usize) -> std::io::Result<()> {
        let mut field = vec![0u8; len];
        field[..value.len()].copy_from_slice(value.as_bytes());
        self.writer.write_all(&field)
    }
}

/// Check every field against the format before anything is written.
fn validate(catalog: &Catalog) -> Result<(), CatalogError> {
    check_text("directory", &catalog.directory, MAX_DIRECTORY_PATH_BYTES)?;
    if catalog.directory.contains('\0') {
        return Err(CatalogError::Encode(EncodeViolation::InteriorNul));
    }

    for entry in &catalog.entries {
        check_text("file name", &entry.file_name, CATALOG_FORMAT.file_name_len)?;
        check_text(
            "display name",
            &entry.display_name,
            CATALOG_FORMAT.display_name_len,
        )?;
        // -1 would read back as an absent slot.
        if let Some((slot, level)) = entry
            .levels()
            .find(|&(_, level)| level == CATALOG_FORMAT.absent_difficulty)
        {
            return Err(CatalogError::Encode(EncodeViolation::ReservedLevel {
                file_name: entry.file_name.clone(),
                slot,
                level,
            }));
        }
    }
    Ok(())
}

fn check_text(field: &'static str, value: &str, max: usize) -> Result<(), CatalogError> {
    if !value.is_ascii() {
        return Err(CatalogError::Encode(EncodeViolation::NonAscii {
            field,
            value: value.to_string(),
        }));
    }
    if value.len() > max {
        return Err(CatalogError::Encode(EncodeViolation::FieldTooLong {
            field,
            value: value.to_string(),
            len: value.len(),
            max,
        }));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogReader;

    fn entry(name: &str, title: &str) -> CatalogEntry {
        CatalogEntry {
            file_name: name.to_string(),
            display_name: title.to_string(),
            difficulties: [Some(1), None, Some(12)],
        }
    }

    #[test]
    fn test_layout() {
        let catalog = Catalog {
            directory: "ab".to_string(),
            entries: vec![entry("o2ma1.ojn", "Song")],
        };

        let mut buffer = Vec::new();
        CatalogWriter::new(&mut buffer)
            .write_catalog(&catalog)
            .unwrap();

        assert_eq!(&buffer[0..4], b"NOOM");
        assert_eq!(&buffer[4..8], &1i32.to_le_bytes());
        assert_eq!(&buffer[8..11], b"ab\0");
        // name field starts right after the terminator
        assert_eq!(&buffer[11..20], b"o2ma1.ojn");
        assert_eq!(buffer.len(), 11 + CATALOG_FORMAT.entry_size());
        assert_eq!(&buffer[buffer.len() - 8..buffer.len() - 4], &(-1i32).to_le_bytes());
    }

    #[test]
    fn test_full_width_fields_roundtrip() {
        let catalog = Catalog {
            directory: "d".repeat(MAX_DIRECTORY_PATH_BYTES),
            entries: vec![entry(&"n".repeat(13), &"t".repeat(32))],
        };

        let mut buffer = Vec::new();
        CatalogWriter::new(&mut buffer)
            .write_catalog(&catalog)
            .unwrap();

        let parsed = CatalogReader::new(buffer.as_slice()).read_catalog().unwrap();
        assert_eq!(parsed, catalog);
    }

    #[test]
    fn test_rejects_long_display_name() {
        let catalog = Catalog {
            directory: String::new(),
            entries: vec![entry("o2ma1.ojn", &"x".repeat(33))],
        };

        let mut buffer = Vec::new();
        let err = CatalogWriter::new(&mut buffer)
            .write_catalog(&catalog)
            .unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Encode(EncodeViolation::FieldTooLong { max: 32, .. })
        ));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_rejects_non_ascii() {
        let catalog = Catalog {
            directory: "C:\\Müsik".to_string(),
            entries: Vec::new(),
        };

        let err = CatalogWriter::new(Vec::new())
            .write_catalog(&catalog)
            .unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Encode(EncodeViolation::NonAscii { field: "directory", .. })
        ));
    }

    #[test]
    fn test_rejects_nul_in_directory() {
        let catalog = Catalog {
            directory: "a\0b".to_string(),
            entries: Vec::new(),
        };

        let err = CatalogWriter::new(Vec::new())
            .write_catalog(&catalog)
            .unwrap_err();
        assert!(matches!(err, CatalogError::Encode(EncodeViolation::InteriorNul)));
    }

    #[test]
    fn test_rejects_reserved_level() {
        let catalog = Catalog {
            directory: "Music".to_string(),
            entries: vec![CatalogEntry {
                file_name: "o2ma1.ojn".to_string(),
                display_name: "Song".to_string(),
                difficulties: [Some(2), Some(-1), None],
            }],
        };

        let mut buffer = Vec::new();
        let err = CatalogWriter::new(&mut buffer)
            .write_catalog(&catalog)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot encode catalog: o2ma1.ojn slot 1 uses the reserved level -1"
        );
        assert!(matches!(
            err,
            CatalogError::Encode(EncodeViolation::ReservedLevel { slot: 1, level: -1, .. })
        ));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_other_negative_levels_are_kept() {
        let catalog = Catalog {
            directory: "Music".to_string(),
            entries: vec![CatalogEntry {
                file_name: "o2ma1.ojn".to_string(),
                display_name: "Song".to_string(),
                difficulties: [Some(-2), None, Some(0)],
            }],
        };

        let mut buffer = Vec::new();
        CatalogWriter::new(&mut buffer)
            .write_catalog(&catalog)
            .unwrap();
        let parsed = CatalogReader::new(buffer.as_slice()).read_catalog().unwrap();
        assert_eq!(parsed, catalog);
    }
}
