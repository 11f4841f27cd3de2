//! Catalog and content file format specifications.
//!
//! This module is the single source of truth for the on-disk layouts the
//! bootstrapper understands: the `music.dat` catalog and the header of the
//! `o2ma*.ojn` content files it indexes.
//!
//! # Example
//!
//! ```
//! use o2launch_shared::CATALOG_FORMAT;
//!
//! assert_eq!(CATALOG_FORMAT.file_name, "music.dat");
//! assert_eq!(CATALOG_FORMAT.magic, 0x4D4F_4F4E);
//! assert_eq!(CATALOG_FORMAT.entry_size(), 57);
//! ```

/// Catalog file format specification.
///
/// ```text
/// offset 0   magic        u32 LE
/// offset 4   file_count   i32 LE
/// offset 8   directory    ASCII bytes, terminated by a single 0x00
/// then file_count entries:
///            file_name    [u8; 13]  null padded
///            display_name [u8; 32]  null padded
///            difficulty   [i32; 3]  LE, -1 = slot absent
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CatalogFormat {
    /// Default catalog file name, looked up next to the executable
    pub file_name: &'static str,

    /// Magic number at offset 0
    pub magic: u32,

    /// Width of the fixed file name field
    pub file_name_len: usize,

    /// Width of the fixed display name field
    pub display_name_len: usize,

    /// Number of difficulty slots per entry
    pub difficulty_slots: usize,

    /// Value marking an absent difficulty slot
    pub absent_difficulty: i32,

    /// Maximum accepted length of the directory path, excluding the terminator
    pub max_directory_path: usize,
}

impl CatalogFormat {
    /// Size in bytes of one entry record.
    pub const fn entry_size(&self) -> usize {
        self.file_name_len + self.display_name_len + self.difficulty_slots * 4
    }
}

/// The `music.dat` catalog format.
pub const CATALOG_FORMAT: CatalogFormat = CatalogFormat {
    file_name: "music.dat",
    magic: 0x4D4F_4F4E,
    file_name_len: 13,
    display_name_len: 32,
    difficulty_slots: 3,
    absent_difficulty: -1,
    max_directory_path: 256,
};

/// Maximum accepted directory path length in a catalog.
///
/// Anything longer is treated as corruption.
pub const MAX_DIRECTORY_PATH_BYTES: usize = CATALOG_FORMAT.max_directory_path;

/// Content (chart) file format specification.
#[derive(Debug, Clone, Copy)]
pub struct ContentFormat {
    /// File name prefix shared by every content file of the family
    pub prefix: &'static str,

    /// File extension without dot
    pub extension: &'static str,

    /// Signature bytes at header offset 4
    pub signature: &'static [u8; 4],

    /// Size in bytes of the fixed header
    pub header_size: usize,
}

impl ContentFormat {
    /// Check whether a file name belongs to this content family.
    ///
    /// Matching is ASCII case-insensitive.
    pub fn matches_file_name(&self, name: &str) -> bool {
        let lower = name.to_ascii_lowercase();
        let suffix = format!(".{}", self.extension);
        lower.len() >= self.prefix.len() + suffix.len()
            && lower.starts_with(self.prefix)
            && lower.ends_with(&suffix)
    }
}

/// The `o2ma*.ojn` chart format.
pub const CONTENT_FORMAT: ContentFormat = ContentFormat {
    prefix: "o2ma",
    extension: "ojn",
    signature: b"ojn\0",
    header_size: 300,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_format_magic() {
        assert_eq!(CATALOG_FORMAT.magic, 0x4D4F_4F4E);
        assert_eq!(CATALOG_FORMAT.magic.to_le_bytes(), *b"NOOM");
    }

    #[test]
    fn test_catalog_entry_size() {
        assert_eq!(CATALOG_FORMAT.entry_size(), 13 + 32 + 12);
    }

    #[test]
    fn test_content_matches_file_name() {
        assert!(CONTENT_FORMAT.matches_file_name("o2ma100.ojn"));
        assert!(CONTENT_FORMAT.matches_file_name("O2MA1234.OJN"));
        assert!(CONTENT_FORMAT.matches_file_name("o2ma.ojn"));
    }

    #[test]
    fn test_content_rejects_other_names() {
        assert!(!CONTENT_FORMAT.matches_file_name("o2ma100.ojm"));
        assert!(!CONTENT_FORMAT.matches_file_name("song100.ojn"));
        assert!(!CONTENT_FORMAT.matches_file_name("o2ma100.ojn.bak"));
        assert!(!CONTENT_FORMAT.matches_file_name("o2maojn"));
    }
}
