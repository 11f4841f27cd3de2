//! Song catalog (`music.dat`)
//!
//! The catalog enumerates installed charts and their difficulty levels so the
//! bootstrapper can show a song list without opening every chart file.
//!
//! # File Structure
//!
//! ```text
//! +-----------------------------------------------+
//! | Header                                        |
//! |  magic: u32 (0x4D4F4F4E)                      |
//! |  file_count: i32                              |
//! |  directory: ASCII, NUL terminated             |
//! +-----------------------------------------------+
//! | Entry x file_count (57 bytes each)            |
//! |  file_name: [u8; 13]                          |
//! |  display_name: [u8; 32]                       |
//! |  difficulty: [i32; 3] (-1 = absent)           |
//! +-----------------------------------------------+
//! ```
//!
//! Everything is little-endian and there is no padding between sections.

mod error;
mod reader;
mod writer;

use std::io::Read;
use std::path::Path;

use o2launch_shared::{CATALOG_FORMAT, MAX_CATALOG_BYTES, read_file_with_limit};

pub use error::{CatalogError, EncodeViolation, FormatViolation, PathViolation};
pub use reader::CatalogReader;
pub(crate) use reader::fixed_ascii_field;
pub use writer::CatalogWriter;

/// Number of difficulty slots carried by every entry.
pub const DIFFICULTY_SLOTS: usize = CATALOG_FORMAT.difficulty_slots;

/// One record of the catalog: a chart file and up to three difficulty levels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Short name of the chart file (e.g. `o2ma100.ojn`)
    pub file_name: String,
    /// Human readable song title
    pub display_name: String,
    /// Level per slot, `None` when the slot is absent
    pub difficulties: [Option<i32>; DIFFICULTY_SLOTS],
}

impl CatalogEntry {
    /// Iterate over present difficulty slots as `(slot, level)`.
    pub fn levels(&self) -> impl Iterator<Item = (usize, i32)> + '_ {
        self.difficulties
            .iter()
            .enumerate()
            .filter_map(|(slot, level)| level.map(|level| (slot, level)))
    }
}

/// Convert a raw difficulty value into a slot, honouring the absent sentinel.
pub fn difficulty_from_raw(raw: i32) -> Option<i32> {
    (raw != CATALOG_FORMAT.absent_difficulty).then_some(raw)
}

/// Convert a slot back to its raw on-disk value.
pub fn difficulty_to_raw(level: Option<i32>) -> i32 {
    level.unwrap_or(CATALOG_FORMAT.absent_difficulty)
}

/// A decoded (or built) catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    /// Directory the chart files live in
    pub directory: String,
    /// Entries in file order
    pub entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Flatten the catalog into the list shown to the player.
    ///
    /// One entry per present difficulty, in record order and then slot order.
    pub fn display_entries(&self) -> Vec<DisplayEntry> {
        self.entries
            .iter()
            .flat_map(|entry| {
                entry
                    .levels()
                    .map(move |(slot, level)| DisplayEntry::new(entry, slot, level))
            })
            .collect()
    }
}

/// A single line of the song list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayEntry {
    /// `"<display_name> - Lvl. <level>"`
    pub label: String,
    /// Chart file the line refers to
    pub file_name: String,
    /// Difficulty slot (0, 1 or 2)
    pub slot: usize,
}

impl DisplayEntry {
    fn new(entry: &CatalogEntry, slot: usize, level: i32) -> Self {
        Self {
            label: format!("{} - Lvl. {}", entry.display_name, level),
            file_name: entry.file_name.clone(),
            slot,
        }
    }
}

/// Decode a catalog stream straight into display entries.
pub fn decode_display_entries<R: Read>(reader: R) -> Result<Vec<DisplayEntry>, CatalogError> {
    let catalog = CatalogReader::new(reader).read_catalog()?;
    Ok(catalog.display_entries())
}

/// Read and decode a catalog file.
///
/// The file is read into memory with a size cap before decoding.
pub fn load_catalog_file(path: &Path) -> Result<Catalog, CatalogError> {
    load_catalog_file_with_limit(path, CATALOG_FORMAT.max_directory_path)
}

/// [`load_catalog_file`] with a custom directory path limit.
pub fn load_catalog_file_with_limit(
    path: &Path,
    max_directory_path: usize,
) -> Result<Catalog, CatalogError> {
    let bytes = read_file_with_limit(path, MAX_CATALOG_BYTES).map_err(CatalogError::Read)?;
    let catalog = CatalogReader::new(bytes.as_slice())
        .with_path_limit(max_directory_path)
        .read_catalog()?;

    tracing::info!(
        "Loaded catalog {} ({} entries, directory '{}')",
        path.display(),
        catalog.entries.len(),
        catalog.directory
    );

    Ok(catalog)
}
