//! Catalog fallback builder
//!
//! Used when no catalog file exists: the player picks the music folder and
//! an in-memory catalog is built from the chart headers found there.

use std::io;
use std::path::{Path, PathBuf};

use o2launch_shared::{CATALOG_FORMAT, CONTENT_FORMAT};

use super::header::ContentHeader;
use crate::catalog::{Catalog, CatalogEntry};

/// Error building a catalog from a content directory.
#[derive(Debug, thiserror::Error)]
pub enum FallbackError {
    /// The player dismissed the directory prompt
    #[error("You must select the music folder to continue.")]
    UserCancelled,

    /// No usable chart files in the selected directory
    #[error("No music files found in the selected folder ({}).", directory.display())]
    NoContentFound { directory: PathBuf },

    /// Directory could not be enumerated
    #[error("Failed to read music folder {}: {source}", directory.display())]
    Io {
        directory: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Asks the player for the directory holding the chart files.
///
/// Implemented by the UI layer (native folder dialog, terminal prompt).
pub trait DirectoryPrompt {
    /// Returns `None` when the player cancels.
    fn select_directory(&self) -> Option<PathBuf>;
}

/// Prompt for the music folder and build a catalog from it.
pub fn run_fallback(prompt: &dyn DirectoryPrompt) -> Result<Catalog, FallbackError> {
    let Some(directory) = prompt.select_directory() else {
        tracing::warn!("Music folder selection cancelled");
        return Err(FallbackError::UserCancelled);
    };

    tracing::info!("Building catalog from {}", directory.display());
    build_catalog_from_dir(&directory)
}

/// Build a catalog from the chart files directly inside `directory`.
///
/// Charts whose header cannot be read are skipped. Fails with
/// `NoContentFound` when nothing usable remains.
pub fn build_catalog_from_dir(directory: &Path) -> Result<Catalog, FallbackError> {
    let files = discover_content_files(directory)?;
    if files.is_empty() {
        return Err(FallbackError::NoContentFound {
            directory: directory.to_path_buf(),
        });
    }

    let entries: Vec<CatalogEntry> = files.iter().filter_map(|path| entry_for_file(path)).collect();
    if entries.is_empty() {
        return Err(FallbackError::NoContentFound {
            directory: directory.to_path_buf(),
        });
    }

    tracing::info!(
        "Built catalog with {} of {} charts from {}",
        entries.len(),
        files.len(),
        directory.display()
    );

    Ok(Catalog {
        directory: directory.to_string_lossy().into_owned(),
        entries,
    })
}

/// List chart files directly inside `directory`, sorted by file name.
///
/// Not recursive; only regular files matching `o2ma*.ojn` are returned.
pub fn discover_content_files(directory: &Path) -> Result<Vec<PathBuf>, FallbackError> {
    let entries = std::fs::read_dir(directory).map_err(|source| FallbackError::Io {
        directory: directory.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let path = entry.path();
            let name = path.file_name()?.to_str()?;

            (path.is_file() && CONTENT_FORMAT.matches_file_name(name)).then_some(path)
        })
        .collect();

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Build a catalog entry from one chart file.
fn entry_for_file(path: &Path) -> Option<CatalogEntry> {
    let file_name = path.file_name()?.to_str()?.to_string();
    if !file_name.is_ascii() || file_name.len() > CATALOG_FORMAT.file_name_len {
        tracing::warn!("Skipping {}: name does not fit the catalog", path.display());
        return None;
    }

    let header = match ContentHeader::read_file(path) {
        Ok(header) => header,
        Err(e) => {
            tracing::warn!("Skipping {}: {}", path.display(), e);
            return None;
        }
    };

    let mut display_name = header.title.clone();
    display_name.truncate(CATALOG_FORMAT.display_name_len);

    Some(CatalogEntry {
        file_name,
        display_name,
        difficulties: header.difficulties(),
    })
}
