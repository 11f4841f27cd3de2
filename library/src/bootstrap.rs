//! Catalog acquisition
//!
//! Reads the installed catalog when there is one, otherwise asks for the
//! music folder and builds the catalog from the charts in it.

use std::path::PathBuf;

use o2launch_core::config::CatalogConfig;
use o2launch_core::{
    Catalog, CatalogError, DirectoryPrompt, DisplayEntry, FallbackError,
    load_catalog_file_with_limit, run_fallback,
};

/// Exit code used when no song list could be produced.
pub const CATALOG_FAILURE_CODE: u8 = 1;

/// Why the song list could not be produced.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("Failed to read {}: {source}", path.display())]
    Catalog {
        path: PathBuf,
        #[source]
        source: CatalogError,
    },

    #[error(transparent)]
    Fallback(#[from] FallbackError),
}

impl BootstrapError {
    /// Title for the error dialog.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Catalog { .. } => "Corrupt song list",
            Self::Fallback(FallbackError::UserCancelled) => "Music folder required",
            Self::Fallback(_) => "No music found",
        }
    }
}

/// Load the catalog from disk or fall back to the music folder prompt.
pub fn acquire_catalog(
    config: &CatalogConfig,
    prompt: &dyn DirectoryPrompt,
) -> Result<Catalog, BootstrapError> {
    match config.resolve_path() {
        Some(path) if path.is_file() => {
            load_catalog_file_with_limit(&path, config.max_directory_path)
                .map_err(|source| BootstrapError::Catalog { path, source })
        }
        Some(path) => {
            tracing::info!("No catalog at {}, asking for the music folder", path.display());
            Ok(run_fallback(prompt)?)
        }
        None => {
            tracing::warn!("Executable directory unknown, asking for the music folder");
            Ok(run_fallback(prompt)?)
        }
    }
}

/// Render the song list, one entry per line.
pub fn format_song_list(entries: &[DisplayEntry]) -> String {
    entries
        .iter()
        .map(|entry| format!("{}\n", entry.label))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use o2launch_core::{CatalogEntry, CatalogWriter};
    use std::cell::Cell;
    use std::path::Path;

    struct FixedPrompt {
        answer: Option<PathBuf>,
        asked: Cell<bool>,
    }

    impl FixedPrompt {
        fn new(answer: Option<&Path>) -> Self {
            Self {
                answer: answer.map(Path::to_path_buf),
                asked: Cell::new(false),
            }
        }
    }

    impl DirectoryPrompt for FixedPrompt {
        fn select_directory(&self) -> Option<PathBuf> {
            self.asked.set(true);
            self.answer.clone()
        }
    }

    fn write_catalog(path: &Path) -> Catalog {
        let catalog = Catalog {
            directory: "Music".to_string(),
            entries: vec![CatalogEntry {
                file_name: "o2ma100.ojn".to_string(),
                display_name: "Bach Alive".to_string(),
                difficulties: [Some(3), None, Some(11)],
            }],
        };
        let mut bytes = Vec::new();
        CatalogWriter::new(&mut bytes).write_catalog(&catalog).unwrap();
        std::fs::write(path, bytes).unwrap();
        catalog
    }

    fn config_for(path: PathBuf) -> CatalogConfig {
        CatalogConfig {
            path: Some(path),
            ..CatalogConfig::default()
        }
    }

    #[test]
    fn test_existing_catalog_skips_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("music.dat");
        let expected = write_catalog(&path);
        let prompt = FixedPrompt::new(None);

        let catalog = acquire_catalog(&config_for(path), &prompt).unwrap();

        assert_eq!(catalog, expected);
        assert!(!prompt.asked.get());
    }

    #[test]
    fn test_corrupt_catalog_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("music.dat");
        std::fs::write(&path, b"NOPE\x00\x00\x00\x00").unwrap();
        let prompt = FixedPrompt::new(None);

        let err = acquire_catalog(&config_for(path), &prompt).unwrap_err();

        assert!(matches!(
            err,
            BootstrapError::Catalog {
                source: CatalogError::InvalidFormat(_),
                ..
            }
        ));
        assert_eq!(err.title(), "Corrupt song list");
        assert!(!prompt.asked.get());
    }

    #[test]
    fn test_missing_catalog_prompts() {
        let dir = tempfile::tempdir().unwrap();
        let prompt = FixedPrompt::new(None);

        let err = acquire_catalog(&config_for(dir.path().join("music.dat")), &prompt).unwrap_err();

        assert!(prompt.asked.get());
        assert!(matches!(
            err,
            BootstrapError::Fallback(FallbackError::UserCancelled)
        ));
        assert_eq!(err.title(), "Music folder required");
    }

    #[test]
    fn test_missing_catalog_with_empty_folder() {
        let dir = tempfile::tempdir().unwrap();
        let music = tempfile::tempdir().unwrap();
        let prompt = FixedPrompt::new(Some(music.path()));

        let err = acquire_catalog(&config_for(dir.path().join("music.dat")), &prompt).unwrap_err();

        assert!(matches!(
            err,
            BootstrapError::Fallback(FallbackError::NoContentFound { .. })
        ));
        assert_eq!(err.title(), "No music found");
    }

    #[test]
    fn test_format_song_list() {
        let catalog = Catalog {
            directory: String::new(),
            entries: vec![CatalogEntry {
                file_name: "o2ma100.ojn".to_string(),
                display_name: "Bach Alive".to_string(),
                difficulties: [Some(3), None, Some(11)],
            }],
        };

        assert_eq!(
            format_song_list(&catalog.display_entries()),
            "Bach Alive - Lvl. 3\nBach Alive - Lvl. 11\n"
        );
        assert_eq!(format_song_list(&[]), "");
    }
}
