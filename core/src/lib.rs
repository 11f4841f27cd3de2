//! O2Launch Core - catalog decoding and native module launch
//!
//! This crate provides everything the bootstrapper needs between start-up
//! and handing control to the game library.
//!
//! # Architecture
//!
//! - [`catalog`] - `music.dat` reader/writer and display entries
//! - [`content`] - Fallback catalog built from a directory of `.ojn` charts
//! - [`native`] - Dynamic loading of the `Game` module and its `local_main`
//! - [`config`] - `config.toml` settings

pub mod catalog;
pub mod config;
pub mod content;
pub mod native;

pub use catalog::{
    Catalog, CatalogEntry, CatalogError, CatalogReader, CatalogWriter, DisplayEntry,
    decode_display_entries, load_catalog_file, load_catalog_file_with_limit,
};
pub use config::Config;
pub use content::{DirectoryPrompt, FallbackError, build_catalog_from_dir, run_fallback};
pub use native::{LAUNCH_FAILURE_CODE, LaunchError, NativeLauncher, OsError};
