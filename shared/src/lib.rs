//! Shared types for the o2launch game bootstrapper.

pub mod catalog_format;
pub mod fs;

pub use catalog_format::{
    CATALOG_FORMAT, CONTENT_FORMAT, CatalogFormat, ContentFormat, MAX_DIRECTORY_PATH_BYTES,
};
pub use fs::{MAX_CATALOG_BYTES, read_file_with_limit};

/// Short name of the native module that carries the game.
pub const NATIVE_MODULE_NAME: &str = "Game";

/// Symbol exported by the native module to receive control.
pub const NATIVE_ENTRY_SYMBOL: &str = "local_main";
