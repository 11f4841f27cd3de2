//! Chart content discovery
//!
//! Reads chart (`o2ma*.ojn`) headers and builds catalogs from a music folder
//! when no `music.dat` is installed.

mod fallback;
mod header;

pub use fallback::{
    DirectoryPrompt, FallbackError, build_catalog_from_dir, discover_content_files, run_fallback,
};
pub use header::{ContentError, ContentHeader};
