//! o2launch
//!
//! Shows the installed songs, then loads the `Game` module and passes every
//! command line argument to its entry point.
//!
//! Exit status is whatever the game returns, `-1` if it could not be started
//! and `1` if there was no usable song list.

use std::process::ExitCode;

use anyhow::Result;
use o2launch_core::{NativeLauncher, config};
use o2launch_library::bootstrap::{CATALOG_FAILURE_CODE, acquire_catalog, format_song_list};
use o2launch_library::dialogs::{directory_prompt, show_error};
use o2launch_library::logging;

fn main() -> Result<ExitCode> {
    let config = config::load();

    // Initialize logging
    logging::init(&config.log)?;

    let prompt = directory_prompt(&config.ui);
    let catalog = match acquire_catalog(&config.catalog, prompt.as_ref()) {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::error!("{}", e);
            show_error(&config.ui, e.title(), &e.to_string());
            return Ok(ExitCode::from(CATALOG_FAILURE_CODE));
        }
    };

    let entries = catalog.display_entries();
    tracing::info!("{} songs available", entries.len());
    print!("{}", format_song_list(&entries));

    let code = match NativeLauncher::from_config(&config.launcher).run(std::env::args_os()) {
        Ok(code) => {
            tracing::info!("Game exited with code {}", code);
            code
        }
        Err(e) => {
            tracing::error!("Launch failed: {}", e);
            show_error(&config.ui, "Unable to start the game", &e.to_string());
            e.exit_code()
        }
    };

    // ExitCode only carries a u8; the game's status is a full i32.
    std::process::exit(code)
}
