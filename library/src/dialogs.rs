//! User-facing prompts and error reports
//!
//! Native dialogs go through `rfd`. With `[ui] dialogs = false` the same
//! interactions happen on the terminal instead.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use o2launch_core::DirectoryPrompt;
use o2launch_core::config::{UiConfig, exe_dir};

const FOLDER_PROMPT_TITLE: &str = "Select the music folder installed.";

/// Native folder picker.
#[derive(Debug, Default)]
pub struct FolderDialogPrompt;

impl DirectoryPrompt for FolderDialogPrompt {
    fn select_directory(&self) -> Option<PathBuf> {
        let mut dialog = rfd::FileDialog::new().set_title(FOLDER_PROMPT_TITLE);
        if let Some(dir) = exe_dir() {
            dialog = dialog.set_directory(dir);
        }
        dialog.pick_folder()
    }
}

/// Reads the music folder from standard input. An empty line cancels.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl DirectoryPrompt for TerminalPrompt {
    fn select_directory(&self) -> Option<PathBuf> {
        print!("{} ", FOLDER_PROMPT_TITLE);
        io::stdout().flush().ok()?;

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line).ok()?;
        parse_directory_line(&line)
    }
}

/// Interpret one line of terminal input as a directory.
fn parse_directory_line(line: &str) -> Option<PathBuf> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(PathBuf::from(trimmed))
    }
}

/// Pick the directory prompt matching the UI settings.
pub fn directory_prompt(ui: &UiConfig) -> Box<dyn DirectoryPrompt> {
    if ui.dialogs {
        Box::new(FolderDialogPrompt)
    } else {
        Box::new(TerminalPrompt)
    }
}

/// Show a blocking error message.
pub fn show_error(ui: &UiConfig, title: &str, message: &str) {
    if ui.dialogs {
        rfd::MessageDialog::new()
            .set_level(rfd::MessageLevel::Error)
            .set_title(title)
            .set_description(message)
            .set_buttons(rfd::MessageButtons::Ok)
            .show();
    } else {
        eprintln!("{}: {}", title, message);
    }
}
