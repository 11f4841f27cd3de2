//! Configuration management (`config.toml`)
//!
//! Handles loading, saving, and providing defaults for bootstrapper settings.
//! Settings are stored in TOML format in the platform-specific config directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use o2launch_shared::{
    CATALOG_FORMAT, MAX_DIRECTORY_PATH_BYTES, NATIVE_ENTRY_SYMBOL, NATIVE_MODULE_NAME,
};

/// Name of the settings file inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application configuration.
///
/// Serialized to/from TOML format for persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Catalog lookup settings
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Native module settings
    #[serde(default)]
    pub launcher: LauncherConfig,
    /// Dialog settings
    #[serde(default)]
    pub ui: UiConfig,
    /// Logging settings
    #[serde(default)]
    pub log: LogConfig,
}

/// Where the catalog lives and how it is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Catalog file name next to the executable (default: music.dat)
    #[serde(default = "default_catalog_file_name")]
    pub file_name: String,
    /// Absolute catalog path, overriding `file_name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Longest accepted directory path in the catalog (default: 256)
    #[serde(default = "default_max_directory_path")]
    pub max_directory_path: usize,
}

/// Native module loading settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LauncherConfig {
    /// Module short name, without platform suffix (default: Game)
    #[serde(default = "default_module_name")]
    pub module_name: String,
    /// Exported entry point (default: local_main)
    #[serde(default = "default_entry_symbol")]
    pub entry_symbol: String,
    /// Look for the module next to the executable first (default: true)
    #[serde(default = "default_true")]
    pub search_exe_dir: bool,
}

/// Dialog settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Use native dialogs; when false prompts and errors go to the terminal (default: true)
    #[serde(default = "default_true")]
    pub dialogs: bool,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Filter used when `RUST_LOG` is unset (default: info)
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_catalog_file_name() -> String {
    CATALOG_FORMAT.file_name.to_string()
}
fn default_max_directory_path() -> usize {
    MAX_DIRECTORY_PATH_BYTES
}
fn default_module_name() -> String {
    NATIVE_MODULE_NAME.to_string()
}
fn default_entry_symbol() -> String {
    NATIVE_ENTRY_SYMBOL.to_string()
}
fn default_log_filter() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            file_name: default_catalog_file_name(),
            path: None,
            max_directory_path: default_max_directory_path(),
        }
    }
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            module_name: default_module_name(),
            entry_symbol: default_entry_symbol(),
            search_exe_dir: default_true(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            dialogs: default_true(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl CatalogConfig {
    /// Resolve the catalog location.
    ///
    /// An explicit `path` wins; otherwise `file_name` next to the executable.
    /// Returns `None` if the executable directory cannot be determined.
    pub fn resolve_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.path {
            return Some(path.clone());
        }
        exe_dir().map(|dir| dir.join(&self.file_name))
    }
}

/// Directory containing the running executable.
pub fn exe_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.to_path_buf()))
}

/// Returns the platform-specific configuration directory.
///
/// On Windows: `%APPDATA%\O2Launch\config`
/// On macOS: `~/Library/Application Support/io.o2launch.O2Launch`
/// On Linux: `~/.config/O2Launch`
///
/// Returns `None` if the home directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io.o2launch", "", "O2Launch")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Loads the configuration from disk.
///
/// Reads `config.toml` from the platform's configuration directory.
/// Returns default values if the file doesn't exist or cannot be parsed.
pub fn load() -> Config {
    config_dir().map(|dir| load_from(&dir)).unwrap_or_default()
}

/// Loads `config.toml` from `dir`, falling back to defaults.
pub fn load_from(dir: &Path) -> Config {
    std::fs::read_to_string(dir.join(CONFIG_FILE_NAME))
        .ok()
        .and_then(|content| parse(&content))
        .unwrap_or_default()
}

/// Parse configuration text, logging instead of failing on bad TOML.
fn parse(content: &str) -> Option<Config> {
    match toml::from_str(content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!("Ignoring invalid config.toml: {}", e);
            None
        }
    }
}

/// Saves the configuration to disk.
///
/// Writes `config.toml` to the platform's configuration directory.
/// Creates the directory if it doesn't exist.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file
/// cannot be written.
pub fn save(config: &Config) -> std::io::Result<()> {
    match config_dir() {
        Some(dir) => save_to(&dir, config),
        None => Ok(()),
    }
}

/// Writes `config.toml` into `dir`, creating the directory if needed.
pub fn save_to(dir: &Path, config: &Config) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    let content = toml::to_string_pretty(config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    std::fs::write(dir.join(CONFIG_FILE_NAME), content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.catalog.file_name, "music.dat");
        assert_eq!(config.catalog.path, None);
        assert_eq!(config.catalog.max_directory_path, 256);
        assert_eq!(config.launcher.module_name, "Game");
        assert_eq!(config.launcher.entry_symbol, "local_main");
        assert!(config.launcher.search_exe_dir);
        assert!(config.ui.dialogs);
        assert_eq!(config.log.filter, "info");
    }

    #[test]
    fn test_config_deserialize_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_deserialize_partial_launcher() {
        let toml_str = r#"
[launcher]
module_name = "GameDebug"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.launcher.module_name, "GameDebug");
        assert_eq!(config.launcher.entry_symbol, "local_main"); // default
        assert!(config.launcher.search_exe_dir); // default
    }

    #[test]
    fn test_config_serialize_roundtrip() {
        let config = Config {
            catalog: CatalogConfig {
                file_name: "songs.dat".to_string(),
                path: Some(PathBuf::from("/opt/o2/music.dat")),
                max_directory_path: 512,
            },
            launcher: LauncherConfig::default(),
            ui: UiConfig { dialogs: false },
            log: LogConfig {
                filter: "debug".to_string(),
            },
        };

        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_invalid_config_is_ignored() {
        assert!(parse("[catalog\nfile_name = 3").is_none());
    }

    #[test]
    fn test_save_creates_dir_and_loads_back() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("O2Launch").join("config");
        let config = Config {
            launcher: LauncherConfig {
                module_name: "GameDebug".to_string(),
                search_exe_dir: false,
                ..LauncherConfig::default()
            },
            ui: UiConfig { dialogs: false },
            ..Config::default()
        };

        save_to(&dir, &config).unwrap();

        let written = std::fs::read_to_string(dir.join(CONFIG_FILE_NAME)).unwrap();
        assert!(written.contains("[launcher]"));
        assert!(written.contains("module_name = \"GameDebug\""));
        assert_eq!(load_from(&dir), config);
    }

    #[test]
    fn test_load_from_missing_or_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_from(dir.path()), Config::default());

        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[ui\ndialogs = ").unwrap();
        assert_eq!(load_from(dir.path()), Config::default());
    }

    #[test]
    fn test_resolve_explicit_catalog_path() {
        let config = CatalogConfig {
            path: Some(PathBuf::from("/data/music.dat")),
            ..CatalogConfig::default()
        };
        assert_eq!(config.resolve_path(), Some(PathBuf::from("/data/music.dat")));
    }

    #[test]
    fn test_resolve_catalog_next_to_exe() {
        let config = CatalogConfig::default();
        let path = config.resolve_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "music.dat");
        assert_eq!(path.parent(), exe_dir().as_deref());
    }
}
