//! Native module launcher
//!
//! Hands the process over to the game library: load `Game`, resolve
//! `local_main`, call it with the forwarded arguments as wide strings and
//! unload it again.
//!
//! ```text
//! Idle -> Loaded -> Resolved -> Invoked -> Unloaded
//!   \        \         \
//!    +--------+---------+--> Failed
//! ```
//!
//! The loaded module is owned by the launch attempt and released when it is
//! dropped, so every path out of a successful load unloads it, including a
//! failed symbol lookup.
//!
//! Platform specifics live behind [`ModuleBackend`] / [`NativeModule`] /
//! [`NativeEntryPoint`]; [`PlatformBackend`] is the real loader for the
//! current target.

mod args;
#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

use std::ffi::{CStr, CString};
use std::path::{Path, PathBuf};

use o2launch_shared::{NATIVE_ENTRY_SYMBOL, NATIVE_MODULE_NAME};

use crate::config::{LauncherConfig, exe_dir};

pub use args::{ArgVector, WideChar};
#[cfg(unix)]
pub use unix::{DlBackend as PlatformBackend, DlEntryPoint, DlModule};
#[cfg(windows)]
pub use windows::{Win32Backend as PlatformBackend, Win32EntryPoint, Win32Module};

/// Process exit code reported when the module could not be started.
pub const LAUNCH_FAILURE_CODE: i32 = -1;

/// Signature of the exported entry point: `int local_main(int argc, wchar_t** argv)`.
pub type LocalMainFn =
    unsafe extern "C" fn(argc: std::ffi::c_int, argv: *const *const WideChar) -> std::ffi::c_int;

/// Stage of a launch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchStage {
    Idle,
    Loaded,
    Resolved,
    Invoked,
    Unloaded,
    Failed,
}

/// Error reported by the operating system's dynamic loader.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} (error code: {code})")]
pub struct OsError {
    /// Raw OS error code (`GetLastError` / `errno`)
    pub code: i32,
    /// Loader diagnostic text
    pub message: String,
}

impl OsError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Why the game could not be started.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LaunchError {
    #[error("Failed to load library '{module}': {source}")]
    ModuleLoadFailed {
        module: String,
        #[source]
        source: OsError,
    },

    #[error("{module} does not contain entry point '{symbol}': {source}")]
    SymbolResolveFailed {
        module: String,
        symbol: String,
        #[source]
        source: OsError,
    },

    #[error("argument {index} contains a NUL byte")]
    InvalidArgument { index: usize },
}

impl LaunchError {
    /// Stage the attempt had reached when it failed.
    pub fn failed_at(&self) -> LaunchStage {
        match self {
            Self::ModuleLoadFailed { .. } | Self::InvalidArgument { .. } => LaunchStage::Idle,
            Self::SymbolResolveFailed { .. } => LaunchStage::Loaded,
        }
    }

    /// OS error code behind the failure, if any.
    pub fn os_code(&self) -> Option<i32> {
        match self {
            Self::ModuleLoadFailed { source, .. } | Self::SymbolResolveFailed { source, .. } => {
                Some(source.code)
            }
            Self::InvalidArgument { .. } => None,
        }
    }

    /// Legacy process exit code for a failed launch.
    pub fn exit_code(&self) -> i32 {
        LAUNCH_FAILURE_CODE
    }
}

/// A resolved entry point that can receive control.
pub trait NativeEntryPoint {
    /// Call the entry point; blocks until it returns.
    fn invoke(&self, args: &ArgVector) -> i32;
}

/// A loaded module. Dropping it unloads the module.
pub trait NativeModule {
    type EntryPoint<'m>: NativeEntryPoint
    where
        Self: 'm;

    /// Look up an exported entry point.
    fn resolve(&self, symbol: &CStr) -> Result<Self::EntryPoint<'_>, OsError>;
}

/// Loads modules from disk.
pub trait ModuleBackend {
    type Module: NativeModule;

    /// Load the module at `path`. A bare file name uses the loader's search order.
    fn load(&self, path: &Path) -> Result<Self::Module, OsError>;
}

/// Launches the game module with the process arguments.
///
/// # Examples
///
/// ```ignore
/// let code = match NativeLauncher::new().run(std::env::args_os()) {
///     Ok(code) => code,
///     Err(e) => e.exit_code(),
/// };
/// ```
#[derive(Debug, Clone)]
pub struct NativeLauncher<B = PlatformBackend> {
    backend: B,
    module_name: String,
    entry_symbol: String,
    search_dirs: Vec<PathBuf>,
}

impl NativeLauncher<PlatformBackend> {
    /// Launcher for `Game` / `local_main`, searching the executable directory first.
    pub fn new() -> Self {
        Self::from_config(&LauncherConfig::default())
    }

    /// Launcher configured from the `[launcher]` section.
    pub fn from_config(config: &LauncherConfig) -> Self {
        let mut launcher = Self::with_backend(PlatformBackend::default())
            .module_name(&config.module_name)
            .entry_symbol(&config.entry_symbol);
        if config.search_exe_dir
            && let Some(dir) = exe_dir()
        {
            launcher = launcher.search_dir(dir);
        }
        launcher
    }
}

impl Default for NativeLauncher<PlatformBackend> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: ModuleBackend> NativeLauncher<B> {
    /// Launcher using a specific backend, with no search directories.
    pub fn with_backend(backend: B) -> Self {
        Self {
            backend,
            module_name: NATIVE_MODULE_NAME.to_string(),
            entry_symbol: NATIVE_ENTRY_SYMBOL.to_string(),
            search_dirs: Vec::new(),
        }
    }

    /// Set the module short name (without platform suffix).
    pub fn module_name(mut self, name: impl Into<String>) -> Self {
        self.module_name = name.into();
        self
    }

    /// Set the exported entry point name.
    pub fn entry_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.entry_symbol = symbol.into();
        self
    }

    /// Add a directory searched before the loader's default search.
    pub fn search_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_dirs.push(dir.into());
        self
    }

    /// Module file name with the platform suffix (`Game.dll`, `Game.so`, `Game.dylib`).
    pub fn module_file_name(&self) -> String {
        format!("{}{}", self.module_name, std::env::consts::DLL_SUFFIX)
    }

    /// Paths tried in order: each search directory, then the bare file name.
    pub fn candidates(&self) -> Vec<PathBuf> {
        let file_name = self.module_file_name();
        self.search_dirs
            .iter()
            .map(|dir| dir.join(&file_name))
            .chain(std::iter::once(PathBuf::from(&file_name)))
            .collect()
    }

    /// Load the module, call its entry point with `args`, unload it.
    ///
    /// Returns the entry point's result. Blocks for as long as the game runs.
    pub fn run<I, S>(&self, args: I) -> Result<i32, LaunchError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        let args = ArgVector::new(args)?;
        self.run_with(&args)
    }

    /// Same as [`run`](Self::run) with an already built argument vector.
    pub fn run_with(&self, args: &ArgVector) -> Result<i32, LaunchError> {
        let module_file = self.module_file_name();

        let module = self.load_module()?;
        tracing::debug!(stage = ?LaunchStage::Loaded, "Loaded {}", module_file);

        let symbol = CString::new(self.entry_symbol.as_str()).map_err(|_| {
            LaunchError::SymbolResolveFailed {
                module: module_file.clone(),
                symbol: self.entry_symbol.clone(),
                source: OsError::new(0, "symbol name contains a NUL byte"),
            }
        })?;

        let entry = module
            .resolve(&symbol)
            .map_err(|source| LaunchError::SymbolResolveFailed {
                module: module_file.clone(),
                symbol: self.entry_symbol.clone(),
                source,
            })?;
        tracing::debug!(stage = ?LaunchStage::Resolved, "Resolved {}", self.entry_symbol);

        tracing::info!(
            "Handing control to {}!{} with {} argument(s)",
            module_file,
            self.entry_symbol,
            args.len()
        );
        let code = entry.invoke(args);
        tracing::debug!(stage = ?LaunchStage::Invoked, "Entry point returned {}", code);

        drop(entry);
        drop(module);
        tracing::debug!(stage = ?LaunchStage::Unloaded, "Unloaded {}", module_file);

        Ok(code)
    }

    /// Try each candidate path, returning the first module that loads.
    fn load_module(&self) -> Result<B::Module, LaunchError> {
        let file_name = self.module_file_name();

        let located = self
            .search_dirs
            .iter()
            .map(|dir| dir.join(&file_name))
            .filter(|path| path.exists());
        for path in located {
            match self.backend.load(&path) {
                Ok(module) => return Ok(module),
                Err(e) => tracing::warn!("Failed to load {}: {}", path.display(), e),
            }
        }

        // Leave the search order to the platform loader.
        self.backend
            .load(Path::new(&file_name))
            .map_err(|source| LaunchError::ModuleLoadFailed {
                module: file_name.clone(),
                source,
            })
    }
}
