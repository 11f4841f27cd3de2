//! `LoadLibraryW` backend.

use std::ffi::CStr;
use std::iter;
use std::marker::PhantomData;
use std::os::windows::ffi::OsStrExt;
use std::path::{Path, PathBuf};

use windows::Win32::Foundation::{FreeLibrary, GetLastError, HMODULE};
use windows::Win32::System::LibraryLoader::{GetProcAddress, LoadLibraryW};
use windows::core::{PCSTR, PCWSTR};

use super::{ArgVector, LocalMainFn, ModuleBackend, NativeEntryPoint, NativeModule, OsError};

/// Loads DLLs with `LoadLibraryW`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Win32Backend;

/// A loaded DLL; `FreeLibrary`d on drop.
#[derive(Debug)]
pub struct Win32Module {
    handle: HMODULE,
    path: PathBuf,
}

/// `local_main` resolved from a [`Win32Module`]; cannot outlive it.
#[derive(Debug)]
pub struct Win32EntryPoint<'m> {
    func: LocalMainFn,
    _module: PhantomData<&'m Win32Module>,
}

impl ModuleBackend for Win32Backend {
    type Module = Win32Module;

    fn load(&self, path: &Path) -> Result<Win32Module, OsError> {
        let wide: Vec<u16> = path
            .as_os_str()
            .encode_wide()
            .chain(iter::once(0))
            .collect();

        // SAFETY: wide is a NUL-terminated UTF-16 string that outlives the call.
        match unsafe { LoadLibraryW(PCWSTR(wide.as_ptr())) } {
            Ok(handle) => Ok(Win32Module {
                handle,
                path: path.to_path_buf(),
            }),
            Err(_) => Err(last_win32_error()),
        }
    }
}

impl NativeModule for Win32Module {
    type EntryPoint<'m> = Win32EntryPoint<'m>;

    fn resolve(&self, symbol: &CStr) -> Result<Win32EntryPoint<'_>, OsError> {
        // SAFETY: handle is a live module and symbol is NUL-terminated.
        let address = unsafe { GetProcAddress(self.handle, PCSTR(symbol.as_ptr().cast())) };
        let Some(address) = address else {
            return Err(last_win32_error());
        };

        // SAFETY: the module contract is that this export is a C function
        // with the `local_main` signature.
        let func = unsafe {
            std::mem::transmute::<unsafe extern "system" fn() -> isize, LocalMainFn>(address)
        };

        Ok(Win32EntryPoint {
            func,
            _module: PhantomData,
        })
    }
}

impl Drop for Win32Module {
    fn drop(&mut self) {
        // SAFETY: handle came from a successful LoadLibraryW and every entry
        // point borrowed from it has been dropped.
        if unsafe { FreeLibrary(self.handle) }.is_err() {
            tracing::warn!("Failed to unload {}: {}", self.path.display(), last_win32_error());
        }
    }
}

impl NativeEntryPoint for Win32EntryPoint<'_> {
    fn invoke(&self, args: &ArgVector) -> i32 {
        // SAFETY: argv is a null-terminated array of argc valid C strings that
        // outlives the call, and the module is still loaded.
        unsafe { (self.func)(args.argc(), args.argv()) }
    }
}

/// Read `GetLastError` and its system message.
fn last_win32_error() -> OsError {
    // SAFETY: GetLastError reads thread-local state set by the just-failed call.
    let error = unsafe { GetLastError() };
    let message = error.to_hresult().message();
    OsError::new(error.0 as i32, message.trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_library() {
        let err = Win32Backend
            .load(Path::new("o2launch-missing-module.dll"))
            .unwrap_err();
        // ERROR_MOD_NOT_FOUND
        assert_eq!(err.code, 126);
    }

    #[test]
    fn test_resolve_missing_symbol() {
        let module = Win32Backend.load(Path::new("kernel32.dll")).unwrap();
        let err = module.resolve(c"local_main").unwrap_err();
        // ERROR_PROC_NOT_FOUND
        assert_eq!(err.code, 127);
    }
}
