//! `dlopen` backend.

use std::ffi::{CStr, CString, c_void};
use std::marker::PhantomData;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;

use super::{ArgVector, LocalMainFn, ModuleBackend, NativeEntryPoint, NativeModule, OsError};

/// Loads shared objects with `dlopen`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DlBackend;

/// A `dlopen` handle; `dlclose`d on drop.
#[derive(Debug)]
pub struct DlModule {
    handle: NonNull<c_void>,
    path: PathBuf,
}

/// `local_main` resolved from a [`DlModule`]; cannot outlive it.
#[derive(Debug)]
pub struct DlEntryPoint<'m> {
    func: LocalMainFn,
    _module: PhantomData<&'m DlModule>,
}

impl ModuleBackend for DlBackend {
    type Module = DlModule;

    fn load(&self, path: &Path) -> Result<DlModule, OsError> {
        let c_path = CString::new(path.as_os_str().as_bytes())
            .map_err(|_| OsError::new(libc::EINVAL, "module path contains a NUL byte"))?;

        clear_errno();
        // SAFETY: c_path is a valid NUL-terminated string for the duration of the call.
        let handle = unsafe { libc::dlopen(c_path.as_ptr(), libc::RTLD_LAZY | libc::RTLD_LOCAL) };

        match NonNull::new(handle) {
            Some(handle) => Ok(DlModule {
                handle,
                path: path.to_path_buf(),
            }),
            None => {
                let code = std::io::Error::last_os_error().raw_os_error().unwrap_or(0);
                Err(last_dl_error(code))
            }
        }
    }
}

impl NativeModule for DlModule {
    type EntryPoint<'m> = DlEntryPoint<'m>;

    fn resolve(&self, symbol: &CStr) -> Result<DlEntryPoint<'_>, OsError> {
        // SAFETY: clears any stale error so a null result can be attributed to this lookup.
        unsafe { libc::dlerror() };

        // SAFETY: handle came from a successful dlopen and is still open.
        let address = unsafe { libc::dlsym(self.handle.as_ptr(), symbol.as_ptr()) };
        if address.is_null() {
            return Err(last_dl_error(0));
        }

        // SAFETY: the module contract is that this symbol is a C function
        // with the `local_main` signature.
        let func = unsafe { std::mem::transmute::<*mut c_void, LocalMainFn>(address) };

        Ok(DlEntryPoint {
            func,
            _module: PhantomData,
        })
    }
}

impl Drop for DlModule {
    fn drop(&mut self) {
        // SAFETY: handle came from a successful dlopen and every entry point
        // borrowed from it has been dropped.
        let status = unsafe { libc::dlclose(self.handle.as_ptr()) };
        if status != 0 {
            tracing::warn!("Failed to unload {}: {}", self.path.display(), last_dl_error(0));
        }
    }
}

impl NativeEntryPoint for DlEntryPoint<'_> {
    fn invoke(&self, args: &ArgVector) -> i32 {
        // SAFETY: argv is a null-terminated array of argc valid C strings that
        // outlives the call, and the module is still loaded.
        unsafe { (self.func)(args.argc(), args.argv()) }
    }
}

/// Pair the loader's diagnostic with an error code.
///
/// `dlerror` carries no numeric code. Only `dlopen` leaves a meaningful
/// `errno` behind (e.g. `ENOENT`); `dlsym` and `dlclose` report 0.
fn last_dl_error(code: i32) -> OsError {
    // SAFETY: dlerror returns null or a NUL-terminated string valid until the next dl* call.
    let message = unsafe {
        let text = libc::dlerror();
        if text.is_null() {
            "unknown dynamic loader error".to_string()
        } else {
            CStr::from_ptr(text).to_string_lossy().into_owned()
        }
    };

    OsError::new(code, message)
}

/// Reset `errno` so a failed `dlopen` is not blamed on an earlier call.
fn clear_errno() {
    // SAFETY: the errno location is a valid thread-local int.
    #[cfg(any(target_os = "linux", target_os = "android"))]
    unsafe {
        *libc::__errno_location() = 0;
    };
    // SAFETY: as above.
    #[cfg(any(target_os = "macos", target_os = "ios", target_os = "freebsd"))]
    unsafe {
        *libc::__error() = 0;
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_library() {
        let err = DlBackend
            .load(Path::new("/nonexistent/o2launch/Game.so"))
            .unwrap_err();
        assert!(err.message.contains("Game.so"));
    }

    #[cfg(all(target_os = "linux", target_env = "gnu"))]
    #[test]
    fn test_resolve_failure_ignores_stale_errno() {
        let module = DlBackend.load(Path::new("libc.so.6")).unwrap();
        // Leave a stale errno behind.
        let _ = std::fs::File::open("/nonexistent/o2launch/stale");

        let err = module.resolve(c"local_main").unwrap_err();
        assert_eq!(err.code, 0);
    }

    #[cfg(all(target_os = "linux", target_env = "gnu"))]
    #[test]
    fn test_resolve_missing_symbol() {
        let module = DlBackend.load(Path::new("libc.so.6")).unwrap();
        let err = module.resolve(c"local_main").unwrap_err();
        assert!(err.message.contains("local_main"));
        assert_eq!(err.code, 0);
    }

    #[cfg(all(target_os = "linux", target_env = "gnu"))]
    #[test]
    fn test_resolve_and_call_exported_function() {
        // `getpid` ignores its arguments, which makes it a safe stand-in for
        // an entry point: the call goes through the same resolve/invoke path.
        let module = DlBackend.load(Path::new("libc.so.6")).unwrap();
        let entry = module.resolve(c"getpid").unwrap();
        let args = ArgVector::new(["game"]).unwrap();

        assert_eq!(entry.invoke(&args), std::process::id() as i32);
    }
}
