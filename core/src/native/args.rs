//! Wide-character argument vector for the native entry point.

use std::ffi::OsStr;
use std::ffi::c_int;

use super::LaunchError;

/// Character unit of the entry point's strings (`wchar_t`).
///
/// UTF-16 code units on Windows, UTF-32 code points on Unix.
#[cfg(windows)]
pub type WideChar = u16;
#[cfg(unix)]
pub type WideChar = libc::wchar_t;

/// Arguments in the `argc`/`argv` shape of a C `wmain`.
///
/// `argv` points at `argc` NUL-terminated wide strings followed by a null
/// pointer. The pointers stay valid for as long as the vector is alive.
#[derive(Debug)]
pub struct ArgVector {
    args: Vec<Vec<WideChar>>,
    ptrs: Vec<*const WideChar>,
}

impl ArgVector {
    /// Widen each argument. Fails if any argument contains a NUL.
    ///
    /// On Windows the UTF-16 form is passed through unchanged. On Unix the
    /// bytes are decoded as UTF-8, with invalid sequences replaced by U+FFFD.
    pub fn new<I, S>(args: I) -> Result<Self, LaunchError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args = args
            .into_iter()
            .enumerate()
            .map(|(index, arg)| {
                let mut wide = widen(arg.as_ref());
                if wide.contains(&0) {
                    return Err(LaunchError::InvalidArgument { index });
                }
                wide.push(0);
                Ok(wide)
            })
            .collect::<Result<Vec<_>, _>>()?;

        // The buffers live on the heap, so these pointers survive moves of `args`.
        let ptrs = args
            .iter()
            .map(|arg| arg.as_ptr())
            .chain(std::iter::once(std::ptr::null()))
            .collect();

        Ok(Self { args, ptrs })
    }

    /// Number of arguments, excluding the terminating null.
    pub fn argc(&self) -> c_int {
        c_int::try_from(self.args.len()).unwrap_or(c_int::MAX)
    }

    /// Pointer to the null-terminated array of argument pointers.
    pub fn argv(&self) -> *const *const WideChar {
        self.ptrs.as_ptr()
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Arguments decoded back to text, for logging and diagnostics.
    pub fn iter(&self) -> impl Iterator<Item = String> + '_ {
        self.args
            .iter()
            .map(|arg| narrow(&arg[..arg.len() - 1]))
    }
}

#[cfg(windows)]
fn widen(arg: &OsStr) -> Vec<WideChar> {
    use std::os::windows::ffi::OsStrExt;
    arg.encode_wide().collect()
}

#[cfg(unix)]
fn widen(arg: &OsStr) -> Vec<WideChar> {
    use std::os::unix::ffi::OsStrExt;
    String::from_utf8_lossy(arg.as_bytes())
        .chars()
        .map(|c| u32::from(c) as WideChar)
        .collect()
}

#[cfg(windows)]
pub(crate) fn narrow(wide: &[WideChar]) -> String {
    String::from_utf16_lossy(wide)
}

#[cfg(unix)]
pub(crate) fn narrow(wide: &[WideChar]) -> String {
    wide.iter()
        .map(|&unit| char::from_u32(unit as u32).unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}
