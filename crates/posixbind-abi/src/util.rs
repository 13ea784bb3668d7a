use std::ffi::{CString, c_char};

use crate::error::Error;

/// Copy `s` into a NUL-terminated string, rejecting interior NULs.
pub(crate) fn to_cstring(call: &'static str, s: &str) -> Result<CString, Error> {
    CString::new(s).map_err(|_| Error::InvalidArgument {
        call,
        reason: "embedded NUL byte",
    })
}

/// The bytes of a C string stored in `buf`, up to (not including) the
/// first NUL. The whole buffer when it holds no NUL.
pub(crate) fn c_buffer_bytes(buf: &[u8]) -> &[u8] {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    &buf[..end]
}

/// Owned, lossily decoded copy of a C string field. Null reads as empty.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string that stays valid
/// for the duration of the call.
pub(crate) unsafe fn lossy_string(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    // SAFETY: caller guarantees a valid NUL-terminated string.
    unsafe { std::ffi::CStr::from_ptr(ptr) }
        .to_string_lossy()
        .into_owned()
}
