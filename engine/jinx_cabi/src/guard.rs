//! Failure containment for entry points.
//!
//! Every `extern "C"` function runs its body through [`guard`]: errors are
//! recorded in the thread-local slot and panics are caught before they can
//! unwind into the host. The caller then sees the function's sentinel.

use std::any::Any;
use std::ffi::{c_char, CStr, CString};
use std::panic::{self, AssertUnwindSafe};
use std::ptr;

use jinx_value::{Error, ErrorKind};
use thiserror::Error as ThisError;

use crate::error::set_last_error;
use crate::handle::jx_value;

/// Failures that only exist at the C boundary.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub(crate) enum BoundaryError {
    #[error("{0} must not be null")]
    NullPointer(&'static str),
    #[error("{0} is not valid UTF-8")]
    InvalidUtf8(&'static str),
    #[error("output contains an interior nul byte")]
    InteriorNul,
}

impl From<BoundaryError> for Error {
    fn from(err: BoundaryError) -> Self {
        Error::new(ErrorKind::InvalidOperation, err.to_string())
    }
}

/// Return value reported when an entry point fails.
pub(crate) trait Sentinel {
    fn sentinel() -> Self;
}

impl Sentinel for () {
    fn sentinel() -> Self {}
}

impl Sentinel for bool {
    fn sentinel() -> Self {
        false
    }
}

impl Sentinel for u64 {
    fn sentinel() -> Self {
        0
    }
}

impl Sentinel for i64 {
    fn sentinel() -> Self {
        0
    }
}

impl Sentinel for f64 {
    fn sentinel() -> Self {
        0.0
    }
}

impl<T> Sentinel for *mut T {
    fn sentinel() -> Self {
        ptr::null_mut()
    }
}

impl<T> Sentinel for *const T {
    fn sentinel() -> Self {
        ptr::null()
    }
}

impl Sentinel for jx_value {
    fn sentinel() -> Self {
        jx_value::UNDEFINED
    }
}

/// Run `body`, recording any error or panic and returning the sentinel.
pub(crate) fn guard<R: Sentinel>(body: impl FnOnce() -> Result<R, Error>) -> R {
    guard_or(body, |_| R::sentinel())
}

/// Like [`guard`], but the failure value is derived from the error.
pub(crate) fn guard_or<R>(
    body: impl FnOnce() -> Result<R, Error>,
    on_error: impl FnOnce(&Error) -> R,
) -> R {
    let err = match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(Ok(value)) => return value,
        Ok(Err(err)) => err,
        Err(payload) => Error::new(ErrorKind::Unknown, panic_message(payload.as_ref())),
    };
    let fallback = on_error(&err);
    set_last_error(err);
    fallback
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("panic: {msg}")
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("panic: {msg}")
    } else {
        "panic with a non-string payload".to_owned()
    }
}

/// Borrow a nul-terminated UTF-8 argument.
pub(crate) fn str_arg<'a>(ptr: *const c_char, what: &'static str) -> Result<&'a str, Error> {
    if ptr.is_null() {
        return Err(BoundaryError::NullPointer(what).into());
    }
    // SAFETY: non-null; the host guarantees a nul-terminated string that
    // outlives the call.
    let raw = unsafe { CStr::from_ptr(ptr) };
    raw.to_str()
        .map_err(|_| BoundaryError::InvalidUtf8(what).into())
}

/// Borrow an optional nul-terminated UTF-8 argument; null reads as `None`.
pub(crate) fn opt_str_arg<'a>(
    ptr: *const c_char,
    what: &'static str,
) -> Result<Option<&'a str>, Error> {
    if ptr.is_null() {
        Ok(None)
    } else {
        str_arg(ptr, what).map(Some)
    }
}

/// Reject a null object pointer.
pub(crate) fn non_null<T>(ptr: *const T, what: &'static str) -> Result<(), Error> {
    if ptr.is_null() {
        Err(BoundaryError::NullPointer(what).into())
    } else {
        Ok(())
    }
}

/// Hand an owned string to the host. Released with `jx_str_free`.
pub(crate) fn into_c_string(text: String) -> Result<*mut c_char, Error> {
    CString::new(text)
        .map(CString::into_raw)
        .map_err(|_| BoundaryError::InteriorNul.into())
}

#[cfg(test)]
mod tests;
