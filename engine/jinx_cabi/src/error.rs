//! The thread-local error slot.
//!
//! Only failing calls write the slot and only `jx_err_clear` resets it, so
//! the host must read it right after a call returned its sentinel. Each
//! thread sees its own slot.

use std::cell::RefCell;
use std::ffi::{c_char, CString};
use std::ptr;

use jinx_value::{Error, ErrorKind};
use tracing::debug;

struct LastError {
    error: Error,
    detail: Option<CString>,
    name: Option<CString>,
}

thread_local! {
    static LAST_ERROR: RefCell<Option<LastError>> = const { RefCell::new(None) };
}

/// Replace the current error.
pub(crate) fn set_last_error(error: Error) {
    debug!(kind = ?error.kind(), %error, "error recorded");
    let detail = error.detail().and_then(|s| CString::new(s).ok());
    let name = error.name().and_then(|s| CString::new(s).ok());
    LAST_ERROR.with_borrow_mut(|slot| {
        *slot = Some(LastError {
            error,
            detail,
            name,
        });
    });
}

/// Kind of the current error, mirrored by `jx_err_kind` in the header.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum jx_err_kind {
    JX_ERR_KIND_NON_PRIMITIVE,
    JX_ERR_KIND_NON_KEY,
    JX_ERR_KIND_INVALID_OPERATION,
    JX_ERR_KIND_SYNTAX_ERROR,
    JX_ERR_KIND_TEMPLATE_NOT_FOUND,
    JX_ERR_KIND_TOO_MANY_ARGUMENTS,
    JX_ERR_KIND_MISSING_ARGUMENT,
    JX_ERR_KIND_UNKNOWN_FILTER,
    JX_ERR_KIND_UNKNOWN_FUNCTION,
    JX_ERR_KIND_UNKNOWN_TEST,
    JX_ERR_KIND_UNKNOWN_METHOD,
    JX_ERR_KIND_BAD_ESCAPE,
    JX_ERR_KIND_UNDEFINED_ERROR,
    JX_ERR_KIND_BAD_SERIALIZATION,
    JX_ERR_KIND_BAD_INCLUDE,
    JX_ERR_KIND_EVAL_BLOCK,
    JX_ERR_KIND_CANNOT_UNPACK,
    JX_ERR_KIND_WRITE_FAILURE,
    JX_ERR_KIND_UNKNOWN,
}

impl From<ErrorKind> for jx_err_kind {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::NonPrimitive => jx_err_kind::JX_ERR_KIND_NON_PRIMITIVE,
            ErrorKind::NonKey => jx_err_kind::JX_ERR_KIND_NON_KEY,
            ErrorKind::InvalidOperation => jx_err_kind::JX_ERR_KIND_INVALID_OPERATION,
            ErrorKind::SyntaxError => jx_err_kind::JX_ERR_KIND_SYNTAX_ERROR,
            ErrorKind::TemplateNotFound => jx_err_kind::JX_ERR_KIND_TEMPLATE_NOT_FOUND,
            ErrorKind::TooManyArguments => jx_err_kind::JX_ERR_KIND_TOO_MANY_ARGUMENTS,
            ErrorKind::MissingArgument => jx_err_kind::JX_ERR_KIND_MISSING_ARGUMENT,
            ErrorKind::UnknownFilter => jx_err_kind::JX_ERR_KIND_UNKNOWN_FILTER,
            ErrorKind::UnknownFunction => jx_err_kind::JX_ERR_KIND_UNKNOWN_FUNCTION,
            ErrorKind::UnknownTest => jx_err_kind::JX_ERR_KIND_UNKNOWN_TEST,
            ErrorKind::UnknownMethod => jx_err_kind::JX_ERR_KIND_UNKNOWN_METHOD,
            ErrorKind::BadEscape => jx_err_kind::JX_ERR_KIND_BAD_ESCAPE,
            ErrorKind::UndefinedError => jx_err_kind::JX_ERR_KIND_UNDEFINED_ERROR,
            ErrorKind::BadSerialization => jx_err_kind::JX_ERR_KIND_BAD_SERIALIZATION,
            ErrorKind::BadInclude => jx_err_kind::JX_ERR_KIND_BAD_INCLUDE,
            ErrorKind::EvalBlock => jx_err_kind::JX_ERR_KIND_EVAL_BLOCK,
            ErrorKind::CannotUnpack => jx_err_kind::JX_ERR_KIND_CANNOT_UNPACK,
            ErrorKind::WriteFailure => jx_err_kind::JX_ERR_KIND_WRITE_FAILURE,
            ErrorKind::Unknown => jx_err_kind::JX_ERR_KIND_UNKNOWN,
        }
    }
}

/// Returns `true` if an error is recorded on this thread.
#[no_mangle]
pub extern "C" fn jx_err_is_set() -> bool {
    LAST_ERROR.with_borrow(Option::is_some)
}

/// Forget the recorded error.
#[no_mangle]
pub extern "C" fn jx_err_clear() {
    LAST_ERROR.with_borrow_mut(|slot| *slot = None);
}

/// Kind of the recorded error; `JX_ERR_KIND_UNKNOWN` when none is set.
#[no_mangle]
pub extern "C" fn jx_err_get_kind() -> jx_err_kind {
    LAST_ERROR.with_borrow(|slot| {
        slot.as_ref()
            .map_or(jx_err_kind::JX_ERR_KIND_UNKNOWN, |last| {
                last.error.kind().into()
            })
    })
}

/// Detail message of the recorded error, or null.
///
/// The pointer stays valid until the slot is next written or cleared.
#[no_mangle]
pub extern "C" fn jx_err_get_detail() -> *const c_char {
    LAST_ERROR.with_borrow(|slot| {
        slot.as_ref()
            .and_then(|last| last.detail.as_ref())
            .map_or(ptr::null(), |s| s.as_ptr())
    })
}

/// Name of the template the recorded error belongs to, or null.
///
/// The pointer stays valid until the slot is next written or cleared.
#[no_mangle]
pub extern "C" fn jx_err_get_template_name() -> *const c_char {
    LAST_ERROR.with_borrow(|slot| {
        slot.as_ref()
            .and_then(|last| last.name.as_ref())
            .map_or(ptr::null(), |s| s.as_ptr())
    })
}

/// Line of the recorded error, or `0` if unknown.
#[no_mangle]
pub extern "C" fn jx_err_get_line() -> u32 {
    LAST_ERROR.with_borrow(|slot| {
        slot.as_ref()
            .and_then(|last| last.error.line())
            .map_or(0, |line| u32::try_from(line).unwrap_or(u32::MAX))
    })
}

/// Print the recorded error to stderr.
///
/// Returns `false` if no error is set.
#[no_mangle]
pub extern "C" fn jx_err_print() -> bool {
    LAST_ERROR.with_borrow(|slot| {
        let Some(last) = slot else {
            return false;
        };
        eprintln!("{}", report(&last.error));
        true
    })
}

/// Multi-line report including the source excerpt and causes.
fn report(err: &Error) -> String {
    let mut out = format!("error: {err}");
    if let Some(info) = err.debug_info() {
        out.push('\n');
        out.push_str(info);
    }
    for cause in err.causes() {
        out.push_str("\n\ncaused by: ");
        out.push_str(cause);
    }
    out
}
