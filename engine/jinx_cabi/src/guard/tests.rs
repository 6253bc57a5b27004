#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Tests use unwrap for brevity"
)]

use super::*;
use crate::error::{jx_err_clear, jx_err_get_kind, jx_err_is_set, jx_err_kind};
use pretty_assertions::assert_eq;

#[test]
fn success_leaves_the_slot_alone() {
    jx_err_clear();
    assert_eq!(guard(|| Ok(7_u64)), 7);
    assert!(!jx_err_is_set());
}

#[test]
fn error_records_and_returns_sentinel() {
    jx_err_clear();
    let out: bool = guard(|| Err(ErrorKind::NonKey.into()));
    assert!(!out);
    assert_eq!(jx_err_get_kind(), jx_err_kind::JX_ERR_KIND_NON_KEY);
}

#[test]
fn panic_is_contained_as_unknown() {
    jx_err_clear();
    let out: *mut c_char = guard(|| panic!("boom"));
    assert!(out.is_null());
    assert_eq!(jx_err_get_kind(), jx_err_kind::JX_ERR_KIND_UNKNOWN);
    assert!(jx_err_is_set());
}

#[test]
fn guard_or_derives_the_fallback() {
    jx_err_clear();
    let out = guard_or(
        || Err(Error::new(ErrorKind::SyntaxError, "bad")),
        |err| err.to_string(),
    );
    assert_eq!(out, "syntax error: bad");
}

#[test]
fn boundary_errors_are_invalid_operations() {
    let err = Error::from(BoundaryError::NullPointer("env"));
    assert_eq!(err.kind(), ErrorKind::InvalidOperation);
    assert_eq!(err.detail(), Some("env must not be null"));
}

#[test]
fn str_arg_rejects_null_and_bad_utf8() {
    assert_eq!(
        str_arg(ptr::null(), "name").unwrap_err().detail(),
        Some("name must not be null")
    );
    let bad = b"\xff\xfe\0";
    let err = str_arg(bad.as_ptr().cast(), "name").unwrap_err();
    assert_eq!(err.detail(), Some("name is not valid UTF-8"));
    assert_eq!(str_arg(c"ok".as_ptr(), "name").unwrap(), "ok");
    assert_eq!(opt_str_arg(ptr::null(), "prefix").unwrap(), None);
}

#[test]
fn interior_nul_cannot_cross() {
    let err = into_c_string("a\0b".to_owned()).unwrap_err();
    assert_eq!(err.detail(), Some("output contains an interior nul byte"));
}
