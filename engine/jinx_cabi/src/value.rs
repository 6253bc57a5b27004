//! Value entry points.
//!
//! Handles passed as `*mut jx_value` are borrowed in place. Handles passed
//! by value are consumed by `append`, `set_key` and `set_string_key` and
//! borrowed by every other function.

use std::ffi::c_char;
use std::mem;

use jinx_value::{Error, ErrorKind, Value, ValueKind};

use crate::guard::{guard, into_c_string, non_null, str_arg};
use crate::handle::{jx_value, jx_value_iter};

/// Kind of a value, mirrored by `jx_value_kind` in the header.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum jx_value_kind {
    JX_VALUE_KIND_UNDEFINED,
    JX_VALUE_KIND_NONE,
    JX_VALUE_KIND_BOOL,
    JX_VALUE_KIND_NUMBER,
    JX_VALUE_KIND_STRING,
    JX_VALUE_KIND_BYTES,
    JX_VALUE_KIND_SEQ,
    JX_VALUE_KIND_MAP,
    JX_VALUE_KIND_ITERABLE,
    JX_VALUE_KIND_PLAIN,
    JX_VALUE_KIND_INVALID,
}

impl From<ValueKind> for jx_value_kind {
    fn from(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Undefined => jx_value_kind::JX_VALUE_KIND_UNDEFINED,
            ValueKind::None => jx_value_kind::JX_VALUE_KIND_NONE,
            ValueKind::Bool => jx_value_kind::JX_VALUE_KIND_BOOL,
            ValueKind::Number => jx_value_kind::JX_VALUE_KIND_NUMBER,
            ValueKind::String => jx_value_kind::JX_VALUE_KIND_STRING,
            ValueKind::Bytes => jx_value_kind::JX_VALUE_KIND_BYTES,
            ValueKind::Seq => jx_value_kind::JX_VALUE_KIND_SEQ,
            ValueKind::Map => jx_value_kind::JX_VALUE_KIND_MAP,
            ValueKind::Iterable => jx_value_kind::JX_VALUE_KIND_ITERABLE,
            ValueKind::Plain => jx_value_kind::JX_VALUE_KIND_PLAIN,
            ValueKind::Invalid => jx_value_kind::JX_VALUE_KIND_INVALID,
        }
    }
}

/// Run `f` against the value behind a borrowed handle.
fn with_value<R>(value: &jx_value, f: impl FnOnce(&Value) -> R) -> R {
    // SAFETY: the host passes a live handle; the view is never dropped.
    let view = unsafe { value.borrow() };
    f(&view)
}

fn with_value_ptr<R>(
    slf: *mut jx_value,
    f: impl FnOnce(&Value) -> Result<R, Error>,
) -> Result<R, Error> {
    non_null(slf, "value")?;
    // SAFETY: non-null and pointing at a live handle.
    with_value(unsafe { &*slf }, f)
}

// ── Constructors ────────────────────────────────────────────────────────

#[no_mangle]
pub extern "C" fn jx_value_new_undefined() -> jx_value {
    jx_value::UNDEFINED
}

#[no_mangle]
pub extern "C" fn jx_value_new_none() -> jx_value {
    jx_value::from_value(Value::none())
}

#[no_mangle]
pub extern "C" fn jx_value_new_bool(val: bool) -> jx_value {
    jx_value::from_value(Value::from(val))
}

#[no_mangle]
pub extern "C" fn jx_value_new_i32(val: i32) -> jx_value {
    jx_value::from_value(Value::from(val))
}

#[no_mangle]
pub extern "C" fn jx_value_new_i64(val: i64) -> jx_value {
    jx_value::from_value(Value::from(val))
}

#[no_mangle]
pub extern "C" fn jx_value_new_u32(val: u32) -> jx_value {
    jx_value::from_value(Value::from(val))
}

#[no_mangle]
pub extern "C" fn jx_value_new_u64(val: u64) -> jx_value {
    jx_value::from_value(Value::from(val))
}

#[no_mangle]
pub extern "C" fn jx_value_new_f32(val: f32) -> jx_value {
    jx_value::from_value(Value::from(val))
}

#[no_mangle]
pub extern "C" fn jx_value_new_f64(val: f64) -> jx_value {
    jx_value::from_value(Value::from(val))
}

/// Copy a nul-terminated UTF-8 string into a new value.
///
/// Null or invalid UTF-8 records an error and yields undefined.
#[no_mangle]
pub extern "C" fn jx_value_new_string(s: *const c_char) -> jx_value {
    guard(|| {
        let s = str_arg(s, "string")?;
        Ok(jx_value::from_value(Value::string(s)))
    })
}

/// Copy `len` bytes into a new bytes value. `ptr` may be null if `len` is 0.
#[no_mangle]
pub extern "C" fn jx_value_new_bytes(ptr: *const c_char, len: usize) -> jx_value {
    guard(|| {
        if len == 0 {
            return Ok(jx_value::from_value(Value::bytes(Vec::new())));
        }
        non_null(ptr, "bytes")?;
        // SAFETY: non-null; the host guarantees `len` readable bytes.
        let bytes = unsafe { std::slice::from_raw_parts(ptr.cast::<u8>(), len) };
        Ok(jx_value::from_value(Value::bytes(bytes)))
    })
}

/// A new empty list.
#[no_mangle]
pub extern "C" fn jx_value_new_list() -> jx_value {
    jx_value::from_value(Value::new_seq())
}

/// A new empty object (insertion ordered map).
#[no_mangle]
pub extern "C" fn jx_value_new_object() -> jx_value {
    jx_value::from_value(Value::new_map())
}

// ── Containers ──────────────────────────────────────────────────────────

/// Append `item` to the list behind `slf`. Consumes `item`.
#[no_mangle]
pub extern "C" fn jx_value_append(slf: *mut jx_value, item: jx_value) -> bool {
    guard(|| {
        // SAFETY: the host moves `item` into this call.
        let item = unsafe { item.into_value() };
        with_value_ptr(slf, |list| list.append(item))?;
        Ok(true)
    })
}

/// Insert or replace `key` in the object behind `slf`. Consumes `key` and
/// `val`.
#[no_mangle]
pub extern "C" fn jx_value_set_key(slf: *mut jx_value, key: jx_value, val: jx_value) -> bool {
    guard(|| {
        // SAFETY: the host moves `key` and `val` into this call.
        let (key, val) = unsafe { (key.into_value(), val.into_value()) };
        with_value_ptr(slf, |map| map.set_key(key, val))?;
        Ok(true)
    })
}

/// Insert or replace a string key in the object behind `slf`. Consumes
/// `val`.
#[no_mangle]
pub extern "C" fn jx_value_set_string_key(
    slf: *mut jx_value,
    key: *const c_char,
    val: jx_value,
) -> bool {
    guard(|| {
        // SAFETY: the host moves `val` into this call.
        let val = unsafe { val.into_value() };
        let key = str_arg(key, "key")?;
        with_value_ptr(slf, |map| map.set_string_key(key, val))?;
        Ok(true)
    })
}

// ── Inspectors ──────────────────────────────────────────────────────────

#[no_mangle]
pub extern "C" fn jx_value_get_kind(value: jx_value) -> jx_value_kind {
    with_value(&value, |v| v.kind().into())
}

#[no_mangle]
pub extern "C" fn jx_value_is_number(value: jx_value) -> bool {
    with_value(&value, Value::is_number)
}

/// Truthiness as templates see it.
#[no_mangle]
pub extern "C" fn jx_value_is_true(value: jx_value) -> bool {
    with_value(&value, Value::is_true)
}

/// Length of a string, bytes, list or object. Other kinds record an error
/// and return 0.
#[no_mangle]
pub extern "C" fn jx_value_len(value: jx_value) -> u64 {
    guard(|| with_value(&value, |v| v.len().map(|n| n as u64)))
}

/// Element at `idx`. Missing elements yield undefined.
#[no_mangle]
pub extern "C" fn jx_value_get_by_index(value: jx_value, idx: u64) -> jx_value {
    with_value(&value, |v| jx_value::from_value(v.get_by_index(idx)))
}

/// Entry under a string key. Missing entries yield undefined.
#[no_mangle]
pub extern "C" fn jx_value_get_by_str(value: jx_value, key: *const c_char) -> jx_value {
    guard(|| {
        let key = str_arg(key, "key")?;
        Ok(with_value(&value, |v| jx_value::from_value(v.get_by_str(key))))
    })
}

/// Entry under an arbitrary key. Borrows `key`.
#[no_mangle]
pub extern "C" fn jx_value_get_by_value(value: jx_value, key: jx_value) -> jx_value {
    with_value(&key, |key| {
        with_value(&value, |v| jx_value::from_value(v.get_by_value(key)))
    })
}

/// Signed view of a number. Non-numbers and out of range values record an
/// error and return 0.
#[no_mangle]
pub extern "C" fn jx_value_as_i64(value: jx_value) -> i64 {
    guard(|| with_value(&value, Value::as_i64))
}

/// Unsigned view of a number. Non-numbers and out of range values record
/// an error and return 0.
#[no_mangle]
pub extern "C" fn jx_value_as_u64(value: jx_value) -> u64 {
    guard(|| with_value(&value, Value::as_u64))
}

/// Floating view of a number. Non-numbers record an error and return 0.
#[no_mangle]
pub extern "C" fn jx_value_as_f64(value: jx_value) -> f64 {
    guard(|| with_value(&value, Value::as_f64))
}

/// Borrow the contents of a string or bytes value without copying.
///
/// Writes the length to `len_out` (if non-null). The pointer is not
/// nul-terminated and stays valid while the value is alive. Other kinds
/// record an error and return null.
#[no_mangle]
pub extern "C" fn jx_value_as_bytes(value: jx_value, len_out: *mut usize) -> *const c_char {
    guard(|| {
        let (ptr, len) = with_value(&value, |v| {
            v.as_bytes()
                .map(|bytes| (bytes.as_ptr().cast::<c_char>(), bytes.len()))
                .ok_or_else(|| {
                    Error::new(
                        ErrorKind::InvalidOperation,
                        format!("cannot borrow bytes of {}", v.kind()),
                    )
                })
        })?;
        if !len_out.is_null() {
            // SAFETY: non-null; the host passes a writable slot.
            unsafe { len_out.write(len) };
        }
        Ok(ptr)
    })
}

/// Render a value to text. Every kind has a text form.
///
/// Returns an owned string released with `jx_str_free`.
#[no_mangle]
pub extern "C" fn jx_value_to_str(value: jx_value) -> *mut c_char {
    guard(|| into_c_string(with_value(&value, ToString::to_string)))
}

/// Print the structure of a value to stderr.
#[no_mangle]
pub extern "C" fn jx_value_dbg(value: jx_value) {
    with_value(&value, |v| eprintln!("{v:?}"));
}

// ── Reference Counting ──────────────────────────────────────────────────

/// Add an owner to the value behind `value`.
#[no_mangle]
pub extern "C" fn jx_value_incref(value: *mut jx_value) {
    guard(|| {
        with_value_ptr(value, |v| {
            mem::forget(v.clone());
            Ok(())
        })
    });
}

/// Release the handle's reference and reset it to undefined.
///
/// The last release frees the payload, releasing container elements in
/// turn.
#[no_mangle]
pub extern "C" fn jx_value_decref(value: *mut jx_value) {
    guard(|| {
        non_null(value, "value")?;
        // SAFETY: non-null and pointing at a live handle. The slot is reset
        // so a second release is harmless.
        unsafe {
            let handle = value.replace(jx_value::UNDEFINED);
            drop(handle.into_value());
        }
        Ok(())
    });
}

// ── Iteration ───────────────────────────────────────────────────────────

/// Start iterating a list (elements), object (keys) or iterable.
///
/// Returns an owned iterator released with `jx_value_iter_free`, or null
/// if the value cannot be iterated.
#[no_mangle]
pub extern "C" fn jx_value_try_iter(value: jx_value) -> *mut jx_value_iter {
    guard(|| {
        let iter = with_value(&value, Value::try_iter)?;
        Ok(Box::into_raw(Box::new(jx_value_iter(iter))))
    })
}

/// Advance the iterator, writing the next owned item to `out`.
///
/// Returns `false` once exhausted; later calls keep returning `false`.
#[no_mangle]
pub extern "C" fn jx_value_iter_next(iter: *mut jx_value_iter, out: *mut jx_value) -> bool {
    guard(|| {
        non_null(iter, "iter")?;
        non_null(out, "out")?;
        // SAFETY: non-null and produced by `jx_value_try_iter`.
        let iter = unsafe { &mut (*iter).0 };
        Ok(match iter.next() {
            Some(item) => {
                // SAFETY: non-null; the host passes a writable slot.
                unsafe { out.write(jx_value::from_value(item)) };
                true
            }
            None => false,
        })
    })
}

/// Release an iterator, including any items it has not yielded. Null is
/// ignored.
#[no_mangle]
pub extern "C" fn jx_value_iter_free(iter: *mut jx_value_iter) {
    if iter.is_null() {
        return;
    }
    // SAFETY: non-null and produced by `jx_value_try_iter`; released once.
    drop(unsafe { Box::from_raw(iter) });
}
