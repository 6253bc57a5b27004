//! Opaque handles handed to C.
//!
//! A `jx_value` is three machine words: a tag followed by two payload
//! words. Scalars live inline; every shared payload is stored as the raw
//! pointer of one strong `Arc` reference, so a handle owns exactly one
//! count of whatever it points to. The host never inspects the words.

use std::mem::ManuallyDrop;
use std::sync::Arc;

use jinx_value::{Number, Value, ValueIter};

const TAG_UNDEFINED: u64 = 0;
const TAG_UNDEFINED_CAUSED: u64 = 1;
const TAG_NONE: u64 = 2;
const TAG_BOOL: u64 = 3;
const TAG_INT: u64 = 4;
const TAG_FLOAT: u64 = 5;
const TAG_STRING: u64 = 6;
const TAG_BYTES: u64 = 7;
const TAG_SEQ: u64 = 8;
const TAG_MAP: u64 = 9;
const TAG_ITERABLE: u64 = 10;
const TAG_PLAIN: u64 = 11;
const TAG_INVALID: u64 = 12;

/// Opaque value handle.
///
/// Passing a handle by value into a consuming function moves it. A handle
/// that was moved or released must not be used again.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct jx_value {
    _opaque: [u64; 3],
}

impl jx_value {
    /// The plain undefined value. Owns nothing.
    pub(crate) const UNDEFINED: jx_value = jx_value {
        _opaque: [TAG_UNDEFINED, 0, 0],
    };

    /// Move a value into a handle. The handle takes over the value's
    /// reference.
    pub(crate) fn from_value(value: Value) -> jx_value {
        let [tag, a, b] = match value {
            Value::Undefined(None) => [TAG_UNDEFINED, 0, 0],
            Value::Undefined(Some(cause)) => [TAG_UNDEFINED_CAUSED, arc_word(cause), 0],
            Value::None => [TAG_NONE, 0, 0],
            Value::Bool(b) => [TAG_BOOL, u64::from(b), 0],
            Value::Number(Number::Int(n)) => {
                let bits = n as u128;
                [TAG_INT, bits as u64, (bits >> 64) as u64]
            }
            Value::Number(Number::Float(f)) => [TAG_FLOAT, f.to_bits(), 0],
            Value::String(s) => [TAG_STRING, arc_word(s), 0],
            Value::Bytes(b) => [TAG_BYTES, arc_word(b), 0],
            Value::Seq(seq) => [TAG_SEQ, arc_word(seq), 0],
            Value::Map(map) => [TAG_MAP, arc_word(map), 0],
            Value::Iterable(it) => [TAG_ITERABLE, arc_word(it), 0],
            Value::Plain(obj) => [TAG_PLAIN, arc_word(obj), 0],
            Value::Invalid(msg) => [TAG_INVALID, arc_word(msg), 0],
        };
        jx_value {
            _opaque: [tag, a, b],
        }
    }

    /// Move the value out of the handle, taking over its reference.
    ///
    /// Unknown tags (zeroed or corrupted memory) read as undefined.
    ///
    /// # Safety
    /// The handle must have been produced by `from_value` and not moved or
    /// released since.
    pub(crate) unsafe fn into_value(self) -> Value {
        let [tag, a, b] = self._opaque;
        // SAFETY: pointer words come from `arc_word` of the matching type.
        unsafe {
            match tag {
                TAG_UNDEFINED_CAUSED => Value::Undefined(Some(arc_from_word(a))),
                TAG_NONE => Value::None,
                TAG_BOOL => Value::Bool(a != 0),
                TAG_INT => {
                    let bits = (u128::from(b) << 64) | u128::from(a);
                    Value::Number(Number::Int(bits as i128))
                }
                TAG_FLOAT => Value::Number(Number::Float(f64::from_bits(a))),
                TAG_STRING => Value::String(arc_from_word(a)),
                TAG_BYTES => Value::Bytes(arc_from_word(a)),
                TAG_SEQ => Value::Seq(arc_from_word(a)),
                TAG_MAP => Value::Map(arc_from_word(a)),
                TAG_ITERABLE => Value::Iterable(arc_from_word(a)),
                TAG_PLAIN => Value::Plain(arc_from_word(a)),
                TAG_INVALID => Value::Invalid(arc_from_word(a)),
                _ => Value::undefined(),
            }
        }
    }

    /// View the value without taking over the handle's reference.
    ///
    /// # Safety
    /// Same as `into_value`. The returned value must not be dropped.
    pub(crate) unsafe fn borrow(&self) -> ManuallyDrop<Value> {
        // SAFETY: forwarded; ManuallyDrop keeps the count unchanged.
        ManuallyDrop::new(unsafe { self.into_value() })
    }
}

fn arc_word<T>(arc: Arc<T>) -> u64 {
    Arc::into_raw(arc) as usize as u64
}

/// # Safety
/// `word` must come from `arc_word::<T>` and still own its reference.
unsafe fn arc_from_word<T>(word: u64) -> Arc<T> {
    // SAFETY: guaranteed by the caller.
    unsafe { Arc::from_raw(word as usize as *const T) }
}

/// Opaque iterator handle returned by `jx_value_try_iter`.
pub struct jx_value_iter(pub(crate) ValueIter);
