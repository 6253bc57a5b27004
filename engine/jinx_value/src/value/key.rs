//! Map keys.
//!
//! Only primitive values can address a map entry. Integral floats collapse
//! onto the integer key so `1` and `1.0` name the same entry.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::Value;
use crate::error::{Error, ErrorKind};

/// A hashable, primitive map key.
#[derive(Clone, Debug)]
pub enum Key {
    None,
    Bool(bool),
    Int(i128),
    /// Non-integral, non-NaN float.
    Float(f64),
    Str(Arc<str>),
    Bytes(Arc<[u8]>),
}

impl Key {
    /// Convert the key back into a freshly owned value.
    pub fn to_value(&self) -> Value {
        match self {
            Key::None => Value::None,
            Key::Bool(b) => Value::from(*b),
            Key::Int(n) => Value::from(*n),
            Key::Float(f) => Value::from(*f),
            Key::Str(s) => Value::string(&**s),
            Key::Bytes(b) => Value::bytes(b.to_vec()),
        }
    }

    /// Borrow the key as a string slice if it is a string key.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl TryFrom<&Value> for Key {
    type Error = Error;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::None => Ok(Key::None),
            Value::Bool(b) => Ok(Key::Bool(*b)),
            Value::Number(n) => match n.as_integral() {
                Some(i) => Ok(Key::Int(i)),
                None => {
                    let f = n.as_f64();
                    if f.is_nan() {
                        Err(Error::new(ErrorKind::NonKey, "NaN cannot be used as a key"))
                    } else {
                        Ok(Key::Float(f))
                    }
                }
            },
            Value::String(s) => Ok(Key::Str(Arc::from(s.as_str()))),
            Value::Bytes(b) => Ok(Key::Bytes(Arc::from(b.as_slice()))),
            Value::Seq(_) | Value::Map(_) | Value::Iterable(_) | Value::Plain(_) => Err(Error::new(
                ErrorKind::NonPrimitive,
                format!("{} cannot be used as a key", value.kind()),
            )),
            Value::Undefined(_) | Value::Invalid(_) => Err(Error::new(
                ErrorKind::NonKey,
                format!("{} cannot be used as a key", value.kind()),
            )),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Str(Arc::from(s))
    }
}

impl From<i128> for Key {
    fn from(n: i128) -> Self {
        Key::Int(n)
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Key::None, Key::None) => true,
            (Key::Bool(a), Key::Bool(b)) => a == b,
            (Key::Int(a), Key::Int(b)) => a == b,
            (Key::Float(a), Key::Float(b)) => a.to_bits() == b.to_bits(),
            (Key::Str(a), Key::Str(b)) => a == b,
            (Key::Bytes(a), Key::Bytes(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Key::None => {}
            Key::Bool(b) => b.hash(state),
            Key::Int(n) => n.hash(state),
            Key::Float(f) => f.to_bits().hash(state),
            Key::Str(s) => s.hash(state),
            Key::Bytes(b) => b.hash(state),
        }
    }
}

impl fmt::Display for Key {
    /// Keys print the way they appear inside a map listing.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Str(s) => write!(f, "{:?}", &**s),
            other => write!(f, "{}", other.to_value().repr()),
        }
    }
}
