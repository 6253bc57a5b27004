//! Dynamic values exchanged with the host.
//!
//! # Representation
//!
//! Scalars (`None`, `Bool`, `Number`) are stored inline. Every other kind
//! holds an `Arc` to its payload, so cloning a `Value` is the "incref" and
//! dropping it is the "decref". A value's kind never changes after
//! construction.
//!
//! # Containers
//!
//! `Seq` and `Map` payloads are shared by identity: [`Value::append`] and
//! [`Value::set_key`] mutate the payload every clone points at. Containers
//! own their elements; an element stays alive as long as one container (or
//! any other owner) still holds it. Inserting a container into itself,
//! directly or through a nested container, is rejected so reference cycles
//! cannot form.
//!
//! # Undefined
//!
//! Missing lookups never fail. They produce `Value::Undefined` carrying an
//! [`UndefinedCause`]; further lookups on it return the same value. Only
//! materialising operations (`len`, `try_iter`) report an `UndefinedError`.

mod containers;
mod key;
mod number;
mod undefined;

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashSet;

pub use containers::{DynIter, IterableObject, MapObject, Opaque, PlainObject, SeqObject};
pub use key::Key;
pub use number::Number;
pub use undefined::UndefinedCause;

use crate::error::{Error, ErrorKind};
use crate::iter::ValueIter;

/// Kind tag of a value.
///
/// The declaration order is part of the C boundary contract (`jx_value_kind`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Undefined,
    None,
    Bool,
    Number,
    String,
    Bytes,
    Seq,
    Map,
    Iterable,
    Plain,
    Invalid,
}

impl ValueKind {
    /// Name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Undefined => "undefined",
            ValueKind::None => "none",
            ValueKind::Bool => "bool",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Bytes => "bytes",
            ValueKind::Seq => "sequence",
            ValueKind::Map => "map",
            ValueKind::Iterable => "iterator",
            ValueKind::Plain => "plain object",
            ValueKind::Invalid => "invalid value",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reference-counted dynamic value.
#[derive(Clone)]
pub enum Value {
    /// No binding was found. Carries the lookup that produced it, if any.
    Undefined(Option<Arc<UndefinedCause>>),
    /// Explicit none/null.
    None,
    Bool(bool),
    Number(Number),
    String(Arc<String>),
    Bytes(Arc<Vec<u8>>),
    Seq(Arc<SeqObject>),
    Map(Arc<MapObject>),
    /// Lazily produced, restartable sequence.
    Iterable(Arc<IterableObject>),
    /// Opaque host or engine object.
    Plain(Arc<PlainObject>),
    /// Result of a failed evaluation; carries the failure message.
    Invalid(Arc<String>),
}

// Factory Methods

impl Value {
    /// A plain undefined value with no recorded cause.
    #[inline]
    pub fn undefined() -> Self {
        Value::Undefined(None)
    }

    /// An undefined value produced by a failed lookup.
    #[inline]
    pub fn undefined_because(cause: UndefinedCause) -> Self {
        Value::Undefined(Some(Arc::new(cause)))
    }

    #[inline]
    pub fn none() -> Self {
        Value::None
    }

    #[inline]
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(Arc::new(s.into()))
    }

    #[inline]
    pub fn bytes(b: impl Into<Vec<u8>>) -> Self {
        Value::Bytes(Arc::new(b.into()))
    }

    /// An empty, growable sequence.
    #[inline]
    pub fn new_seq() -> Self {
        Value::Seq(Arc::new(SeqObject::default()))
    }

    /// A sequence pre-filled with `items`.
    #[inline]
    pub fn seq(items: Vec<Value>) -> Self {
        Value::Seq(Arc::new(SeqObject::from_vec(items)))
    }

    /// An empty, insertion-ordered map.
    #[inline]
    pub fn new_map() -> Self {
        Value::Map(Arc::new(MapObject::default()))
    }

    /// A lazily produced sequence. `maker` is called once per iteration pass.
    pub fn make_iterable<F, I>(maker: F) -> Self
    where
        F: Fn() -> I + Send + Sync + 'static,
        I: Iterator<Item = Value> + Send + Sync + 'static,
    {
        Value::Iterable(Arc::new(IterableObject::new(move || -> DynIter {
            Box::new(maker())
        })))
    }

    /// Wrap an arbitrary printable object.
    #[inline]
    pub fn plain(payload: impl Opaque) -> Self {
        Value::Plain(Arc::new(PlainObject::new(payload)))
    }

    /// A value standing in for a failed evaluation.
    #[inline]
    pub fn invalid(message: impl Into<String>) -> Self {
        Value::Invalid(Arc::new(message.into()))
    }
}

// Inspection

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Undefined(_) => ValueKind::Undefined,
            Value::None => ValueKind::None,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Bytes(_) => ValueKind::Bytes,
            Value::Seq(_) => ValueKind::Seq,
            Value::Map(_) => ValueKind::Map,
            Value::Iterable(_) => ValueKind::Iterable,
            Value::Plain(_) => ValueKind::Plain,
            Value::Invalid(_) => ValueKind::Invalid,
        }
    }

    #[inline]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined(_))
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    #[inline]
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    /// Truthiness as the template language sees it.
    pub fn is_true(&self) -> bool {
        match self {
            Value::Undefined(_) | Value::None | Value::Invalid(_) => false,
            Value::Bool(b) => *b,
            Value::Number(n) => !n.is_zero(),
            Value::String(s) => !s.is_empty(),
            Value::Bytes(b) => !b.is_empty(),
            Value::Seq(items) => !items.is_empty(),
            Value::Map(map) => !map.is_empty(),
            Value::Iterable(_) | Value::Plain(_) => true,
        }
    }

    /// Why this value is undefined, if it is and the cause is known.
    pub fn undefined_cause(&self) -> Option<&UndefinedCause> {
        match self {
            Value::Undefined(cause) => cause.as_deref(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the raw bytes of a string or bytes value.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::String(s) => Some(s.as_bytes()),
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Signed integer view of a number.
    pub fn as_i64(&self) -> Result<i64, Error> {
        let n = self.expect_number("i64")?;
        n.as_i64().ok_or_else(|| out_of_range(n, "i64"))
    }

    /// Unsigned integer view of a number.
    pub fn as_u64(&self) -> Result<u64, Error> {
        let n = self.expect_number("u64")?;
        n.as_u64().ok_or_else(|| out_of_range(n, "u64"))
    }

    /// Floating view of a number.
    pub fn as_f64(&self) -> Result<f64, Error> {
        self.expect_number("f64").map(Number::as_f64)
    }

    fn expect_number(&self, target: &str) -> Result<Number, Error> {
        self.as_number().ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidOperation,
                format!("cannot convert {} to {target}", self.kind()),
            )
        })
    }

    /// Number of elements (or characters, for strings).
    pub fn len(&self) -> Result<usize, Error> {
        match self {
            Value::String(s) => Ok(s.chars().count()),
            Value::Bytes(b) => Ok(b.len()),
            Value::Seq(items) => Ok(items.len()),
            Value::Map(map) => Ok(map.len()),
            Value::Undefined(cause) => Err(undefined_error(
                "undefined value has no length",
                cause.as_deref(),
            )),
            other => Err(Error::new(
                ErrorKind::InvalidOperation,
                format!("{} has no length", other.kind()),
            )),
        }
    }

    /// Whether two values share the same heap payload.
    ///
    /// Inline scalars never share identity.
    pub fn ptr_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::String(a), Value::String(b)) | (Value::Invalid(a), Value::Invalid(b)) => {
                Arc::ptr_eq(a, b)
            }
            (Value::Bytes(a), Value::Bytes(b)) => Arc::ptr_eq(a, b),
            (Value::Seq(a), Value::Seq(b)) => Arc::ptr_eq(a, b),
            (Value::Map(a), Value::Map(b)) => Arc::ptr_eq(a, b),
            (Value::Iterable(a), Value::Iterable(b)) => Arc::ptr_eq(a, b),
            (Value::Plain(a), Value::Plain(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Number of owners of the heap payload, or `None` for inline values.
    pub fn strong_count(&self) -> Option<usize> {
        match self {
            Value::Undefined(cause) => cause.as_ref().map(Arc::strong_count),
            Value::None | Value::Bool(_) | Value::Number(_) => None,
            Value::String(s) | Value::Invalid(s) => Some(Arc::strong_count(s)),
            Value::Bytes(b) => Some(Arc::strong_count(b)),
            Value::Seq(items) => Some(Arc::strong_count(items)),
            Value::Map(map) => Some(Arc::strong_count(map)),
            Value::Iterable(it) => Some(Arc::strong_count(it)),
            Value::Plain(obj) => Some(Arc::strong_count(obj)),
        }
    }
}

// Lookups

impl Value {
    /// Look up an element by position (sequences, strings) or integer key (maps).
    pub fn get_by_index(&self, idx: u64) -> Value {
        self.get_by_value(&Value::from(idx))
    }

    /// Look up a map entry by string key.
    pub fn get_by_str(&self, key: &str) -> Value {
        match self {
            Value::Map(map) => map
                .get_str(key)
                .unwrap_or_else(|| {
                    Value::undefined_because(UndefinedCause::MissingKey(Key::from(key)))
                }),
            Value::Undefined(_) => self.clone(),
            other => Value::undefined_because(UndefinedCause::NotSubscriptable {
                kind: other.kind(),
                key: format!("{key:?}"),
            }),
        }
    }

    /// Look up an element by an arbitrary key value.
    ///
    /// Negative integer indices count from the end of sequences and strings.
    pub fn get_by_value(&self, key: &Value) -> Value {
        match self {
            Value::Map(map) => match Key::try_from(key) {
                Ok(k) => map
                    .get(&k)
                    .unwrap_or_else(|| Value::undefined_because(UndefinedCause::MissingKey(k))),
                Err(_) => self.not_subscriptable(key),
            },
            Value::Seq(items) => match integral_index(key) {
                Some(idx) => resolve_index(idx, items.len())
                    .and_then(|pos| items.get(pos))
                    .unwrap_or_else(|| Value::undefined_because(UndefinedCause::MissingIndex(idx))),
                None => self.not_subscriptable(key),
            },
            Value::String(s) => match integral_index(key) {
                Some(idx) => resolve_index(idx, s.chars().count())
                    .and_then(|pos| s.chars().nth(pos))
                    .map_or_else(
                        || Value::undefined_because(UndefinedCause::MissingIndex(idx)),
                        |ch| Value::string(ch),
                    ),
                None => self.not_subscriptable(key),
            },
            Value::Undefined(_) => self.clone(),
            _ => self.not_subscriptable(key),
        }
    }

    fn not_subscriptable(&self, key: &Value) -> Value {
        Value::undefined_because(UndefinedCause::NotSubscriptable {
            kind: self.kind(),
            key: key.repr().to_string(),
        })
    }
}

// Container Mutation

impl Value {
    /// Append `item` to a sequence, taking ownership of it.
    pub fn append(&self, item: Value) -> Result<(), Error> {
        let Value::Seq(items) = self else {
            return Err(not_a(self, ValueKind::Seq));
        };
        if item.contains_identity(self) {
            return Err(Error::new(
                ErrorKind::InvalidOperation,
                "cannot insert a sequence into itself",
            ));
        }
        items.push(item);
        Ok(())
    }

    /// Insert or replace a map entry, taking ownership of key and value.
    pub fn set_key(&self, key: Value, value: Value) -> Result<(), Error> {
        let Value::Map(map) = self else {
            return Err(not_a(self, ValueKind::Map));
        };
        let key = Key::try_from(&key)?;
        if value.contains_identity(self) {
            return Err(Error::new(
                ErrorKind::InvalidOperation,
                "cannot insert a map into itself",
            ));
        }
        map.insert(key, value);
        Ok(())
    }

    /// Insert or replace a map entry under a string key.
    pub fn set_string_key(&self, key: &str, value: Value) -> Result<(), Error> {
        self.set_key(Value::string(key), value)
    }

    /// Whether `target` is `self` or reachable through nested containers.
    ///
    /// Each container payload is walked once, so shared sub-containers do
    /// not multiply the work.
    fn contains_identity(&self, target: &Value) -> bool {
        let mut visited: FxHashSet<*const ()> = FxHashSet::default();
        let mut pending = vec![self.clone()];
        while let Some(value) = pending.pop() {
            if value.ptr_eq(target) {
                return true;
            }
            match &value {
                Value::Seq(items) => {
                    if visited.insert(Arc::as_ptr(items).cast()) {
                        pending.extend(items.snapshot());
                    }
                }
                Value::Map(map) => {
                    if visited.insert(Arc::as_ptr(map).cast()) {
                        pending.extend(map.entries().into_iter().map(|(_, v)| v));
                    }
                }
                _ => {}
            }
        }
        false
    }
}

// Iteration

impl Value {
    /// Start a new iteration.
    ///
    /// Sequences yield their elements, maps yield their keys in insertion
    /// order and iterables start a fresh pass. Each call returns an
    /// independent iterator.
    pub fn try_iter(&self) -> Result<ValueIter, Error> {
        match self {
            Value::Seq(items) => Ok(ValueIter::over_seq(Arc::clone(items))),
            Value::Map(map) => Ok(ValueIter::over_keys(map.keys())),
            Value::Iterable(it) => Ok(ValueIter::lazy(it.iter())),
            Value::Undefined(cause) => Err(undefined_error(
                "cannot iterate over undefined value",
                cause.as_deref(),
            )),
            other => Err(Error::new(
                ErrorKind::InvalidOperation,
                format!("{} is not iterable", other.kind()),
            )),
        }
    }
}

// Formatting

/// Renders a value the way it appears nested inside a container listing.
pub struct Repr<'a>(&'a Value);

impl Value {
    /// Listing form: strings are quoted, undefined prints as `undefined`.
    #[inline]
    pub fn repr(&self) -> Repr<'_> {
        Repr(self)
    }
}

impl fmt::Display for Repr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Value::Undefined(_) => f.write_str("undefined"),
            Value::String(s) => write!(f, "{:?}", s.as_str()),
            Value::Bytes(b) => {
                f.write_str("b\"")?;
                for &byte in b.iter() {
                    write!(f, "{}", std::ascii::escape_default(byte))?;
                }
                f.write_str("\"")
            }
            other => fmt::Display::fmt(other, f),
        }
    }
}

impl fmt::Display for Value {
    /// The string form returned by `to_str`. Every kind has one.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined(_) => Ok(()),
            Value::None => f.write_str("none"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => f.write_str(s),
            Value::Bytes(b) => f.write_str(&String::from_utf8_lossy(b)),
            Value::Seq(items) => {
                f.write_str("[")?;
                for (idx, item) in items.snapshot().iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item.repr())?;
                }
                f.write_str("]")
            }
            Value::Map(map) => {
                f.write_str("{")?;
                for (idx, (key, value)) in map.entries().iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {}", value.repr())?;
                }
                f.write_str("}")
            }
            Value::Iterable(_) => f.write_str("<iterator>"),
            Value::Plain(obj) => write!(f, "{obj}"),
            Value::Invalid(msg) => write!(f, "<invalid value: {msg}>"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined(None) => f.write_str("Undefined"),
            Value::Undefined(Some(cause)) => write!(f, "Undefined({cause})"),
            Value::None => f.write_str("None"),
            Value::Bool(b) => fmt::Debug::fmt(b, f),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => fmt::Debug::fmt(s.as_str(), f),
            Value::Bytes(_) => write!(f, "{}", self.repr()),
            Value::Seq(items) => fmt::Debug::fmt(&**items, f),
            Value::Map(map) => fmt::Debug::fmt(&**map, f),
            Value::Iterable(it) => fmt::Debug::fmt(&**it, f),
            Value::Plain(obj) => fmt::Debug::fmt(&**obj, f),
            Value::Invalid(msg) => write!(f, "Invalid({msg:?})"),
        }
    }
}

impl PartialEq for Value {
    /// Structural equality; iterables and plain objects compare by identity.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined(_), Value::Undefined(_)) | (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) | (Value::Invalid(a), Value::Invalid(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Seq(a), Value::Seq(b)) => Arc::ptr_eq(a, b) || a.snapshot() == b.snapshot(),
            (Value::Map(a), Value::Map(b)) => Arc::ptr_eq(a, b) || a.entries() == b.entries(),
            (Value::Iterable(a), Value::Iterable(b)) => Arc::ptr_eq(a, b),
            (Value::Plain(a), Value::Plain(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::undefined()
    }
}

// Conversions

impl From<bool> for Value {
    #[inline]
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    #[inline]
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    #[inline]
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

impl From<()> for Value {
    #[inline]
    fn from((): ()) -> Self {
        Value::None
    }
}

impl From<Vec<Value>> for Value {
    #[inline]
    fn from(items: Vec<Value>) -> Self {
        Value::seq(items)
    }
}

impl From<Number> for Value {
    #[inline]
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

macro_rules! value_from_number {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                #[inline]
                fn from(n: $ty) -> Self {
                    Value::Number(Number::from(n))
                }
            }
        )*
    };
}

value_from_number!(i8, i16, i32, i64, i128, u8, u16, u32, u64, f32, f64);

// Helpers

fn not_a(value: &Value, expected: ValueKind) -> Error {
    Error::new(
        ErrorKind::InvalidOperation,
        format!("{} is not a {expected}", value.kind()),
    )
}

fn out_of_range(n: Number, target: &str) -> Error {
    Error::new(
        ErrorKind::InvalidOperation,
        format!("number {n} is out of range for {target}"),
    )
}

fn undefined_error(message: &str, cause: Option<&UndefinedCause>) -> Error {
    match cause {
        Some(cause) => Error::new(ErrorKind::UndefinedError, format!("{message} ({cause})")),
        None => Error::new(ErrorKind::UndefinedError, message.to_string()),
    }
}

fn integral_index(key: &Value) -> Option<i128> {
    key.as_number().and_then(Number::as_integral)
}

/// Map a possibly negative index onto a position in `0..len`.
fn resolve_index(idx: i128, len: usize) -> Option<usize> {
    let len = i128::try_from(len).ok()?;
    let pos = if idx < 0 { len.checked_add(idx)? } else { idx };
    if pos < len {
        usize::try_from(pos).ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests;
