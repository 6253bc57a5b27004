//! Why a lookup produced an undefined value.

use std::fmt;

use super::{Key, ValueKind};

/// The lookup that first produced an undefined value.
///
/// Lookups on an undefined value return that same value, so the cause
/// always names the first missing link of a chain like `a.b.c`.
#[derive(Clone, Debug, PartialEq)]
pub enum UndefinedCause {
    /// The map had no entry for the key.
    MissingKey(Key),
    /// The index was outside the sequence or string.
    MissingIndex(i128),
    /// The value does not support lookups at all.
    NotSubscriptable { kind: ValueKind, key: String },
}

impl fmt::Display for UndefinedCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UndefinedCause::MissingKey(key) => write!(f, "no entry for key {key}"),
            UndefinedCause::MissingIndex(idx) => write!(f, "index {idx} is out of range"),
            UndefinedCause::NotSubscriptable { kind, key } => {
                write!(f, "cannot look up {key} on {kind}")
            }
        }
    }
}
