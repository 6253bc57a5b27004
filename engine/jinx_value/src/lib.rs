//! Jinx Value - dynamic values for the Jinx template engine.
//!
//! This crate provides:
//! - The reference-counted `Value` model (`Value`, `ValueKind`, `Number`, `Key`)
//! - Shared container payloads mutated by identity (`SeqObject`, `MapObject`)
//! - Stateful iteration (`ValueIter`)
//! - The error type shared by every Jinx crate (`Error`, `ErrorKind`)
//!
//! # Ownership
//!
//! Cloning a `Value` shares its payload; dropping the last clone frees it.
//! Containers take ownership of the values inserted into them.

mod error;
mod iter;
mod value;

pub use error::{Error, ErrorKind};
pub use iter::ValueIter;
pub use value::{
    DynIter, IterableObject, Key, MapObject, Number, Opaque, PlainObject, Repr, SeqObject,
    UndefinedCause, Value, ValueKind,
};
