//! Heap payloads shared between every owner of a container value.
//!
//! Containers are mutated through their identity: every clone of a
//! `Value::Seq` or `Value::Map` points at the same `SeqObject`/`MapObject`,
//! so appending through one handle is visible through all of them. The
//! payloads sit behind `parking_lot::RwLock` so shared handles stay `Sync`.

use std::any::Any;
use std::fmt;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::{Key, Value};

/// Boxed lazy iterator over values.
pub type DynIter = Box<dyn Iterator<Item = Value> + Send + Sync>;

/// Growable sequence payload.
#[derive(Default)]
pub struct SeqObject {
    items: RwLock<Vec<Value>>,
}

impl SeqObject {
    pub(crate) fn from_vec(items: Vec<Value>) -> Self {
        SeqObject {
            items: RwLock::new(items),
        }
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Clone out the element at `idx`.
    pub fn get(&self, idx: usize) -> Option<Value> {
        self.items.read().get(idx).cloned()
    }

    /// Clone out every element in order.
    pub fn snapshot(&self) -> Vec<Value> {
        self.items.read().clone()
    }

    pub(crate) fn push(&self, value: Value) {
        self.items.write().push(value);
    }
}

impl fmt::Debug for SeqObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.read().iter()).finish()
    }
}

#[derive(Default)]
struct MapEntries {
    entries: Vec<(Key, Value)>,
    index: FxHashMap<Key, usize>,
}

/// Insertion-ordered mapping payload.
#[derive(Default)]
pub struct MapObject {
    inner: RwLock<MapEntries>,
}

impl MapObject {
    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().entries.is_empty()
    }

    pub fn get(&self, key: &Key) -> Option<Value> {
        let inner = self.inner.read();
        inner
            .index
            .get(key)
            .and_then(|&slot| inner.entries.get(slot))
            .map(|(_, value)| value.clone())
    }

    /// Look up a string key.
    pub fn get_str(&self, key: &str) -> Option<Value> {
        self.get(&Key::from(key))
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> Vec<Key> {
        self.inner
            .read()
            .entries
            .iter()
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> Vec<(Key, Value)> {
        self.inner.read().entries.clone()
    }

    /// Insert or replace. A replaced entry keeps its original position.
    pub(crate) fn insert(&self, key: Key, value: Value) -> Option<Value> {
        let mut inner = self.inner.write();
        if let Some(&slot) = inner.index.get(&key) {
            return inner
                .entries
                .get_mut(slot)
                .map(|entry| std::mem::replace(&mut entry.1, value));
        }
        let slot = inner.entries.len();
        inner.index.insert(key.clone(), slot);
        inner.entries.push((key, value));
        None
    }
}

impl fmt::Debug for MapObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read();
        f.debug_map()
            .entries(inner.entries.iter().map(|(k, v)| (k, v)))
            .finish()
    }
}

/// A restartable source of lazily produced values.
///
/// Every call to [`IterableObject::iter`] starts a fresh pass, so the same
/// value can be iterated any number of times. Whether a pass terminates is
/// up to the producer.
pub struct IterableObject {
    maker: Box<dyn Fn() -> DynIter + Send + Sync>,
}

impl IterableObject {
    pub(crate) fn new<F>(maker: F) -> Self
    where
        F: Fn() -> DynIter + Send + Sync + 'static,
    {
        IterableObject {
            maker: Box::new(maker),
        }
    }

    /// Start a new pass over the produced values.
    pub fn iter(&self) -> DynIter {
        (self.maker)()
    }
}

impl fmt::Debug for IterableObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<iterator>")
    }
}

/// Payload of an opaque (`Plain`) value.
///
/// Anything printable and shareable across threads can be wrapped; the
/// original type is recoverable with [`PlainObject::downcast_ref`].
pub trait Opaque: Any + fmt::Debug + fmt::Display + Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any + fmt::Debug + fmt::Display + Send + Sync> Opaque for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct PlainObject(Box<dyn Opaque>);

impl PlainObject {
    pub(crate) fn new(payload: impl Opaque) -> Self {
        PlainObject(Box::new(payload))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        // Go through the trait object; the box itself also implements `Opaque`.
        let payload: &dyn Opaque = &*self.0;
        payload.as_any().downcast_ref::<T>()
    }
}

impl fmt::Debug for PlainObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for PlainObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}
