//! Stateful iteration over values.
//!
//! A `ValueIter` is produced by [`Value::try_iter`] and is independent of
//! every other iterator over the same value. Once it reports exhaustion it
//! drops whatever it was holding and keeps returning `None`.

use std::fmt;
use std::sync::Arc;

use crate::value::{DynIter, Key, SeqObject, Value};

enum IterState {
    /// Positional cursor over a shared sequence. Elements appended during
    /// iteration are still visited.
    Seq { items: Arc<SeqObject>, pos: usize },
    /// Map keys captured when the iteration started.
    Keys(std::vec::IntoIter<Key>),
    /// A pass over an iterable's producer.
    Lazy(DynIter),
    Done,
}

/// Iterator handed out by [`Value::try_iter`].
pub struct ValueIter {
    state: IterState,
}

impl ValueIter {
    pub(crate) fn over_seq(items: Arc<SeqObject>) -> Self {
        ValueIter {
            state: IterState::Seq { items, pos: 0 },
        }
    }

    pub(crate) fn over_keys(keys: Vec<Key>) -> Self {
        ValueIter {
            state: IterState::Keys(keys.into_iter()),
        }
    }

    pub(crate) fn lazy(iter: DynIter) -> Self {
        ValueIter {
            state: IterState::Lazy(iter),
        }
    }

    /// Whether a previous call to `next` reported the end.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        matches!(self.state, IterState::Done)
    }
}

impl Iterator for ValueIter {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        let item = match &mut self.state {
            IterState::Seq { items, pos } => {
                let item = items.get(*pos);
                if item.is_some() {
                    *pos += 1;
                }
                item
            }
            IterState::Keys(keys) => keys.next().map(|key| key.to_value()),
            IterState::Lazy(iter) => iter.next(),
            IterState::Done => return None,
        };
        if item.is_none() {
            self.state = IterState::Done;
        }
        item
    }
}

impl std::iter::FusedIterator for ValueIter {}

impl fmt::Debug for ValueIter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.state {
            IterState::Seq { pos, .. } => return write!(f, "ValueIter(seq @ {pos})"),
            IterState::Keys(keys) => return write!(f, "ValueIter(keys, {} left)", keys.len()),
            IterState::Lazy(_) => "lazy",
            IterState::Done => "done",
        };
        write!(f, "ValueIter({state})")
    }
}
