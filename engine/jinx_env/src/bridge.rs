//! Conversion between host values and template language values.
//!
//! Containers are not copied on the way in. Sequences, maps, iterables and
//! opaque objects are wrapped in thin `Object` adapters that read through to
//! the shared payload, so a template sees the container exactly as the host
//! built it. Values coming back out unwrap those adapters, which keeps
//! container identity intact across an `eval_expr` round trip.

use std::fmt;
use std::sync::Arc;

use jinx_value::{
    Error, ErrorKind, IterableObject, Key, MapObject, Number, PlainObject, SeqObject, Value,
};
use minijinja::value::{Enumerator, Object, ObjectRepr};

type EngineValue = minijinja::Value;

// Host → Engine

/// Convert the root context. An invalid value cannot be bound.
pub(crate) fn bind_context(ctx: &Value) -> Result<EngineValue, Error> {
    match ctx {
        Value::Invalid(msg) => Err(Error::new(
            ErrorKind::BadSerialization,
            format!("cannot bind an invalid value as context: {msg}"),
        )),
        other => Ok(to_engine(other)),
    }
}

/// Convert a host value for use inside a template.
///
/// Nested invalid values read as undefined.
pub(crate) fn to_engine(value: &Value) -> EngineValue {
    match value {
        Value::Undefined(_) | Value::Invalid(_) => EngineValue::UNDEFINED,
        Value::None => EngineValue::from(()),
        Value::Bool(b) => EngineValue::from(*b),
        Value::Number(Number::Int(n)) => EngineValue::from(*n),
        Value::Number(Number::Float(f)) => EngineValue::from(*f),
        Value::String(s) => EngineValue::from(s.as_str()),
        Value::Bytes(b) => EngineValue::from_bytes(b.to_vec()),
        Value::Seq(items) => EngineValue::from_object(SeqBridge(Arc::clone(items))),
        Value::Map(map) => EngineValue::from_object(MapBridge(Arc::clone(map))),
        Value::Iterable(it) => EngineValue::from_object(IterableBridge(Arc::clone(it))),
        Value::Plain(obj) => match obj.downcast_ref::<EngineObject>() {
            Some(EngineObject(inner)) => inner.clone(),
            None => EngineValue::from_object(PlainBridge(Arc::clone(obj))),
        },
    }
}

#[derive(Debug)]
struct SeqBridge(Arc<SeqObject>);

impl Object for SeqBridge {
    fn repr(self: &Arc<Self>) -> ObjectRepr {
        ObjectRepr::Seq
    }

    fn get_value(self: &Arc<Self>, key: &EngineValue) -> Option<EngineValue> {
        let idx = key.as_usize()?;
        self.0.get(idx).map(|item| to_engine(&item))
    }

    fn enumerate(self: &Arc<Self>) -> Enumerator {
        Enumerator::Seq(self.0.len())
    }
}

#[derive(Debug)]
struct MapBridge(Arc<MapObject>);

impl Object for MapBridge {
    fn repr(self: &Arc<Self>) -> ObjectRepr {
        ObjectRepr::Map
    }

    fn get_value(self: &Arc<Self>, key: &EngineValue) -> Option<EngineValue> {
        if let Some(name) = key.as_str() {
            return self.0.get_str(name).map(|value| to_engine(&value));
        }
        let key = Key::try_from(&from_engine(key).ok()?).ok()?;
        self.0.get(&key).map(|value| to_engine(&value))
    }

    fn enumerate(self: &Arc<Self>) -> Enumerator {
        Enumerator::Values(
            self.0
                .keys()
                .iter()
                .map(|key| to_engine(&key.to_value()))
                .collect(),
        )
    }
}

#[derive(Debug)]
struct IterableBridge(Arc<IterableObject>);

impl Object for IterableBridge {
    fn repr(self: &Arc<Self>) -> ObjectRepr {
        ObjectRepr::Iterable
    }

    fn enumerate(self: &Arc<Self>) -> Enumerator {
        Enumerator::Iter(Box::new(self.0.iter().map(|item| to_engine(&item))))
    }
}

#[derive(Debug)]
struct PlainBridge(Arc<PlainObject>);

impl Object for PlainBridge {
    fn repr(self: &Arc<Self>) -> ObjectRepr {
        ObjectRepr::Plain
    }

    fn render(self: &Arc<Self>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}

// Engine → Host

/// A template language value with no host counterpart, carried as a
/// `Plain` payload so it can be passed back into later renders unchanged.
#[derive(Debug)]
pub(crate) struct EngineObject(pub(crate) EngineValue);

impl fmt::Display for EngineObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Convert a template language value into a host value.
///
/// Fails when a container cannot be walked or a map key has no host
/// counterpart.
pub(crate) fn from_engine(value: &EngineValue) -> Result<Value, Error> {
    if let Some(seq) = value.downcast_object::<SeqBridge>() {
        return Ok(Value::Seq(Arc::clone(&seq.0)));
    }
    if let Some(map) = value.downcast_object::<MapBridge>() {
        return Ok(Value::Map(Arc::clone(&map.0)));
    }
    if let Some(it) = value.downcast_object::<IterableBridge>() {
        return Ok(Value::Iterable(Arc::clone(&it.0)));
    }
    if let Some(obj) = value.downcast_object::<PlainBridge>() {
        return Ok(Value::Plain(Arc::clone(&obj.0)));
    }

    Ok(match value.kind() {
        minijinja::value::ValueKind::Undefined => Value::undefined(),
        minijinja::value::ValueKind::None => Value::none(),
        minijinja::value::ValueKind::Bool => Value::from(value.is_true()),
        minijinja::value::ValueKind::Number => number_from_engine(value),
        minijinja::value::ValueKind::String => {
            Value::string(value.as_str().unwrap_or_default())
        }
        minijinja::value::ValueKind::Bytes => Value::bytes(value.as_bytes().unwrap_or_default()),
        minijinja::value::ValueKind::Seq => Value::seq(collect_items(value)?),
        minijinja::value::ValueKind::Map => map_from_engine(value)?,
        minijinja::value::ValueKind::Iterable => {
            let source = value.clone();
            // Iteration is deferred, so a failure surfaces as an invalid item.
            Value::make_iterable(move || {
                collect_items(&source)
                    .unwrap_or_else(|err| vec![Value::invalid(err.to_string())])
                    .into_iter()
            })
        }
        minijinja::value::ValueKind::Invalid => Value::invalid(invalid_message(value)),
        _ => Value::plain(EngineObject(value.clone())),
    })
}

fn number_from_engine(value: &EngineValue) -> Value {
    if value.is_integer() {
        if let Ok(n) = i128::try_from(value.clone()) {
            return Value::from(n);
        }
    }
    match f64::try_from(value.clone()) {
        Ok(f) => Value::from(f),
        Err(err) => Value::invalid(err.to_string()),
    }
}

fn collect_items(value: &EngineValue) -> Result<Vec<Value>, Error> {
    value
        .try_iter()
        .map_err(|err| conversion_error(value, &err))?
        .map(|item| from_engine(&item))
        .collect()
}

fn map_from_engine(value: &EngineValue) -> Result<Value, Error> {
    let map = Value::new_map();
    let keys = value
        .try_iter()
        .map_err(|err| conversion_error(value, &err))?;
    for key in keys {
        let item = value
            .get_item(&key)
            .map_err(|err| conversion_error(value, &err))?;
        map.set_key(from_engine(&key)?, from_engine(&item)?)
            .map_err(|err| {
                Error::new(
                    ErrorKind::BadSerialization,
                    format!("cannot convert map key {key}: {err}"),
                )
            })?;
    }
    Ok(map)
}

fn conversion_error(value: &EngineValue, err: &minijinja::Error) -> Error {
    Error::new(
        ErrorKind::BadSerialization,
        format!("cannot convert {}: {err}", value.kind()),
    )
}

fn invalid_message(value: &EngineValue) -> String {
    let text = value.to_string();
    text.strip_prefix("<invalid value: ")
        .and_then(|rest| rest.strip_suffix('>'))
        .map_or_else(|| text.clone(), str::to_owned)
}

#[cfg(test)]
mod tests;
