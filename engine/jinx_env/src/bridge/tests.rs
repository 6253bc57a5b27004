#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Tests use unwrap for brevity"
)]

use super::*;
use jinx_value::ValueKind;
use pretty_assertions::assert_eq;

#[test]
fn scalars_survive_a_round_trip() {
    for value in [
        Value::none(),
        Value::from(true),
        Value::from(-7_i64),
        Value::from(u64::MAX),
        Value::from(2.5_f64),
        Value::string("text"),
        Value::bytes(vec![0, 255]),
    ] {
        assert_eq!(from_engine(&to_engine(&value)).unwrap(), value);
    }
}

#[test]
fn integral_float_stays_float() {
    let back = from_engine(&to_engine(&Value::from(2.0_f64))).unwrap();
    assert!(matches!(back, Value::Number(Number::Float(_))));
    assert_eq!(back.to_string(), "2.0");
}

#[test]
fn undefined_maps_to_engine_undefined() {
    assert!(to_engine(&Value::undefined()).is_undefined());
    assert!(from_engine(&EngineValue::UNDEFINED).unwrap().is_undefined());
}

#[test]
fn containers_keep_identity() {
    let seq = Value::new_seq();
    let map = Value::new_map();
    let it = Value::make_iterable(|| std::iter::once(Value::none()));
    let plain = Value::plain(String::from("p"));
    for value in [seq, map, it, plain] {
        assert!(from_engine(&to_engine(&value)).unwrap().ptr_eq(&value));
    }
}

#[test]
fn seq_bridge_reads_live_contents() {
    let seq = Value::new_seq();
    let engine = to_engine(&seq);
    seq.append(Value::from(1_i64)).unwrap();
    assert_eq!(engine.len(), Some(1));
    assert_eq!(engine.get_item(&EngineValue::from(0)).unwrap(), EngineValue::from(1));
}

#[test]
fn map_bridge_looks_up_string_and_integer_keys() {
    let map = Value::new_map();
    map.set_string_key("a", Value::from(1_i64)).unwrap();
    map.set_key(Value::from(7_i64), Value::string("seven")).unwrap();
    let engine = to_engine(&map);
    assert_eq!(engine.get_attr("a").unwrap(), EngineValue::from(1));
    assert_eq!(
        engine.get_item(&EngineValue::from(7)).unwrap().as_str(),
        Some("seven")
    );
}

#[test]
fn engine_only_values_become_new_host_values() {
    let engine = EngineValue::from(vec![EngineValue::from(1), EngineValue::from("x")]);
    let value = from_engine(&engine).unwrap();
    assert_eq!(value.kind(), ValueKind::Seq);
    assert_eq!(value.to_string(), r#"[1, "x"]"#);
}

#[test]
fn numbers_keep_their_integer_or_float_nature() {
    let wide = from_engine(&EngineValue::from(i128::MAX)).unwrap();
    assert!(matches!(wide, Value::Number(Number::Int(n)) if n == i128::MAX));

    let negative = from_engine(&EngineValue::from(-3_i64)).unwrap();
    assert!(matches!(negative, Value::Number(Number::Int(-3))));

    let huge = from_engine(&EngineValue::from(1e300_f64)).unwrap();
    assert!(matches!(huge, Value::Number(Number::Float(f)) if f == 1e300));
}

fn eval_raw(expr: &str) -> EngineValue {
    minijinja::Environment::new()
        .compile_expression(expr)
        .unwrap()
        .eval(())
        .unwrap()
}

#[test]
fn map_with_unrepresentable_key_is_rejected() {
    let err = from_engine(&eval_raw("{[1]: 2, 'a': 3}")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BadSerialization);
    assert!(err.to_string().contains("map key"));
}

#[test]
fn nested_bad_key_fails_the_whole_conversion() {
    let err = from_engine(&eval_raw("[1, {'ok': {[2]: 3}}]")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BadSerialization);
}

#[test]
fn engine_map_keeps_every_entry() {
    let value = from_engine(&eval_raw("{1: 'one', 'b': [2], none: 3}")).unwrap();
    assert_eq!(value.len().unwrap(), 3);
    assert_eq!(value.get_by_value(&Value::from(1_i64)), Value::string("one"));
    assert_eq!(value.get_by_value(&Value::none()), Value::from(3_i64));
}

#[test]
fn bind_rejects_invalid_context() {
    let err = bind_context(&Value::invalid("nope")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BadSerialization);
    assert!(bind_context(&Value::none()).is_ok());
}

#[test]
fn invalid_message_passes_plain_text_through() {
    let engine = EngineValue::from(vec![EngineValue::from(1)]);
    assert_eq!(invalid_message(&engine), "[1]");
}
