#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Tests use unwrap for brevity"
)]

use super::*;
use pretty_assertions::assert_eq;

fn seq_of(items: &[i64]) -> Value {
    Value::seq(items.iter().copied().map(Value::from).collect())
}

// ── Construction and kinds ──────────────────────────────────────────

#[test]
fn factories_produce_expected_kinds() {
    assert_eq!(Value::undefined().kind(), ValueKind::Undefined);
    assert_eq!(Value::none().kind(), ValueKind::None);
    assert_eq!(Value::from(true).kind(), ValueKind::Bool);
    assert_eq!(Value::from(42_i64).kind(), ValueKind::Number);
    assert_eq!(Value::from(1.5_f64).kind(), ValueKind::Number);
    assert_eq!(Value::string("x").kind(), ValueKind::String);
    assert_eq!(Value::bytes(b"x".to_vec()).kind(), ValueKind::Bytes);
    assert_eq!(Value::new_seq().kind(), ValueKind::Seq);
    assert_eq!(Value::new_map().kind(), ValueKind::Map);
    assert_eq!(
        Value::make_iterable(|| std::iter::empty()).kind(),
        ValueKind::Iterable
    );
    assert_eq!(Value::plain("opaque").kind(), ValueKind::Plain);
    assert_eq!(Value::invalid("boom").kind(), ValueKind::Invalid);
}

#[test]
fn truthiness() {
    assert!(!Value::undefined().is_true());
    assert!(!Value::none().is_true());
    assert!(!Value::from(0_i64).is_true());
    assert!(!Value::from(0.0_f64).is_true());
    assert!(Value::from(-1_i64).is_true());
    assert!(!Value::string("").is_true());
    assert!(Value::string("a").is_true());
    assert!(!Value::new_seq().is_true());
    assert!(seq_of(&[1]).is_true());
    assert!(!Value::invalid("x").is_true());
}

// ── Numbers ─────────────────────────────────────────────────────────

#[test]
fn number_views() {
    let v = Value::from(42_i64);
    assert_eq!(v.as_i64().unwrap(), 42);
    assert_eq!(v.as_u64().unwrap(), 42);
    assert_eq!(v.as_f64().unwrap(), 42.0);

    let f = Value::from(2.75_f64);
    assert_eq!(f.as_i64().unwrap(), 2);
    assert_eq!(f.as_f64().unwrap(), 2.75);
}

#[test]
fn number_views_reject_out_of_range_and_non_numbers() {
    assert_eq!(
        Value::from(-1_i64).as_u64().unwrap_err().kind(),
        ErrorKind::InvalidOperation
    );
    assert_eq!(
        Value::from(u64::MAX).as_i64().unwrap_err().kind(),
        ErrorKind::InvalidOperation
    );
    assert_eq!(
        Value::string("1").as_i64().unwrap_err().kind(),
        ErrorKind::InvalidOperation
    );
    assert_eq!(
        Value::none().as_f64().unwrap_err().kind(),
        ErrorKind::InvalidOperation
    );
}

#[test]
fn u64_max_round_trips() {
    assert_eq!(Value::from(u64::MAX).as_u64().unwrap(), u64::MAX);
}

// ── Strings ─────────────────────────────────────────────────────────

#[test]
fn to_string_forms() {
    assert_eq!(Value::undefined().to_string(), "");
    assert_eq!(Value::none().to_string(), "none");
    assert_eq!(Value::from(true).to_string(), "true");
    assert_eq!(Value::from(7_i64).to_string(), "7");
    assert_eq!(Value::from(1.0_f64).to_string(), "1.0");
    assert_eq!(Value::from(0.5_f64).to_string(), "0.5");
    assert_eq!(Value::from(f64::NAN).to_string(), "NaN");
    assert_eq!(Value::from(f64::NEG_INFINITY).to_string(), "-inf");
    assert_eq!(Value::string("hi").to_string(), "hi");
    assert_eq!(Value::bytes(b"hi".to_vec()).to_string(), "hi");
    assert_eq!(
        Value::make_iterable(|| std::iter::empty()).to_string(),
        "<iterator>"
    );
    assert_eq!(Value::invalid("bad").to_string(), "<invalid value: bad>");
}

#[test]
fn containers_print_nested_repr() {
    let seq = Value::seq(vec![Value::from(1_i64), Value::string("a"), Value::none()]);
    assert_eq!(seq.to_string(), r#"[1, "a", none]"#);

    let map = Value::new_map();
    map.set_string_key("x", Value::from(1_i64)).unwrap();
    map.set_key(Value::from(2_i64), Value::string("two")).unwrap();
    assert_eq!(map.to_string(), r#"{"x": 1, 2: "two"}"#);
}

#[test]
fn as_str_and_as_bytes() {
    let s = Value::string("héllo");
    assert_eq!(s.as_str(), Some("héllo"));
    assert_eq!(s.as_bytes(), Some("héllo".as_bytes()));

    let b = Value::bytes(vec![0, 159, 146, 150]);
    assert_eq!(b.as_str(), None);
    assert_eq!(b.as_bytes(), Some(&[0_u8, 159, 146, 150][..]));

    assert_eq!(Value::from(1_i64).as_bytes(), None);
}

// ── Length ──────────────────────────────────────────────────────────

#[test]
fn len_of_sized_kinds() {
    assert_eq!(Value::string("héllo").len().unwrap(), 5);
    assert_eq!(Value::bytes(vec![1, 2, 3]).len().unwrap(), 3);
    assert_eq!(seq_of(&[1, 2]).len().unwrap(), 2);
    assert_eq!(Value::new_map().len().unwrap(), 0);
}

#[test]
fn len_failures() {
    assert_eq!(
        Value::from(1_i64).len().unwrap_err().kind(),
        ErrorKind::InvalidOperation
    );
    assert_eq!(
        Value::undefined().len().unwrap_err().kind(),
        ErrorKind::UndefinedError
    );
}

// ── Lookups ─────────────────────────────────────────────────────────

#[test]
fn seq_lookup_by_index() {
    let seq = seq_of(&[10, 20, 30]);
    assert_eq!(seq.get_by_index(1), Value::from(20_i64));
    assert_eq!(seq.get_by_value(&Value::from(-1_i64)), Value::from(30_i64));
    assert_eq!(seq.get_by_value(&Value::from(0.0_f64)), Value::from(10_i64));
}

#[test]
fn seq_lookup_out_of_range_is_undefined_with_cause() {
    let seq = seq_of(&[10]);
    let missing = seq.get_by_index(5);
    assert!(missing.is_undefined());
    assert_eq!(
        missing.undefined_cause(),
        Some(&UndefinedCause::MissingIndex(5))
    );
    assert!(seq.get_by_value(&Value::from(-2_i64)).is_undefined());
}

#[test]
fn string_lookup_yields_characters() {
    let s = Value::string("héllo");
    assert_eq!(s.get_by_index(1), Value::string("é"));
    assert_eq!(s.get_by_value(&Value::from(-1_i64)), Value::string("o"));
    assert!(s.get_by_index(9).is_undefined());
}

#[test]
fn map_lookup_by_str_and_value() {
    let map = Value::new_map();
    map.set_string_key("name", Value::string("World")).unwrap();
    map.set_key(Value::from(1_i64), Value::from(true)).unwrap();

    assert_eq!(map.get_by_str("name"), Value::string("World"));
    assert_eq!(map.get_by_value(&Value::string("name")), Value::string("World"));
    assert_eq!(map.get_by_index(1), Value::from(true));
    assert_eq!(map.get_by_value(&Value::from(1.0_f64)), Value::from(true));
}

#[test]
fn string_and_value_keys_address_the_same_entries() {
    let map = Value::new_map();
    for i in 0..500_i64 {
        map.set_string_key(&format!("k{i}"), Value::from(i)).unwrap();
    }
    // Replacing keeps the entry reachable through both paths.
    map.set_string_key("k7", Value::from(-7_i64)).unwrap();

    for i in [0_i64, 7, 250, 499] {
        let name = format!("k{i}");
        assert_eq!(map.get_by_str(&name), map.get_by_value(&Value::string(name.clone())));
    }
    assert_eq!(map.get_by_str("k7"), Value::from(-7_i64));
    assert!(map.get_by_str("k500").is_undefined());
    assert_eq!(map.len().unwrap(), 500);
}

#[test]
fn large_integral_float_keys_match_integers() {
    let map = Value::new_map();
    map.set_key(Value::from(10_000_000_000_000_000_000_u64), Value::string("int"))
        .unwrap();
    assert_eq!(map.get_by_value(&Value::from(1e19_f64)), Value::string("int"));

    map.set_key(Value::from(-(2_f64.powi(100))), Value::string("float"))
        .unwrap();
    assert_eq!(
        map.get_by_value(&Value::from(-(1_i128 << 100))),
        Value::string("float")
    );
    assert_eq!(map.len().unwrap(), 2);
}

#[test]
fn map_miss_records_key() {
    let map = Value::new_map();
    let missing = map.get_by_str("nope");
    assert_eq!(
        missing.undefined_cause(),
        Some(&UndefinedCause::MissingKey(Key::from("nope")))
    );
}

#[test]
fn lookup_on_scalar_is_not_subscriptable() {
    let missing = Value::from(3_i64).get_by_str("x");
    match missing.undefined_cause() {
        Some(UndefinedCause::NotSubscriptable { kind, .. }) => {
            assert_eq!(*kind, ValueKind::Number);
        }
        other => panic!("expected NotSubscriptable, got {other:?}"),
    }
}

#[test]
fn chained_lookup_keeps_first_cause() {
    let map = Value::new_map();
    let chained = map.get_by_str("a").get_by_str("b").get_by_index(0);
    assert_eq!(
        chained.undefined_cause(),
        Some(&UndefinedCause::MissingKey(Key::from("a")))
    );
}

#[test]
fn lookup_with_container_key_misses() {
    let map = Value::new_map();
    assert!(map.get_by_value(&Value::new_seq()).is_undefined());
}

// ── Mutation ────────────────────────────────────────────────────────

#[test]
fn append_is_visible_through_every_clone() {
    let seq = Value::new_seq();
    let alias = seq.clone();
    seq.append(Value::from(1_i64)).unwrap();
    alias.append(Value::from(2_i64)).unwrap();
    assert_eq!(seq.len().unwrap(), 2);
    assert!(seq.ptr_eq(&alias));
}

#[test]
fn append_to_non_seq_fails() {
    let err = Value::new_map().append(Value::none()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidOperation);
}

#[test]
fn set_key_replaces_in_place() {
    let map = Value::new_map();
    map.set_string_key("a", Value::from(1_i64)).unwrap();
    map.set_string_key("b", Value::from(2_i64)).unwrap();
    map.set_string_key("a", Value::from(3_i64)).unwrap();
    assert_eq!(map.len().unwrap(), 2);
    assert_eq!(map.to_string(), r#"{"a": 3, "b": 2}"#);
}

#[test]
fn set_key_rejects_bad_keys() {
    let map = Value::new_map();
    assert_eq!(
        map.set_key(Value::new_seq(), Value::none()).unwrap_err().kind(),
        ErrorKind::NonPrimitive
    );
    assert_eq!(
        map.set_key(Value::undefined(), Value::none()).unwrap_err().kind(),
        ErrorKind::NonKey
    );
    assert_eq!(
        map.set_key(Value::from(f64::NAN), Value::none()).unwrap_err().kind(),
        ErrorKind::NonKey
    );
    assert_eq!(map.len().unwrap(), 0);
}

#[test]
fn set_key_on_non_map_fails() {
    let err = Value::new_seq()
        .set_string_key("a", Value::none())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidOperation);
}

#[test]
fn self_insertion_is_rejected() {
    let seq = Value::new_seq();
    let err = seq.append(seq.clone()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidOperation);

    let map = Value::new_map();
    let err = map.set_string_key("me", map.clone()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidOperation);
}

#[test]
fn indirect_cycle_is_rejected() {
    let outer = Value::new_seq();
    let inner = Value::new_map();
    outer.append(inner.clone()).unwrap();
    let err = inner.set_string_key("back", outer.clone()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidOperation);
}

#[test]
fn shared_element_in_two_containers_is_allowed() {
    let shared = seq_of(&[1]);
    let a = Value::new_seq();
    let b = Value::new_map();
    a.append(shared.clone()).unwrap();
    b.set_string_key("s", shared.clone()).unwrap();
    assert_eq!(shared.strong_count(), Some(3));
}

#[test]
fn deeply_shared_structure_appends_quickly() {
    // Each level holds the previous one twice, so there are 2^40 paths to
    // the bottom but only 41 distinct containers.
    let mut level = seq_of(&[1]);
    for _ in 0..40 {
        let next = Value::new_seq();
        next.append(level.clone()).unwrap();
        next.append(level.clone()).unwrap();
        level = next;
    }
    let outer = Value::new_seq();
    outer.append(level.clone()).unwrap();
    assert_eq!(outer.len().unwrap(), 1);

    let err = level.get_by_index(0).append(outer).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidOperation);
}

// ── Identity and ownership ──────────────────────────────────────────

#[test]
fn strong_count_tracks_clones() {
    let s = Value::string("x");
    assert_eq!(s.strong_count(), Some(1));
    let t = s.clone();
    assert_eq!(s.strong_count(), Some(2));
    drop(t);
    assert_eq!(s.strong_count(), Some(1));
    assert_eq!(Value::from(1_i64).strong_count(), None);
}

#[test]
fn element_outlives_container() {
    let item = Value::string("kept");
    let seq = Value::new_seq();
    seq.append(item.clone()).unwrap();
    drop(seq);
    assert_eq!(item.strong_count(), Some(1));
    assert_eq!(item.as_str(), Some("kept"));
}

#[test]
fn equality_is_structural_for_containers() {
    assert_eq!(seq_of(&[1, 2]), seq_of(&[1, 2]));
    assert_ne!(seq_of(&[1, 2]), seq_of(&[2, 1]));
    assert_eq!(Value::from(1_i64), Value::from(1.0_f64));
}

#[test]
fn plain_payload_downcasts() {
    let v = Value::plain(String::from("payload"));
    let Value::Plain(obj) = &v else {
        panic!("expected plain value");
    };
    assert_eq!(obj.downcast_ref::<String>().map(String::as_str), Some("payload"));
    assert!(obj.downcast_ref::<i32>().is_none());
    assert_eq!(v.to_string(), "payload");
}

// ── Iteration ───────────────────────────────────────────────────────

#[test]
fn try_iter_on_non_iterables() {
    assert_eq!(
        Value::from(1_i64).try_iter().unwrap_err().kind(),
        ErrorKind::InvalidOperation
    );
    assert_eq!(
        Value::string("abc").try_iter().unwrap_err().kind(),
        ErrorKind::InvalidOperation
    );
    assert_eq!(
        Value::undefined().try_iter().unwrap_err().kind(),
        ErrorKind::UndefinedError
    );
}

#[test]
fn undefined_error_mentions_cause() {
    let missing = Value::new_map().get_by_str("users");
    let err = missing.try_iter().unwrap_err();
    assert!(err.detail().unwrap().contains("\"users\""));
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn seq_index_lookup_matches_vec(items in prop::collection::vec(any::<i64>(), 0..16), idx in -20_i64..20) {
            let seq = Value::seq(items.iter().copied().map(Value::from).collect());
            let expected = if idx < 0 {
                usize::try_from(-idx).ok().and_then(|back| items.len().checked_sub(back))
            } else {
                usize::try_from(idx).ok().filter(|&i| i < items.len())
            };
            let found = seq.get_by_value(&Value::from(idx));
            match expected {
                Some(pos) => prop_assert_eq!(found, Value::from(items[pos])),
                None => prop_assert!(found.is_undefined()),
            }
        }

        #[test]
        fn map_last_write_wins(entries in prop::collection::vec(("[a-d]", any::<i32>()), 0..20)) {
            let map = Value::new_map();
            for (k, v) in &entries {
                map.set_string_key(k, Value::from(*v)).unwrap();
            }
            for (k, _) in &entries {
                let last = entries.iter().rev().find(|(key, _)| key == k).map(|(_, v)| *v).unwrap();
                prop_assert_eq!(map.get_by_str(k), Value::from(last));
            }
        }
    }
}
