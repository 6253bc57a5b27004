#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Tests use unwrap for brevity"
)]

use crate::{Environment, UndefinedBehavior};
use jinx_value::{ErrorKind, Value, ValueKind};
use pretty_assertions::assert_eq;

fn env_with(name: &str, source: &str) -> Environment {
    let mut env = Environment::new();
    env.add_template(name, source).unwrap();
    env
}

fn ctx() -> Value {
    let map = Value::new_map();
    map.set_string_key("name", Value::string("World")).unwrap();
    map.set_string_key(
        "items",
        Value::seq(vec![
            Value::string("First"),
            Value::string("Second"),
            Value::from(42_i64),
        ]),
    )
    .unwrap();
    map
}

// ── render_template ─────────────────────────────────────────────────

#[test]
fn renders_loops_over_host_sequences() {
    let env = env_with("list", "{% for x in items %}{{ x }};{% endfor %}");
    assert_eq!(
        env.render_template("list", &ctx()).unwrap(),
        "First;Second;42;"
    );
}

#[test]
fn host_sequences_have_length_and_index() {
    let env = env_with("t", "{{ items|length }} {{ items[1] }}");
    assert_eq!(env.render_template("t", &ctx()).unwrap(), "3 Second");
}

#[test]
fn renders_loops_over_host_maps() {
    let map = Value::new_map();
    map.set_string_key("b", Value::from(1_i64)).unwrap();
    map.set_string_key("a", Value::from(2_i64)).unwrap();
    let root = Value::new_map();
    root.set_string_key("m", map).unwrap();

    let env = env_with("t", "{% for k in m %}{{ k }}={{ m[k] }},{% endfor %}");
    assert_eq!(env.render_template("t", &root).unwrap(), "b=1,a=2,");
}

#[test]
fn renders_host_iterables_on_every_pass() {
    let root = Value::new_map();
    root.set_string_key(
        "nums",
        Value::make_iterable(|| (1..=3_i64).map(Value::from)),
    )
    .unwrap();
    let env = env_with(
        "t",
        "{% for n in nums %}{{ n }}{% endfor %}|{% for n in nums %}{{ n }}{% endfor %}",
    );
    assert_eq!(env.render_template("t", &root).unwrap(), "123|123");
}

#[test]
fn plain_values_render_with_display() {
    let root = Value::new_map();
    root.set_string_key("obj", Value::plain(String::from("opaque")))
        .unwrap();
    let env = env_with("t", "[{{ obj }}]");
    assert_eq!(env.render_template("t", &root).unwrap(), "[opaque]");
}

#[test]
fn missing_template_is_not_found() {
    let env = Environment::new();
    let err = env.render_template("nope", &ctx()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TemplateNotFound);
}

#[test]
fn non_map_context_reads_as_undefined() {
    let env = env_with("t", "[{{ name }}]");
    assert_eq!(
        env.render_template("t", &Value::from(5_i64)).unwrap(),
        "[]"
    );
}

#[test]
fn invalid_context_fails_to_bind() {
    let env = env_with("t", "x");
    let err = env
        .render_template("t", &Value::invalid("broken"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BadSerialization);
}

#[test]
fn nested_invalid_reads_as_undefined() {
    let root = Value::new_map();
    root.set_string_key("bad", Value::invalid("broken")).unwrap();
    let env = env_with("t", "{{ bad is undefined }}");
    assert_eq!(env.render_template("t", &root).unwrap(), "true");
}

// ── Undefined policy ────────────────────────────────────────────────

#[test]
fn lenient_renders_undefined_as_empty() {
    let env = env_with("t", "[{{ missing }}]");
    assert_eq!(env.render_template("t", &ctx()).unwrap(), "[]");
}

#[test]
fn strict_fails_on_undefined_use() {
    let mut env = env_with("t", "[{{ missing }}]");
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    let err = env.render_template("t", &ctx()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UndefinedError);
    assert_eq!(err.name(), Some("t"));
}

#[test]
fn chainable_allows_deep_lookups() {
    let mut env = env_with("t", "[{{ missing.deeper.still }}]");
    assert!(env.render_template("t", &ctx()).is_err());

    env.set_undefined_behavior(UndefinedBehavior::Chainable);
    assert_eq!(env.render_template("t", &ctx()).unwrap(), "[]");
}

// ── Runtime failures ────────────────────────────────────────────────

#[test]
fn unknown_filter_is_reported() {
    let mut env = Environment::new();
    let result = env
        .add_template("t", "{{ name|frobnicate }}")
        .and_then(|()| env.render_template("t", &ctx()).map(drop));
    assert_eq!(result.unwrap_err().kind(), ErrorKind::UnknownFilter);
}

#[test]
fn recursion_limit_is_eval_block_and_not_fatal_to_env() {
    let mut env = Environment::new();
    env.set_recursion_limit(20);
    env.add_template("deep", "x{% include 'deep' %}").unwrap();
    env.add_template("fine", "ok").unwrap();

    let err = env.render_template("deep", &ctx()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EvalBlock);
    assert_eq!(env.render_template("fine", &ctx()).unwrap(), "ok");
}

#[test]
fn debug_mode_attaches_source_excerpt() {
    let mut env = Environment::new();
    env.set_debug(true);
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.add_template("t", "line one\n{{ missing }}").unwrap();
    let err = env.render_template("t", &ctx()).unwrap_err();
    assert_eq!(err.line(), Some(2));
    assert!(err.debug_info().is_some());
}

// ── render_named_str ────────────────────────────────────────────────

#[test]
fn named_str_renders_without_registering() {
    let env = Environment::new();
    let out = env
        .render_named_str("inline", "Hi {{ name }}", &ctx())
        .unwrap();
    assert_eq!(out, "Hi World");
    assert!(!env.has_template("inline"));
}

#[test]
fn named_str_syntax_error_carries_name() {
    let env = Environment::new();
    let err = env
        .render_named_str("inline", "{% if %}", &ctx())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SyntaxError);
    assert_eq!(err.name(), Some("inline"));
}

// ── eval_expr ───────────────────────────────────────────────────────

#[test]
fn eval_simple_arithmetic() {
    let env = Environment::new();
    let value = env.eval_expr("1 + 2", &Value::new_map()).unwrap();
    assert_eq!(value.kind(), ValueKind::Number);
    assert_eq!(value.to_string(), "3");
}

#[test]
fn eval_keeps_floats_floating() {
    let env = Environment::new();
    let value = env.eval_expr("1.5 * 2", &Value::new_map()).unwrap();
    assert_eq!(value.to_string(), "3.0");
    assert_eq!(value.as_f64().unwrap(), 3.0);
}

#[test]
fn eval_reads_context() {
    let env = Environment::new();
    let value = env.eval_expr("name ~ '!'", &ctx()).unwrap();
    assert_eq!(value.as_str(), Some("World!"));
}

#[test]
fn eval_returns_host_containers_by_identity() {
    let env = Environment::new();
    let root = ctx();
    let items = root.get_by_str("items");
    let value = env.eval_expr("items", &root).unwrap();
    assert!(value.ptr_eq(&items));
}

#[test]
fn eval_builds_new_containers() {
    let env = Environment::new();
    let value = env
        .eval_expr("{'a': [1, 'two', none]}", &Value::new_map())
        .unwrap();
    assert_eq!(value.kind(), ValueKind::Map);
    assert_eq!(value.to_string(), r#"{"a": [1, "two", none]}"#);
}

#[test]
fn eval_compile_failure() {
    let env = Environment::new();
    let err = env.eval_expr("1 +", &Value::new_map()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SyntaxError);
}

#[test]
fn eval_rejects_map_with_container_key() {
    let env = Environment::new();
    let err = env
        .eval_expr("{[1]: 2, 'a': 3}", &Value::new_map())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BadSerialization);
}

#[test]
fn eval_keeps_large_integers_exact() {
    let env = Environment::new();
    let value = env
        .eval_expr("10000000000000000000 + 1", &Value::new_map())
        .unwrap();
    assert_eq!(value.to_string(), "10000000000000000001");
    assert!(!value.to_string().contains('.'));
}

#[test]
fn eval_missing_name_is_undefined() {
    let env = Environment::new();
    let value = env.eval_expr("nothing", &Value::new_map()).unwrap();
    assert_eq!(value.kind(), ValueKind::Undefined);
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn host_integers_render_like_rust(items in prop::collection::vec(any::<i64>(), 0..12)) {
            let root = Value::new_map();
            root.set_string_key("items", Value::seq(items.iter().copied().map(Value::from).collect()))
                .unwrap();
            let env = env_with("t", "{{ items|join(',') }}|{{ items|length }}");
            let expected = format!(
                "{}|{}",
                items.iter().map(ToString::to_string).collect::<Vec<_>>().join(","),
                items.len()
            );
            prop_assert_eq!(env.render_template("t", &root).unwrap(), expected);
        }

        #[test]
        fn eval_round_trips_host_strings(text in "[a-zA-Z0-9 ]{0,24}") {
            let root = Value::new_map();
            root.set_string_key("s", Value::string(text.clone())).unwrap();
            let value = Environment::new().eval_expr("s", &root).unwrap();
            prop_assert_eq!(value.as_str(), Some(text.as_str()));
        }
    }
}
