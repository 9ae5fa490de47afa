//! Integration tests for template rendering

use std::cell::Cell;
use std::rc::Rc;

use pretty_assertions::{assert_eq, assert_ne};
use serde_json::{json, Value as JsonValue};

use jsonweave::{render, Context, Engine, EvalError, RenderError, Value};

fn context(json: JsonValue) -> Context {
    Context::from_json(json).expect("Should be an object")
}

fn rendered(template: JsonValue, context: Context) -> JsonValue {
    let mut engine = Engine::new(template, context);
    engine.render().expect("Should render");
    engine.into_template()
}

fn text_arg(args: &[Value]) -> Result<String, EvalError> {
    match args.first() {
        Some(Value::String(s)) => Ok(s.clone()),
        other => Err(EvalError::type_error(format!("expected a string, got {:?}", other))),
    }
}

// Property and function access

#[test]
fn test_property_access() {
    let out = rendered(json!({"id": "{{ clientId }}"}), context(json!({"clientId": "123"})));
    assert_eq!(out, json!({"id": "123"}));
}

#[test]
fn test_array_access() {
    let template = json!({"id": "{{ $arr(0) }}", "name": "{{ $arr(2) }}", "count": "{{ $arr(1) }}"});
    let out = rendered(template, context(json!({"arr": ["123", 248, "doodle"]})));
    assert_eq!(out, json!({"id": "123", "name": "doodle", "count": "248"}));
}

#[test]
fn test_function_evaluation() {
    let template = json!({"name": "{{ func('jim') }}", "username": "{{ func(a) }}"});
    let ctx = Context::new()
        .with("a", "foobar")
        .with_function("func", |args| Ok(args.first().cloned().unwrap_or_default()));
    assert_eq!(rendered(template, ctx), json!({"name": "jim", "username": "foobar"}));
}

#[test]
fn test_modify_string_with_host_functions() {
    let template = json!({
        "key1": "{{ toUpper( 'hello world') }}",
        "key2": "{{  toLower(toUpper('hello world'))   }}",
        "key3": "{{   toLower(  toUpper(  text))  }}"
    });
    let ctx = Context::new()
        .with("text", "hello World")
        .with_function("toUpper", |args| Ok(text_arg(args)?.to_uppercase().into()))
        .with_function("toLower", |args| Ok(text_arg(args)?.to_lowercase().into()));
    let expected = json!({"key1": "HELLO WORLD", "key2": "hello world", "key3": "hello world"});
    assert_eq!(rendered(template, ctx), expected);
}

#[test]
fn test_modify_string_with_builtins() {
    let template = json!({
        "upper": "{{ toUpper(text) }}",
        "size": "{{ length($items(0)) }}",
        "joined": "{{ join(items, '-') }}"
    });
    let ctx = context(json!({"text": "hello World", "items": ["abc", "de"]})).with_builtins();
    assert_eq!(
        rendered(template, ctx),
        json!({"upper": "HELLO WORLD", "size": "3", "joined": "abc-de"})
    );
}

#[test]
fn test_deep_array_access() {
    let template = json!({
        "image_version": "{{task.$images(0).$versions(0)}}",
        "name": "{{task.$images(0).name}}"
    });
    let ctx = context(json!({"task": {"images": [{"versions": ["12.10"], "name": "ubuntu"}]}}));
    assert_eq!(
        rendered(template, ctx),
        json!({"image_version": "12.10", "name": "ubuntu"})
    );
}

// Templates without expressions

#[test]
fn test_empty_template() {
    assert_eq!(rendered(json!({}), Context::new()), json!({}));
}

#[test]
fn test_non_parameterized_template() {
    let template = json!({"a": {"b": {"c": {"d": "name"}}}});
    assert_eq!(rendered(template.clone(), Context::new()), template);
}

#[test]
fn test_identity_without_expressions() {
    let template = json!({
        "list": [1, 2.5, true, null, "text", {"nested": ["a", {}]}],
        "braces": "{ not } an {expression}",
        "empty": "{{}}"
    });
    assert_eq!(rendered(template.clone(), context(json!({"x": 1}))), template);
}

// Constructs

#[test]
fn test_if_then_shallow() {
    let template = json!({"a": {"$if": "1 < 2", "$then": "a", "$else": "b"}});
    assert_eq!(rendered(template, Context::new()), json!({"a": "a"}));
}

#[test]
fn test_if_else_shallow() {
    let template = json!({"a": {"$if": "1 > 2", "$then": "a", "$else": "b"}});
    assert_eq!(rendered(template, Context::new()), json!({"a": "b"}));
}

#[test]
fn test_if_then_deep() {
    let template = json!({"b": {"a": {"$if": "1 < 2", "$then": "a", "$else": "b"}}});
    assert_eq!(rendered(template, Context::new()), json!({"b": {"a": "a"}}));
}

#[test]
fn test_if_else_deep() {
    let template = json!({"b": {"a": {"$if": "1 > 2", "$then": "a", "$else": "b"}}});
    assert_eq!(rendered(template, Context::new()), json!({"b": {"a": "b"}}));
}

#[test]
fn test_switch_with_one_option() {
    let template = json!({"a": {"$switch": "'case' + a", "case1": "foo"}});
    assert_eq!(rendered(template, context(json!({"a": "1"}))), json!({"a": "foo"}));
}

#[test]
fn test_switch_with_multiple_options() {
    let template = json!({"a": {"$switch": "'case' + b", "case1": "foo", "case2": "bar"}});
    let ctx = context(json!({"a": "1", "b": "2"}));
    assert_eq!(rendered(template, ctx), json!({"a": "bar"}));
}

#[test]
fn test_switch_on_number_uses_string_form() {
    let template = json!({"a": {"$switch": "n + 1", "3": "three"}});
    assert_eq!(rendered(template, context(json!({"n": 2}))), json!({"a": "three"}));
}

#[test]
fn test_unmatched_switch_removes_field() {
    let template = json!({"keep": 1, "a": {"$switch": "'case' + b", "case1": "foo"}});
    let ctx = context(json!({"b": "9"}));
    assert_eq!(rendered(template, ctx), json!({"keep": 1}));
}

#[test]
fn test_eval_with_stateful_function() {
    let template = json!({
        "value": [
            {"$eval": "func(0)"},
            {"$eval": "func(0)"},
            {"$eval": "func(-1)"},
            {"$eval": "func(-2)"},
            {"$eval": "func(0)"},
            {"$eval": "func(0)"},
            {"$eval": "func(0)"},
            {"$eval": "func(0)"},
            {"$eval": "func(0)"},
            {"$eval": "func(1+1)"}
        ]
    });
    let calls = Rc::new(Cell::new(0.0));
    let counter = Rc::clone(&calls);
    let ctx = Context::new().with_function("func", move |args| {
        counter.set(counter.get() + 1.0);
        let x = args.first().map(Value::to_number).unwrap_or(f64::NAN);
        Ok(Value::Number(x + counter.get()))
    });

    let out = rendered(template, ctx);
    assert_eq!(out, json!({"value": [1, 2, 2, 2, 5, 6, 7, 8, 9, 12]}));
    assert_eq!(calls.get(), 10.0);
}

#[test]
fn test_eval_keeps_native_types() {
    let template = json!({
        "n": {"$eval": "count * 2"},
        "b": {"$eval": "count > 1"},
        "o": {"$eval": "{name: name, tags: [1, 'x']}"},
        "s": "{{ count * 2 }}"
    });
    let ctx = context(json!({"count": 3, "name": "web"}));
    assert_eq!(
        rendered(template, ctx),
        json!({"n": 6, "b": true, "o": {"name": "web", "tags": [1, "x"]}, "s": "6"})
    );
}

#[test]
fn test_eval_of_context_subtree_leaves_out_accessors() {
    let template = json!({
        "v": {"$eval": "task"},
        "w": {"$eval": "task.images"}
    });
    let ctx = context(json!({
        "task": {"images": [{"versions": ["12.10"], "name": "ubuntu"}], "name": "build"}
    }));
    assert_eq!(
        rendered(template, ctx),
        json!({
            "v": {"images": [{"versions": ["12.10"], "name": "ubuntu"}], "name": "build"},
            "w": [{"versions": ["12.10"], "name": "ubuntu"}]
        })
    );
}

#[test]
fn test_eval_results_keep_key_order() {
    let template = json!({"v": {"$eval": "cfg"}, "w": {"$eval": "{z: 1, a: 2}"}});
    let out = rendered(template, context(json!({"cfg": {"zeta": 1, "alpha": 2}})));
    assert_eq!(
        serde_json::to_string(&out).expect("Should serialize"),
        r#"{"v":{"zeta":1,"alpha":2},"w":{"z":1,"a":2}}"#
    );
}

fn nested_context() -> Context {
    context(json!({
        "key1": 2, "key2": 1, "key3": 4, "key4": 3, "key5": 6, "key6": 5,
        "foo": "a", "bar": "b"
    }))
}

#[test]
fn test_nested_if_then_then() {
    let template = json!({"val": {
        "$if": "key1 > key2",
        "$then": {"b": {"$if": "key3 > key4", "$then": "{{ foo }}", "$else": "{{ bar }}"}},
        "$else": {"b": "failed"}
    }});
    assert_eq!(rendered(template, nested_context()), json!({"val": {"b": "a"}}));
}

#[test]
fn test_nested_if_else_else() {
    let template = json!({"val": {
        "$if": "key1 < key2",
        "$else": {"b": {"$if": "key3 < key4", "$then": "{{ foo }}", "$else": "{{ bar }}"}},
        "$then": {"b": "failed"}
    }});
    assert_eq!(rendered(template, nested_context()), json!({"val": {"b": "b"}}));
}

#[test]
fn test_nested_if_then_else() {
    let template = json!({"val": {
        "$if": "key1 > key2",
        "$then": {"b": {"$if": "key3 < key4", "$then": "{{ foo }}", "$else": "{{ bar }}"}},
        "$else": {"b": "failed"}
    }});
    assert_eq!(rendered(template, nested_context()), json!({"val": {"b": "b"}}));
}

#[test]
fn test_nested_if_else_then() {
    let template = json!({"val": {
        "$if": "key1 < key2",
        "$else": {"b": {"$if": "key3 > key4", "$then": "{{ foo }}", "$else": "{{ bar }}"}},
        "$then": {"b": "failed"}
    }});
    assert_eq!(rendered(template, nested_context()), json!({"val": {"b": "a"}}));
}

#[test]
fn test_nested_if_three_levels() {
    let template = json!({"val": {
        "$if": "key1 < key2",
        "$else": {"b": {
            "$if": "key3 > key4",
            "$then": {"c": {"$if": "key5 < key6", "$then": "abc", "$else": "{{ bar }}"}},
            "$else": "follow"
        }},
        "$then": {"b": "failed"}
    }});
    assert_eq!(rendered(template, nested_context()), json!({"val": {"b": {"c": "b"}}}));
}

#[test]
fn test_non_string_condition_is_invalid_construct() {
    let err = render(json!({"a": {"$if": 42, "$then": 1}}), Context::new()).unwrap_err();
    match err {
        RenderError::InvalidConstruct { construct, path } => {
            assert_eq!(construct, "$if");
            assert_eq!(path, "/a");
        }
        other => panic!("Expected invalid construct, got {:?}", other),
    }
}

#[test]
fn test_non_string_switch_is_invalid_construct() {
    let err = render(json!({"a": {"$switch": 1, "1": "one"}}), Context::new()).unwrap_err();
    match err {
        RenderError::InvalidConstruct { construct, path } => {
            assert_eq!(construct, "$switch");
            assert_eq!(path, "/a");
        }
        other => panic!("Expected invalid construct, got {:?}", other),
    }
}

#[test]
fn test_non_string_eval_is_invalid_construct() {
    let err = render(json!({"list": [{"$eval": [1, 2]}]}), Context::new()).unwrap_err();
    match err {
        RenderError::InvalidConstruct { construct, path } => {
            assert_eq!(construct, "$eval");
            assert_eq!(path, "/list/0");
        }
        other => panic!("Expected invalid construct, got {:?}", other),
    }
}

#[test]
fn test_syntax_error_is_reported_with_expression() {
    let err = render(json!({"a": ["{{ 1 + }}"]}), Context::new()).unwrap_err();
    match err {
        RenderError::Evaluation { expression, path, source } => {
            assert_eq!(expression, "1 +");
            assert_eq!(path, "/a/0");
            assert!(matches!(source, EvalError::Parse(_)));
        }
        other => panic!("Expected evaluation error, got {:?}", other),
    }
}

#[test]
fn test_host_function_error_aborts_render() {
    let ctx = Context::new().with_function("fail", |_| Err(EvalError::function("fail", "boom")));
    let err = render(json!({"a": "{{ fail() }}"}), ctx).unwrap_err();
    assert_eq!(
        err.to_string(),
        "failed to evaluate 'fail()' at '/a': function 'fail' failed: boom"
    );
}

#[test]
fn test_overlong_expression_is_an_error() {
    let leaf = format!("{{{{ {}1 }}}}", "!".repeat(20_000));
    let err = render(json!({"v": leaf}), Context::new()).unwrap_err();
    match err {
        RenderError::Evaluation { path, source, .. } => {
            assert_eq!(path, "/v");
            assert!(matches!(source, EvalError::Parse(_)));
        }
        other => panic!("Expected evaluation error, got {:?}", other),
    }
}

#[test]
fn test_deeply_nested_expression_is_an_error() {
    let leaf = format!("{{{{ {}1 }}}}", "-".repeat(400));
    let err = render(json!({"v": leaf}), Context::new()).unwrap_err();
    match err {
        RenderError::Evaluation { source, .. } => {
            assert!(matches!(source, EvalError::NestingTooDeep { .. }));
        }
        other => panic!("Expected evaluation error, got {:?}", other),
    }
}

// Engine accessors

#[test]
fn test_template_get_set() {
    let c1 = json!({"a": {"foo": "bar"}});
    let c2 = json!({"a": {"b": "c"}});
    let c3 = json!({"d": {"e": "f"}});

    let mut engine = Engine::new(c1.clone(), Context::new());
    assert_eq!(engine.template(), &c1);

    engine.set_template(c2.clone());
    assert_ne!(engine.template(), &c1);
    assert_eq!(engine.template(), &c2);

    engine.set_template(c3.clone());
    assert_ne!(engine.template(), &c1);
    assert_eq!(engine.template(), &c3);
}

#[test]
fn test_context_get_set() {
    let c1 = json!({"a": {"foo": "bar"}});
    let c2 = json!({"a": {"b": "c"}});
    let c3 = json!({"d": {"e": "f"}});

    let mut engine = Engine::new(json!({}), context(c1.clone()));
    assert_eq!(engine.context(), &context(c1.clone()));

    engine.set_context(context(c2.clone()));
    assert_ne!(engine.context(), &context(c1.clone()));
    assert_eq!(engine.context(), &context(c2));

    engine.set_context(context(c3.clone()));
    assert_ne!(engine.context(), &context(c1));
    assert_eq!(engine.context(), &context(c3));
}

#[test]
fn test_template_passed_in_is_not_affected_by_render() {
    let passed_in = json!({"id": "{{ clientId }}"});
    let mut engine = Engine::new(passed_in.clone(), context(json!({"clientId": "123"})));
    engine.render().expect("Should render");
    assert_eq!(passed_in, json!({"id": "{{ clientId }}"}));
    assert_eq!(engine.template(), &json!({"id": "123"}));
}

#[test]
fn test_non_object_context_is_rejected() {
    assert!(Context::from_json(json!([1, 2])).is_err());
}
