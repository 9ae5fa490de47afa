//! Optional helper functions for template expressions
//!
//! None of these are available unless the host installs them into the
//! context, e.g. with [`install`].

use super::error::EvalError;
use super::value::{Function, Object, Value};

/// All builtin functions, keyed by the name expressions call them with
pub fn functions() -> Vec<Function> {
    vec![
        Function::new("toUpper", |args| {
            Ok(Value::String(arg(args, 0).to_string().to_uppercase()))
        }),
        Function::new("toLower", |args| {
            Ok(Value::String(arg(args, 0).to_string().to_lowercase()))
        }),
        Function::new("trim", |args| {
            Ok(Value::String(arg(args, 0).to_string().trim().to_string()))
        }),
        Function::new("length", |args| match arg(args, 0) {
            Value::String(s) => Ok(Value::Number(s.chars().count() as f64)),
            Value::Array(items) => Ok(Value::Number(items.len() as f64)),
            Value::Object(map) => Ok(Value::Number(map.len() as f64)),
            other => Err(EvalError::function(
                "length",
                format!("expected a string, array or object, got {}", other.type_name()),
            )),
        }),
        Function::new("string", |args| Ok(Value::String(arg(args, 0).to_string()))),
        Function::new("number", |args| Ok(Value::Number(arg(args, 0).to_number()))),
        Function::new("keys", |args| match arg(args, 0) {
            Value::Object(map) => Ok(Value::Array(
                map.iter()
                    .filter(|(_, value)| !matches!(value, Value::Function(f) if f.is_accessor()))
                    .map(|(key, _)| Value::String(key.clone()))
                    .collect(),
            )),
            other => Err(EvalError::function(
                "keys",
                format!("expected an object, got {}", other.type_name()),
            )),
        }),
        Function::new("join", |args| match arg(args, 0) {
            Value::Array(items) => {
                let separator = match args.get(1) {
                    Some(sep) => sep.to_string(),
                    None => ",".to_string(),
                };
                Ok(Value::String(
                    items
                        .iter()
                        .map(|item| item.to_string())
                        .collect::<Vec<_>>()
                        .join(&separator),
                ))
            }
            other => Err(EvalError::function(
                "join",
                format!("expected an array, got {}", other.type_name()),
            )),
        }),
    ]
}

/// Insert every builtin into `scope`, keeping entries the host already defined
pub fn install(scope: &mut Object) -> usize {
    let mut installed = 0;
    for function in functions() {
        if scope.contains_key(function.name()) {
            continue;
        }
        scope.insert(function.name().to_string(), Value::Function(function));
        installed += 1;
    }
    installed
}

/// Missing arguments read as null
fn arg(args: &[Value], index: usize) -> Value {
    args.get(index).cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::Evaluator;

    fn scope_with_builtins() -> Object {
        let mut scope = Object::new();
        install(&mut scope);
        scope.insert("text".to_string(), Value::from("hello World"));
        scope
    }

    #[test]
    fn test_case_functions() {
        let scope = scope_with_builtins();
        let evaluator = Evaluator::new();
        assert_eq!(
            evaluator.evaluate("toUpper('hello world')", &scope).unwrap(),
            Value::from("HELLO WORLD")
        );
        assert_eq!(
            evaluator.evaluate("toLower(toUpper(text))", &scope).unwrap(),
            Value::from("hello world")
        );
    }

    #[test]
    fn test_collection_functions() {
        let scope = scope_with_builtins();
        let evaluator = Evaluator::new();
        assert_eq!(
            evaluator.evaluate("length([1, 2, 3])", &scope).unwrap(),
            Value::from(3)
        );
        assert_eq!(
            evaluator.evaluate("join(keys({b: 1, a: 2}), '-')", &scope).unwrap(),
            Value::from("b-a")
        );
        assert!(evaluator.evaluate("length(1)", &scope).is_err());
    }

    #[test]
    fn test_install_keeps_host_definitions() {
        let mut scope = Object::new();
        scope.insert("trim".to_string(), Value::from("mine"));
        let installed = install(&mut scope);
        assert_eq!(installed, functions().len() - 1);
        assert_eq!(scope.get("trim"), Some(&Value::from("mine")));
    }
}
