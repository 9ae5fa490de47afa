//! Runtime values seen by expressions

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::Value as JsonValue;

use super::error::EvalError;

/// Key/value mapping used for objects and for the evaluation scope, in insertion order
pub type Object = IndexMap<String, Value>;

/// Largest integer an f64 represents exactly; integral numbers below it become JSON integers
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

type Callback = dyn Fn(&[Value]) -> Result<Value, EvalError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    /// Supplied by the caller (or the builtins library)
    Host,
    /// Generated by context augmentation for a sequence-valued property
    Accessor,
}

/// A callable exposed to expressions
///
/// Expressions cannot define functions; every function they can reach was put
/// into the scope by the host.
#[derive(Clone)]
pub struct Function {
    name: String,
    kind: FunctionKind,
    callback: Rc<Callback>,
}

impl Function {
    /// Wrap a host closure
    pub fn new<F>(name: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, EvalError> + 'static,
    {
        Self {
            name: name.into(),
            kind: FunctionKind::Host,
            callback: Rc::new(callback),
        }
    }

    /// Positional accessor over a snapshot of `items`
    ///
    /// Out-of-range indices yield null. The index must be a non-negative
    /// integer (or a string holding one).
    pub fn accessor(name: impl Into<String>, items: Vec<Value>) -> Self {
        let name = name.into();
        let accessor_name = name.clone();
        let callback = move |args: &[Value]| {
            let index = match args.first() {
                Some(Value::Number(n)) if *n >= 0.0 && n.fract() == 0.0 => *n as usize,
                Some(Value::String(s)) => s.parse::<usize>().map_err(|_| {
                    EvalError::type_error(format!(
                        "{} expects a non-negative integer index, got '{}'",
                        accessor_name, s
                    ))
                })?,
                Some(other) => {
                    return Err(EvalError::type_error(format!(
                        "{} expects a non-negative integer index, got {}",
                        accessor_name,
                        other.type_name()
                    )))
                }
                None => {
                    return Err(EvalError::type_error(format!(
                        "{} expects an index argument",
                        accessor_name
                    )))
                }
            };
            Ok(items.get(index).cloned().unwrap_or(Value::Null))
        };
        Self {
            name,
            kind: FunctionKind::Accessor,
            callback: Rc::new(callback),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FunctionKind {
        self.kind
    }

    pub fn is_accessor(&self) -> bool {
        self.kind == FunctionKind::Accessor
    }

    pub fn call(&self, args: &[Value]) -> Result<Value, EvalError> {
        (self.callback)(args)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.callback, &other.callback)
    }
}

/// A value produced or consumed by expression evaluation
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(Object),
    Function(Function),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
        }
    }

    /// JavaScript truthiness: null, false, 0, NaN and "" are falsy
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) | Value::Function(_) => true,
        }
    }

    /// Numeric coercion used by arithmetic and relational operators
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Null => 0.0,
            Value::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Number(n) => *n,
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse::<f64>().unwrap_or(f64::NAN)
                }
            }
            Value::Array(items) if items.is_empty() => 0.0,
            Value::Array(items) if items.len() == 1 => Value::String(items[0].to_string()).to_number(),
            Value::Array(_) | Value::Object(_) | Value::Function(_) => f64::NAN,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Convert to a JSON value for insertion into a template
    ///
    /// Integral numbers become JSON integers. Accessor entries generated by
    /// context augmentation are left out of objects. Other functions and
    /// non-finite numbers have no JSON form.
    pub fn to_json(&self) -> Result<JsonValue, EvalError> {
        Ok(match self {
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Number(n) => number_to_json(*n)?,
            Value::String(s) => JsonValue::String(s.clone()),
            Value::Array(items) => JsonValue::Array(
                items
                    .iter()
                    .map(Value::to_json)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Value::Object(map) => {
                let mut out = serde_json::Map::new();
                for (key, value) in map {
                    if matches!(value, Value::Function(f) if f.is_accessor()) {
                        continue;
                    }
                    out.insert(key.clone(), value.to_json()?);
                }
                JsonValue::Object(out)
            }
            Value::Function(f) => {
                return Err(EvalError::type_error(format!(
                    "function '{}' cannot be represented as JSON",
                    f.name()
                )))
            }
        })
    }
}

fn number_to_json(n: f64) -> Result<JsonValue, EvalError> {
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        return Ok(JsonValue::from(n as i64));
    }
    serde_json::Number::from_f64(n)
        .map(JsonValue::Number)
        .ok_or_else(|| {
            EvalError::type_error(format!("{} cannot be represented as JSON", format_number(n)))
        })
}

/// Number to string conversion following JavaScript's `Number.prototype.toString`
///
/// Magnitudes of at least 1e21 or below 1e-6 use exponent form (`1e+21`,
/// `1.5e-7`); everything else prints the shortest round-tripping decimal.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        // Covers -0 as well
        "0".to_string()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        let formatted = format!("{:e}", n);
        match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{}e+{}", mantissa, exponent)
            }
            _ => formatted,
        }
    } else if n.fract() == 0.0 {
        format!("{:.0}", n)
    } else {
        n.to_string()
    }
}

/// String conversion used when an expression result is spliced into text
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::String(s) => write!(f, "{}", s),
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    // Nested nulls print as empty, like Array.prototype.join
                    if !matches!(item, Value::Null) {
                        write!(f, "{}", item)?;
                    }
                }
                Ok(())
            }
            Value::Object(_) => write!(f, "[object Object]"),
            Value::Function(func) => write!(f, "[function {}]", func.name()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Object> for Value {
    fn from(map: Object) -> Self {
        Value::Object(map)
    }
}

impl From<Function> for Value {
    fn from(f: Function) -> Self {
        Value::Function(f)
    }
}

impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(b),
            JsonValue::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            JsonValue::String(s) => Value::String(s),
            JsonValue::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            JsonValue::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}
