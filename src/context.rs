//! Evaluation context and sequence accessor augmentation
//!
//! Templates address sequence elements with call syntax rather than
//! indexing, so before every render the context is augmented: each
//! array-valued property `k` gets a sibling `$k` function returning the
//! element at a given position.
//!
//! ```text
//! { "task": { "images": [ { "versions": ["12.10"] } ] } }
//!
//! {{ task.$images(0).$versions(0) }}   ->   12.10
//! ```

use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::{debug, warn};

use crate::eval::{builtins, Function, Object, Value};

#[derive(Debug, Error)]
pub enum ContextError {
    /// The top level of a context must be a mapping
    #[error("context must be a JSON object, found {found}")]
    NotAnObject { found: &'static str },
}

/// The data and functions expressions evaluate against
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    entries: Object,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context from a JSON object
    pub fn from_json(json: JsonValue) -> Result<Self, ContextError> {
        match Value::from(json) {
            Value::Object(entries) => Ok(Self { entries }),
            other => Err(ContextError::NotAnObject {
                found: other.type_name(),
            }),
        }
    }

    /// Add an entry, builder style
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Add a host function under `name`, builder style
    pub fn with_function<F>(mut self, name: impl Into<String>, function: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, crate::EvalError> + 'static,
    {
        let name = name.into();
        self.entries
            .insert(name.clone(), Value::Function(Function::new(name, function)));
        self
    }

    /// Add the helper functions from [`builtins`] without shadowing existing entries
    pub fn with_builtins(mut self) -> Self {
        builtins::install(&mut self.entries);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    /// The scope handed to the evaluator
    pub fn entries(&self) -> &Object {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut Object {
        &mut self.entries
    }

    /// Install positional accessors for every array-valued property, recursively
    ///
    /// For each object key `k` holding an array, `<prefix>k` becomes a
    /// function returning the element at the requested index. Nested objects
    /// and array elements are augmented first, so accessors hand out
    /// augmented elements and chains like `$images(0).$versions(0)` resolve.
    ///
    /// An existing accessor under the generated key is refreshed. Any other
    /// existing entry is kept (with a warning) unless `overwrite_user_keys`
    /// is set. Returns the number of accessors installed.
    pub fn augment(&mut self, prefix: &str, overwrite_user_keys: bool) -> usize {
        let installed = augment_object(&mut self.entries, prefix, overwrite_user_keys);
        debug!(installed, "augmented context with sequence accessors");
        installed
    }
}

fn augment_object(object: &mut Object, prefix: &str, overwrite: bool) -> usize {
    let mut installed = 0;
    let keys: Vec<String> = object.keys().cloned().collect();

    for key in keys {
        let items = match object.get_mut(&key) {
            Some(Value::Array(items)) => {
                installed += augment_items(items, prefix, overwrite);
                items.clone()
            }
            Some(Value::Object(inner)) => {
                installed += augment_object(inner, prefix, overwrite);
                continue;
            }
            _ => continue,
        };

        let accessor_key = format!("{}{}", prefix, key);
        match object.get(&accessor_key) {
            Some(Value::Function(existing)) if existing.is_accessor() => {}
            Some(_) if !overwrite => {
                warn!(
                    key = %accessor_key,
                    "context already defines accessor key, keeping existing entry"
                );
                continue;
            }
            _ => {}
        }

        let accessor = Function::accessor(accessor_key.clone(), items);
        object.insert(accessor_key, Value::Function(accessor));
        installed += 1;
    }

    installed
}

/// Arrays nested directly inside arrays have no key to hang an accessor on;
/// only their object elements are augmented.
fn augment_items(items: &mut [Value], prefix: &str, overwrite: bool) -> usize {
    let mut installed = 0;
    for item in items.iter_mut() {
        match item {
            Value::Object(inner) => installed += augment_object(inner, prefix, overwrite),
            Value::Array(nested) => installed += augment_items(nested, prefix, overwrite),
            _ => {}
        }
    }
    installed
}

impl From<Object> for Context {
    fn from(entries: Object) -> Self {
        Self { entries }
    }
}

impl TryFrom<JsonValue> for Context {
    type Error = ContextError;

    fn try_from(json: JsonValue) -> Result<Self, Self::Error> {
        Self::from_json(json)
    }
}

impl FromIterator<(String, Value)> for Context {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
