//! Template walking - substitutes expressions and collapses constructs

use serde_json::{Map, Value as JsonValue};
use tracing::{debug, trace};

use crate::config::EngineConfig;
use crate::eval::{Evaluator, Object, Value};
use crate::RenderError;

pub const IF_KEY: &str = "$if";
pub const THEN_KEY: &str = "$then";
pub const ELSE_KEY: &str = "$else";
pub const SWITCH_KEY: &str = "$switch";
pub const EVAL_KEY: &str = "$eval";

/// The control constructs an object node can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructKind {
    /// `{"$if": cond, "$then": a, "$else": b}`
    If,
    /// `{"$switch": expr, "<case>": value, ...}`
    Switch,
    /// `{"$eval": expr}`
    Eval,
}

impl ConstructKind {
    /// Detect the construct governing `node`; `$if` beats `$switch` beats `$eval`
    pub fn detect(node: &Map<String, JsonValue>) -> Option<Self> {
        if node.contains_key(IF_KEY) {
            Some(ConstructKind::If)
        } else if node.contains_key(SWITCH_KEY) {
            Some(ConstructKind::Switch)
        } else if node.contains_key(EVAL_KEY) {
            Some(ConstructKind::Eval)
        } else {
            None
        }
    }

    /// The reserved key holding the control expression
    pub fn key(self) -> &'static str {
        match self {
            ConstructKind::If => IF_KEY,
            ConstructKind::Switch => SWITCH_KEY,
            ConstructKind::Eval => EVAL_KEY,
        }
    }
}

/// Outcome of rendering one slot of a container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Present,
    /// Construct resolved to nothing (missing branch or case)
    Absent,
}

/// Walks a template in place against one evaluation scope
pub struct Resolver<'a> {
    evaluator: &'a Evaluator,
    scope: &'a Object,
    config: &'a EngineConfig,
}

impl<'a> Resolver<'a> {
    pub fn new(evaluator: &'a Evaluator, scope: &'a Object, config: &'a EngineConfig) -> Self {
        Self {
            evaluator,
            scope,
            config,
        }
    }

    /// Render `root` in place
    ///
    /// Object keys are visited in insertion order and arrays in index order.
    /// The root itself is never collapsed as a construct. On error the tree is
    /// left as rendered up to the failing slot.
    pub fn walk(&self, root: &mut JsonValue) -> Result<(), RenderError> {
        match root {
            JsonValue::String(_) => self.substitute(root, ""),
            JsonValue::Object(map) => self.walk_object(map, "", 0),
            JsonValue::Array(items) => self.walk_array(items, "", 0),
            _ => Ok(()),
        }
    }

    fn walk_object(
        &self,
        map: &mut Map<String, JsonValue>,
        path: &str,
        depth: usize,
    ) -> Result<(), RenderError> {
        let mut absent = Vec::new();
        for (key, child) in map.iter_mut() {
            let child_path = format!("{}/{}", path, escape_pointer(key));
            if self.resolve_slot(child, &child_path, depth + 1)? == Slot::Absent {
                absent.push(key.clone());
            }
        }
        for key in absent {
            map.shift_remove(&key);
        }
        Ok(())
    }

    fn walk_array(&self, items: &mut [JsonValue], path: &str, depth: usize) -> Result<(), RenderError> {
        for (index, item) in items.iter_mut().enumerate() {
            let child_path = format!("{}/{}", path, index);
            if self.resolve_slot(item, &child_path, depth + 1)? == Slot::Absent {
                *item = JsonValue::Null;
            }
        }
        Ok(())
    }

    fn resolve_slot(
        &self,
        slot: &mut JsonValue,
        path: &str,
        depth: usize,
    ) -> Result<Slot, RenderError> {
        if depth > self.config.max_depth {
            return Err(RenderError::DepthExceeded {
                path: path.to_string(),
                max_depth: self.config.max_depth,
            });
        }

        match slot {
            JsonValue::String(_) => {
                self.substitute(slot, path)?;
                Ok(Slot::Present)
            }
            JsonValue::Object(map) => match ConstructKind::detect(map) {
                Some(kind) => match self.resolve_construct(kind, map, path)? {
                    // The chosen value may itself hold expressions or constructs
                    Some(replacement) => {
                        *slot = replacement;
                        self.resolve_slot(slot, path, depth + 1)
                    }
                    None => Ok(Slot::Absent),
                },
                None => {
                    self.walk_object(map, path, depth)?;
                    Ok(Slot::Present)
                }
            },
            JsonValue::Array(items) => {
                self.walk_array(items, path, depth)?;
                Ok(Slot::Present)
            }
            _ => Ok(Slot::Present),
        }
    }

    /// Collapse a construct node into its replacement, `None` meaning absent
    fn resolve_construct(
        &self,
        kind: ConstructKind,
        node: &mut Map<String, JsonValue>,
        path: &str,
    ) -> Result<Option<JsonValue>, RenderError> {
        let source = match node.get(kind.key()) {
            Some(JsonValue::String(s)) => s.clone(),
            _ => {
                return Err(RenderError::InvalidConstruct {
                    construct: kind.key(),
                    path: path.to_string(),
                })
            }
        };
        let value = self.evaluate(&source, path)?;

        match kind {
            ConstructKind::If => {
                let branch = if value.is_truthy() { THEN_KEY } else { ELSE_KEY };
                debug!(path, condition = %source, branch, "resolved conditional");
                Ok(node.shift_remove(branch))
            }
            ConstructKind::Switch => {
                let case = value.to_string();
                let chosen = node.shift_remove(&case);
                debug!(path, case = %case, matched = chosen.is_some(), "resolved switch");
                Ok(chosen)
            }
            ConstructKind::Eval => {
                debug!(path, expression = %source, "resolved eval");
                value
                    .to_json()
                    .map(Some)
                    .map_err(|source| RenderError::Conversion {
                        path: path.to_string(),
                        source,
                    })
            }
        }
    }

    /// Replace the delimited expression of a string slot with its result
    fn substitute(&self, slot: &mut JsonValue, path: &str) -> Result<(), RenderError> {
        let JsonValue::String(leaf) = slot else {
            return Ok(());
        };
        let Some(placeholder) = self.config.delimiters.find(leaf) else {
            return Ok(());
        };

        let value = self.evaluate(placeholder.expression, path)?;
        trace!(path, expression = placeholder.expression, "substituted expression");

        let replacement = if self.config.preserve_whole_leaf_types && placeholder.is_whole(leaf) {
            value.to_json().map_err(|source| RenderError::Conversion {
                path: path.to_string(),
                source,
            })?
        } else {
            JsonValue::String(leaf.replace(placeholder.span, &value.to_string()))
        };
        *slot = replacement;
        Ok(())
    }

    fn evaluate(&self, expression: &str, path: &str) -> Result<Value, RenderError> {
        self.evaluator
            .evaluate(expression, self.scope)
            .map_err(|source| RenderError::Evaluation {
                expression: expression.to_string(),
                path: path.to_string(),
                source,
            })
    }
}

/// Escape a key for use as a JSON pointer segment
fn escape_pointer(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}
