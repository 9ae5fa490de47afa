//! Tree-walking interpreter for parsed expressions
//!
//! Names resolve against the scope handed to [`Evaluator::evaluate`] and
//! nothing else. There is no assignment, no function definition and no route
//! to host state, so an expression can only observe the scope and call the
//! functions the host placed in it.

use crate::expr::{self, BinaryOp, Expr, Spanned};

use super::error::EvalError;
use super::operators;
use super::value::{Object, Value};

/// Deepest expression nesting the interpreter will descend into
pub const MAX_NESTING: usize = 256;

/// Evaluates expression source against a scope
#[derive(Debug, Clone, Copy, Default)]
pub struct Evaluator;

impl Evaluator {
    pub fn new() -> Self {
        Self
    }

    /// Parse and evaluate `source` with read access limited to `scope`
    pub fn evaluate(&self, source: &str, scope: &Object) -> Result<Value, EvalError> {
        let expr = expr::parse(source).map_err(EvalError::Parse)?;
        self.eval(&expr, scope)
    }

    /// Evaluate an already parsed expression
    pub fn eval(&self, expr: &Spanned<Expr>, scope: &Object) -> Result<Value, EvalError> {
        self.eval_at(expr, scope, 0)
    }

    fn eval_at(&self, expr: &Spanned<Expr>, scope: &Object, depth: usize) -> Result<Value, EvalError> {
        if depth > MAX_NESTING {
            return Err(EvalError::NestingTooDeep { limit: MAX_NESTING });
        }
        match &expr.node {
            Expr::Null => Ok(Value::Null),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::String(s) => Ok(Value::String(s.clone())),
            Expr::Array(items) => items
                .iter()
                .map(|item| self.eval_at(item, scope, depth + 1))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Expr::Object(entries) => {
                let mut map = Object::new();
                for (key, value) in entries {
                    map.insert(key.clone(), self.eval_at(value, scope, depth + 1)?);
                }
                Ok(Value::Object(map))
            }
            Expr::Ident(name) => scope
                .get(name)
                .cloned()
                .ok_or_else(|| EvalError::UndefinedReference { name: name.clone() }),
            Expr::Member { target, name } => {
                let target = self.eval_at(target, scope, depth + 1)?;
                member(&target, name)
            }
            Expr::Index { target, index } => {
                let target = self.eval_at(target, scope, depth + 1)?;
                let index = self.eval_at(index, scope, depth + 1)?;
                element(&target, &index)
            }
            Expr::Call { callee, args } => {
                let target = self.eval_at(callee, scope, depth + 1)?;
                let Value::Function(function) = target else {
                    return Err(EvalError::NotCallable {
                        name: callee.node.describe(),
                    });
                };
                // Arguments are evaluated left to right before the call
                let args = args
                    .iter()
                    .map(|arg| self.eval_at(arg, scope, depth + 1))
                    .collect::<Result<Vec<_>, _>>()?;
                function.call(&args)
            }
            Expr::Unary { op, operand } => {
                let operand = self.eval_at(operand, scope, depth + 1)?;
                Ok(operators::unary(*op, &operand))
            }
            Expr::Binary {
                op: BinaryOp::And,
                lhs,
                rhs,
            } => {
                let lhs = self.eval_at(lhs, scope, depth + 1)?;
                if lhs.is_truthy() {
                    self.eval_at(rhs, scope, depth + 1)
                } else {
                    Ok(lhs)
                }
            }
            Expr::Binary {
                op: BinaryOp::Or,
                lhs,
                rhs,
            } => {
                let lhs = self.eval_at(lhs, scope, depth + 1)?;
                if lhs.is_truthy() {
                    Ok(lhs)
                } else {
                    self.eval_at(rhs, scope, depth + 1)
                }
            }
            Expr::Binary { op, lhs, rhs } => {
                let lhs = self.eval_at(lhs, scope, depth + 1)?;
                let rhs = self.eval_at(rhs, scope, depth + 1)?;
                Ok(operators::binary(*op, &lhs, &rhs))
            }
            Expr::Conditional {
                test,
                then,
                otherwise,
            } => {
                if self.eval_at(test, scope, depth + 1)?.is_truthy() {
                    self.eval_at(then, scope, depth + 1)
                } else {
                    self.eval_at(otherwise, scope, depth + 1)
                }
            }
        }
    }
}

/// Property read: `target.name`
fn member(target: &Value, name: &str) -> Result<Value, EvalError> {
    match target {
        Value::Null => Err(EvalError::type_error(format!(
            "cannot read property '{}' of null",
            name
        ))),
        Value::Object(map) => Ok(map.get(name).cloned().unwrap_or(Value::Null)),
        Value::Array(items) => {
            if name == "length" {
                Ok(Value::Number(items.len() as f64))
            } else {
                Ok(name
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| items.get(i).cloned())
                    .unwrap_or(Value::Null))
            }
        }
        Value::String(s) if name == "length" => Ok(Value::Number(s.chars().count() as f64)),
        _ => Ok(Value::Null),
    }
}

/// Computed read: `target[index]`
fn element(target: &Value, index: &Value) -> Result<Value, EvalError> {
    match (target, index) {
        (Value::Array(items), Value::Number(n)) => Ok(position(*n)
            .and_then(|i| items.get(i).cloned())
            .unwrap_or(Value::Null)),
        (Value::String(s), Value::Number(n)) => Ok(position(*n)
            .and_then(|i| s.chars().nth(i))
            .map(|c| Value::String(c.to_string()))
            .unwrap_or(Value::Null)),
        _ => member(target, &index.to_string()),
    }
}

fn position(n: f64) -> Option<usize> {
    (n >= 0.0 && n.fract() == 0.0).then_some(n as usize)
}
