//! Sandboxed evaluation of template expressions
//!
//! This is the only component that executes expression source. It parses with
//! [`crate::expr`] and interprets the AST against a scope object.

pub mod builtins;
mod error;
mod interpreter;
pub mod operators;
mod value;

pub use error::EvalError;
pub use interpreter::{Evaluator, MAX_NESTING};
pub use value::{format_number, Function, FunctionKind, Object, Value};
