//! Error types for expression evaluation

use thiserror::Error;

use crate::error::ParseError;

/// Errors raised while evaluating an expression
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// The expression source is not valid
    #[error("parse errors: {}", format_parse_errors(.0))]
    Parse(Vec<ParseError>),

    /// A name that is not present in the scope
    #[error("undefined reference '{name}'")]
    UndefinedReference { name: String },

    /// Call syntax applied to something that is not a function
    #[error("'{name}' is not a function")]
    NotCallable { name: String },

    /// Operation applied to a value of the wrong type
    #[error("type error: {0}")]
    Type(String),

    /// Expression nesting went past the interpreter's limit
    #[error("expression nesting exceeds {limit} levels")]
    NestingTooDeep { limit: usize },

    /// Raised by a host function provided through the context
    #[error("function '{name}' failed: {message}")]
    Function { name: String, message: String },
}

impl EvalError {
    /// Create a type error
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::Type(message.into())
    }

    /// Create a failure raised from inside a host function
    pub fn function(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Function {
            name: name.into(),
            message: message.into(),
        }
    }
}

fn format_parse_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
