//! jsonweave - render JSON templates against a context
//!
//! Templates are plain JSON. String leaves may embed an expression between
//! `{{` and `}}`; object nodes carrying `$if`, `$switch` or `$eval` are
//! collapsed into the value they select. Expressions run in a restricted
//! interpreter that can only see the context.
//!
//! # Example
//!
//! ```rust
//! use jsonweave::{render, Context};
//! use serde_json::json;
//!
//! let template = json!({
//!     "id": "{{ clientId }}",
//!     "size": { "$if": "load > 10", "$then": "large", "$else": "small" },
//!     "replicas": { "$eval": "load / 2" }
//! });
//! let context = Context::new().with("clientId", "123").with("load", 12);
//!
//! let output = render(template, context).unwrap();
//! assert_eq!(output, json!({ "id": "123", "size": "large", "replicas": 6 }));
//! ```

pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod eval;
pub mod expr;
pub mod template;

pub use config::{ConfigError, EngineConfig};
pub use context::{Context, ContextError};
pub use engine::Engine;
pub use error::ParseError;
pub use eval::{EvalError, Evaluator, Function, Value};

use serde_json::Value as JsonValue;
use thiserror::Error;

/// Errors that abort a render
#[derive(Debug, Error)]
pub enum RenderError {
    /// A construct's control field is not a string expression
    #[error("invalid {construct} construct at '{path}': control field must be a string expression")]
    InvalidConstruct {
        construct: &'static str,
        path: String,
    },

    /// An embedded expression or construct condition failed to evaluate
    #[error("failed to evaluate '{expression}' at '{path}': {source}")]
    Evaluation {
        expression: String,
        path: String,
        #[source]
        source: EvalError,
    },

    /// A natively typed result has no JSON representation
    #[error("cannot place result at '{path}' into the template: {source}")]
    Conversion {
        path: String,
        #[source]
        source: EvalError,
    },

    /// Nesting of containers and resolved constructs is too deep
    #[error("template nesting at '{path}' exceeds the maximum depth of {max_depth}")]
    DepthExceeded { path: String, max_depth: usize },
}

impl RenderError {
    /// JSON pointer to the slot being rendered when the error occurred
    pub fn path(&self) -> &str {
        match self {
            RenderError::InvalidConstruct { path, .. }
            | RenderError::Evaluation { path, .. }
            | RenderError::Conversion { path, .. }
            | RenderError::DepthExceeded { path, .. } => path,
        }
    }
}

/// Render `template` against `context` with the default configuration
pub fn render(template: JsonValue, context: Context) -> Result<JsonValue, RenderError> {
    render_with_config(template, context, EngineConfig::default())
}

/// Render `template` against `context` with a custom configuration
pub fn render_with_config(
    template: JsonValue,
    context: Context,
    config: EngineConfig,
) -> Result<JsonValue, RenderError> {
    let mut engine = Engine::with_config(template, context, config);
    engine.render()?;
    Ok(engine.into_template())
}
