//! Template rendering
//!
//! A template is any JSON value. String leaves may embed one delimited
//! expression, and object nodes may be control constructs that collapse into
//! one of their branches:
//!
//! ```text
//! {
//!   "id": "{{ clientId }}",
//!   "tier": { "$if": "load > 10", "$then": "large", "$else": "small" },
//!   "image": { "$switch": "'os_' + os", "os_linux": "ubuntu", "os_mac": "macos" },
//!   "replicas": { "$eval": "load / 2" }
//! }
//! ```

mod delimiters;
mod resolver;

pub use delimiters::{Delimiters, Placeholder};
pub use resolver::{
    ConstructKind, Resolver, ELSE_KEY, EVAL_KEY, IF_KEY, SWITCH_KEY, THEN_KEY,
};
