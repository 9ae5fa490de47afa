//! Parser for the restricted expression language embedded in templates

pub mod ast;
mod grammar;
pub mod lexer;

pub use ast::*;
pub use grammar::{parse, MAX_TOKENS};
