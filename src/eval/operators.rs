//! Operator semantics for the expression language
//!
//! The rules follow JavaScript for the subset of the language we accept:
//! `+` concatenates as soon as either side is not a primitive number-ish
//! value, relational operators compare strings lexically and everything else
//! numerically, `==` coerces between numbers, strings and booleans.

use std::cmp::Ordering;

use crate::expr::{BinaryOp, UnaryOp};

use super::value::Value;

pub fn unary(op: UnaryOp, operand: &Value) -> Value {
    match op {
        UnaryOp::Negate => Value::Number(-operand.to_number()),
        UnaryOp::Plus => Value::Number(operand.to_number()),
        UnaryOp::Not => Value::Bool(!operand.is_truthy()),
    }
}

/// Apply a non-short-circuiting binary operator
pub fn binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> Value {
    match op {
        BinaryOp::Add => add(lhs, rhs),
        BinaryOp::Sub => Value::Number(lhs.to_number() - rhs.to_number()),
        BinaryOp::Mul => Value::Number(lhs.to_number() * rhs.to_number()),
        BinaryOp::Div => Value::Number(lhs.to_number() / rhs.to_number()),
        BinaryOp::Rem => Value::Number(lhs.to_number() % rhs.to_number()),
        BinaryOp::Less => Value::Bool(compare(lhs, rhs) == Some(Ordering::Less)),
        BinaryOp::LessOrEqual => Value::Bool(matches!(
            compare(lhs, rhs),
            Some(Ordering::Less | Ordering::Equal)
        )),
        BinaryOp::Greater => Value::Bool(compare(lhs, rhs) == Some(Ordering::Greater)),
        BinaryOp::GreaterOrEqual => Value::Bool(matches!(
            compare(lhs, rhs),
            Some(Ordering::Greater | Ordering::Equal)
        )),
        BinaryOp::Eq => Value::Bool(loose_eq(lhs, rhs)),
        BinaryOp::NotEq => Value::Bool(!loose_eq(lhs, rhs)),
        BinaryOp::StrictEq => Value::Bool(lhs == rhs),
        BinaryOp::StrictNotEq => Value::Bool(lhs != rhs),
        // Short-circuit operators are handled by the interpreter; these arms
        // only run for already-evaluated operands.
        BinaryOp::And => {
            if lhs.is_truthy() {
                rhs.clone()
            } else {
                lhs.clone()
            }
        }
        BinaryOp::Or => {
            if lhs.is_truthy() {
                lhs.clone()
            } else {
                rhs.clone()
            }
        }
    }
}

fn is_textual(value: &Value) -> bool {
    matches!(
        value,
        Value::String(_) | Value::Array(_) | Value::Object(_) | Value::Function(_)
    )
}

fn add(lhs: &Value, rhs: &Value) -> Value {
    if is_textual(lhs) || is_textual(rhs) {
        Value::String(format!("{}{}", lhs, rhs))
    } else {
        Value::Number(lhs.to_number() + rhs.to_number())
    }
}

/// `None` when the operands are unordered (a NaN is involved)
fn compare(lhs: &Value, rhs: &Value) -> Option<Ordering> {
    match (lhs, rhs) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => lhs.to_number().partial_cmp(&rhs.to_number()),
    }
}

pub fn loose_eq(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::String(_)) => *a == rhs.to_number(),
        (Value::String(_), Value::Number(b)) => lhs.to_number() == *b,
        (Value::Bool(_), _) => loose_eq(&Value::Number(lhs.to_number()), rhs),
        (_, Value::Bool(_)) => loose_eq(lhs, &Value::Number(rhs.to_number())),
        (Value::Array(_) | Value::Object(_), Value::String(_) | Value::Number(_)) => {
            loose_eq(&Value::String(lhs.to_string()), rhs)
        }
        (Value::String(_) | Value::Number(_), Value::Array(_) | Value::Object(_)) => {
            loose_eq(lhs, &Value::String(rhs.to_string()))
        }
        _ => lhs == rhs,
    }
}
