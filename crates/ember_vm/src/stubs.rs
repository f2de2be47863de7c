//! Operator semantics behind the binary and unary code stubs.

use crate::value::Value;
use ember_bytecode::{BinaryKind, UnaryKind};
use std::cmp::Ordering;

/// Applies a binary operator.
pub fn binary(kind: BinaryKind, left: &Value, right: &Value) -> Value {
    match kind {
        BinaryKind::Add => add(left, right),
        BinaryKind::Sub => Value::Number(left.to_number() - right.to_number()),
        BinaryKind::Mul => Value::Number(left.to_number() * right.to_number()),
        BinaryKind::Div => Value::Number(left.to_number() / right.to_number()),
        BinaryKind::Mod => Value::Number(left.to_number() % right.to_number()),
        BinaryKind::Lt => Value::Bool(compare(left, right) == Some(Ordering::Less)),
        BinaryKind::Le => Value::Bool(matches!(
            compare(left, right),
            Some(Ordering::Less | Ordering::Equal)
        )),
        BinaryKind::Gt => Value::Bool(compare(left, right) == Some(Ordering::Greater)),
        BinaryKind::Ge => Value::Bool(matches!(
            compare(left, right),
            Some(Ordering::Greater | Ordering::Equal)
        )),
        BinaryKind::Eq => Value::Bool(left.loose_equals(right)),
        BinaryKind::NotEq => Value::Bool(!left.loose_equals(right)),
        BinaryKind::StrictEq => Value::Bool(left.strict_equals(right)),
        BinaryKind::StrictNotEq => Value::Bool(!left.strict_equals(right)),
    }
}

/// Applies a unary operator.
pub fn unary(kind: UnaryKind, operand: &Value) -> Value {
    match kind {
        UnaryKind::Not => Value::Bool(!operand.is_truthy()),
        UnaryKind::Neg => Value::Number(-operand.to_number()),
        UnaryKind::Plus => Value::Number(operand.to_number()),
        UnaryKind::Typeof => Value::from(operand.type_of()),
    }
}

/// `+` concatenates when either side converts to a string primitive.
fn add(left: &Value, right: &Value) -> Value {
    let stringy = |v: &Value| matches!(v, Value::String(_) | Value::Function(_));
    if stringy(left) || stringy(right) {
        let mut out = String::from(&*left.to_js_string());
        out.push_str(&right.to_js_string());
        Value::String(out.into())
    } else {
        Value::Number(left.to_number() + right.to_number())
    }
}

/// Relational comparison. `None` when either side is `NaN`.
fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => left.to_number().partial_cmp(&right.to_number()),
    }
}
