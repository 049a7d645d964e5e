use std::rc::Rc;

use super::{ExprRef, Expression};
use crate::runtime::value::Value;

impl Expression {
    /// Lifts a runtime value into an expression that evaluates back to it.
    pub fn from_value(value: &Value) -> ExprRef {
        Rc::new(match value {
            Value::Number(n) => Expression::Number(*n),
            Value::String(s) => Expression::String(Rc::clone(s)),
            Value::Container(c) => Expression::Container(c.clone()),
            Value::Function(f) => Expression::Function(f.clone()),
            Value::Symbol(_) | Value::List(_) => Expression::Quote(value.clone()),
        })
    }
}
