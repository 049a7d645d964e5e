use crate::runtime::{error::EvalResult, value::Value};

use super::helpers::type_error;

fn truth(args: &[Value], index: usize, name: &str) -> EvalResult<bool> {
    match &args[index] {
        Value::Number(n) => Ok(*n != 0.0),
        other => Err(type_error(name, "operand", "Number", other)),
    }
}

pub(super) fn builtin_and(args: &[Value]) -> EvalResult<Value> {
    Ok(Value::from_bool(truth(args, 0, "and")? && truth(args, 1, "and")?))
}

pub(super) fn builtin_or(args: &[Value]) -> EvalResult<Value> {
    Ok(Value::from_bool(truth(args, 0, "or")? || truth(args, 1, "or")?))
}

pub(super) fn builtin_xor(args: &[Value]) -> EvalResult<Value> {
    Ok(Value::from_bool(truth(args, 0, "xor")? != truth(args, 1, "xor")?))
}

pub(super) fn builtin_not(args: &[Value]) -> EvalResult<Value> {
    Ok(Value::from_bool(!truth(args, 0, "not")?))
}

pub(super) fn builtin_identity(args: &[Value]) -> EvalResult<Value> {
    Ok(args[0].clone())
}
