use crate::runtime::{error::EvalResult, value::Value};

use super::helpers::arg_number;

fn binary(args: &[Value], name: &str, op: fn(f64, f64) -> f64) -> EvalResult<Value> {
    let x = arg_number(args, 0, name, "first operand")?;
    let y = arg_number(args, 1, name, "second operand")?;
    Ok(Value::Number(op(x, y)))
}

/// Left fold over every operand, so `(+ 1 2 3)` works like Scheme's.
fn fold(args: &[Value], name: &str, op: fn(f64, f64) -> f64) -> EvalResult<Value> {
    let mut acc = arg_number(args, 0, name, "first operand")?;
    for index in 1..args.len() {
        acc = op(acc, arg_number(args, index, name, "operand")?);
    }
    Ok(Value::Number(acc))
}

pub(super) fn builtin_add(args: &[Value]) -> EvalResult<Value> {
    fold(args, "+", |x, y| x + y)
}

pub(super) fn builtin_sub(args: &[Value]) -> EvalResult<Value> {
    binary(args, "-", |x, y| x - y)
}

pub(super) fn builtin_mul(args: &[Value]) -> EvalResult<Value> {
    fold(args, "*", |x, y| x * y)
}

pub(super) fn builtin_div(args: &[Value]) -> EvalResult<Value> {
    binary(args, "/", |x, y| x / y)
}

pub(super) fn builtin_mod(args: &[Value]) -> EvalResult<Value> {
    binary(args, "%", |x, y| x % y)
}

pub(super) fn builtin_pow(args: &[Value]) -> EvalResult<Value> {
    binary(args, "pow", f64::powf)
}

fn compare(args: &[Value], name: &str, op: fn(f64, f64) -> bool) -> EvalResult<Value> {
    let x = arg_number(args, 0, name, "first operand")?;
    let y = arg_number(args, 1, name, "second operand")?;
    Ok(Value::from_bool(op(x, y)))
}

pub(super) fn builtin_lt(args: &[Value]) -> EvalResult<Value> {
    compare(args, "<", |x, y| x < y)
}

pub(super) fn builtin_le(args: &[Value]) -> EvalResult<Value> {
    compare(args, "<=", |x, y| x <= y)
}

pub(super) fn builtin_gt(args: &[Value]) -> EvalResult<Value> {
    compare(args, ">", |x, y| x > y)
}

pub(super) fn builtin_ge(args: &[Value]) -> EvalResult<Value> {
    compare(args, ">=", |x, y| x >= y)
}

/// Structural equality; functions and containers compare by identity.
pub(super) fn builtin_eq(args: &[Value]) -> EvalResult<Value> {
    Ok(Value::from_bool(args[0] == args[1]))
}
