use std::rc::Rc;

use crate::runtime::{
    error::{EvalError, EvalResult},
    native_function::NativeFunction,
    value::Value,
};

pub(super) fn type_error(name: &str, label: &str, expected: &'static str, got: &Value) -> EvalError {
    EvalError::type_mismatch(format!("{} {}", name, label), expected, got.type_name())
}

pub(super) fn arg_number(args: &[Value], index: usize, name: &str, label: &str) -> EvalResult<f64> {
    match &args[index] {
        Value::Number(n) => Ok(*n),
        other => Err(type_error(name, label, "Number", other)),
    }
}

pub(super) fn arg_string<'a>(
    args: &'a [Value],
    index: usize,
    name: &str,
    label: &str,
) -> EvalResult<&'a str> {
    match &args[index] {
        Value::String(s) => Ok(s),
        other => Err(type_error(name, label, "String", other)),
    }
}

pub(super) fn arg_list<'a>(
    args: &'a [Value],
    index: usize,
    name: &str,
    label: &str,
) -> EvalResult<&'a Rc<Vec<Value>>> {
    match &args[index] {
        Value::List(items) => Ok(items),
        other => Err(type_error(name, label, "List", other)),
    }
}

pub(super) fn arg_function<'a>(
    args: &'a [Value],
    index: usize,
    name: &str,
    label: &str,
) -> EvalResult<&'a NativeFunction> {
    match &args[index] {
        Value::Function(f) => Ok(f),
        other => Err(type_error(name, label, "Function", other)),
    }
}

/// Reads a non-negative count; fractional parts are truncated.
pub(super) fn arg_count(args: &[Value], index: usize, name: &str, label: &str) -> EvalResult<usize> {
    let n = arg_number(args, index, name, label)?;
    if n < 0.0 || !n.is_finite() {
        return Err(EvalError::Native(format!(
            "{} expected {} to be a non-negative count, got {}",
            name, label, n
        )));
    }
    Ok(n as usize)
}
