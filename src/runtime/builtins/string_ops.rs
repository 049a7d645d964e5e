use crate::runtime::{
    error::{EvalError, EvalResult},
    value::Value,
};

use super::helpers::{arg_number, arg_string};

pub(super) fn builtin_concat_strings(args: &[Value]) -> EvalResult<Value> {
    let mut out = String::new();
    for i in 0..args.len() {
        out.push_str(arg_string(args, i, "concat-strings", "argument")?);
    }
    Ok(Value::String(out.into()))
}

pub(super) fn builtin_string_to_num(args: &[Value]) -> EvalResult<Value> {
    let text = arg_string(args, 0, "string->num", "string")?;
    text.trim()
        .parse::<f64>()
        .map(Value::Number)
        .map_err(|_| EvalError::Native(format!("string->num could not parse {:?}", text)))
}

pub(super) fn builtin_num_to_string(args: &[Value]) -> EvalResult<Value> {
    let n = arg_number(args, 0, "num->string", "number")?;
    Ok(Value::String(n.to_string().into()))
}
