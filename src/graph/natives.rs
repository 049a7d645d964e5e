//! Nodes backed by host functions rather than a symbol in the environment.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    graph::port::{PortData, PortType},
    runtime::{
        error::{EvalError, EvalResult},
        native_function::{Arity, NativeFunction},
        value::Value,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NativeOp {
    Round,
    Floor,
    Ceiling,
    Sine,
    Cosine,
    Tangent,
    /// Uniform number in `[0, 1)`; a new one on every evaluation.
    Random,
    SplitString,
    JoinStrings,
    StringCase,
    Substring,
    /// Splits a list into its first element and the rest.
    DeCons,
}

impl NativeOp {
    pub fn label(self) -> &'static str {
        match self {
            NativeOp::Round => "Round",
            NativeOp::Floor => "Floor",
            NativeOp::Ceiling => "Ceiling",
            NativeOp::Sine => "Sine",
            NativeOp::Cosine => "Cosine",
            NativeOp::Tangent => "Tangent",
            NativeOp::Random => "Random",
            NativeOp::SplitString => "Split String",
            NativeOp::JoinStrings => "Join Strings",
            NativeOp::StringCase => "String Case",
            NativeOp::Substring => "Substring",
            NativeOp::DeCons => "De-Cons",
        }
    }

    pub fn inputs(self) -> Vec<PortData> {
        let number = |name: &str, desc: &str| PortData::new(name, desc, PortType::Number);
        let string = |name: &str, desc: &str| PortData::new(name, desc, PortType::String);
        match self {
            NativeOp::Round | NativeOp::Floor | NativeOp::Ceiling => vec![number("n", "Number")],
            NativeOp::Sine | NativeOp::Cosine | NativeOp::Tangent => {
                vec![PortData::new("θ", "Angle in radians, or a list of them", PortType::Any)]
            }
            NativeOp::Random => Vec::new(),
            NativeOp::SplitString => vec![
                string("str", "String to split"),
                string("sep", "Separator"),
            ],
            NativeOp::JoinStrings => vec![
                PortData::new("strs", "List of strings", PortType::List),
                string("sep", "Separator"),
            ],
            NativeOp::StringCase => vec![
                string("str", "String to convert"),
                PortData::new("upper?", "1 for upper case, 0 for lower", PortType::Bool),
            ],
            NativeOp::Substring => vec![
                string("str", "Source string"),
                number("start", "Index of the first character"),
                number("length", "Number of characters"),
            ],
            NativeOp::DeCons => vec![PortData::new("seq", "List to split", PortType::List)],
        }
    }

    pub fn outputs(self) -> Vec<PortData> {
        match self {
            NativeOp::SplitString => vec![PortData::new("strs", "List of substrings", PortType::List)],
            NativeOp::JoinStrings | NativeOp::StringCase | NativeOp::Substring => {
                vec![PortData::new("str", "Result", PortType::String)]
            }
            NativeOp::DeCons => vec![
                PortData::new("first", "First element", PortType::Any),
                PortData::new("rest", "Remaining elements", PortType::List),
            ],
            _ => vec![PortData::new("n", "Result", PortType::Number)],
        }
    }

    /// Whether every evaluation may produce a different result.
    pub fn is_volatile(self) -> bool {
        matches!(self, NativeOp::Random)
    }

    /// The callable for this node. Multi-output ops return one list element
    /// per output port.
    pub fn function(self) -> NativeFunction {
        let name = self.label();
        let arity = Arity::Exact(self.inputs().len());
        match self {
            NativeOp::Round => NativeFunction::new(name, arity, |args| unary(args, "Round", f64::round)),
            NativeOp::Floor => NativeFunction::new(name, arity, |args| unary(args, "Floor", f64::floor)),
            NativeOp::Ceiling => NativeFunction::new(name, arity, |args| unary(args, "Ceiling", f64::ceil)),
            NativeOp::Sine => NativeFunction::new(name, arity, |args| trig(&args[0], "Sine", f64::sin)),
            NativeOp::Cosine => NativeFunction::new(name, arity, |args| trig(&args[0], "Cosine", f64::cos)),
            NativeOp::Tangent => NativeFunction::new(name, arity, |args| trig(&args[0], "Tangent", f64::tan)),
            NativeOp::Random => {
                NativeFunction::new(name, arity, |_| Ok(Value::Number(rand::rng().random::<f64>())))
            }
            NativeOp::SplitString => NativeFunction::new(name, arity, split_string),
            NativeOp::JoinStrings => NativeFunction::new(name, arity, join_strings),
            NativeOp::StringCase => NativeFunction::new(name, arity, string_case),
            NativeOp::Substring => NativeFunction::new(name, arity, substring),
            NativeOp::DeCons => NativeFunction::new(name, arity, decons),
        }
    }
}

fn unary(args: &[Value], name: &str, op: fn(f64) -> f64) -> EvalResult<Value> {
    Ok(Value::Number(op(args[0].as_number(name)?)))
}

/// Applies `op` to a number, or to every number of a list.
fn trig(arg: &Value, name: &str, op: fn(f64) -> f64) -> EvalResult<Value> {
    match arg {
        Value::Number(n) => Ok(Value::Number(op(*n))),
        Value::List(items) => items
            .iter()
            .map(|item| trig(item, name, op))
            .collect::<EvalResult<Vec<_>>>()
            .map(Value::list),
        other => Err(EvalError::type_mismatch(name, "Number or List", other.type_name())),
    }
}

fn split_string(args: &[Value]) -> EvalResult<Value> {
    let text = args[0].as_str("Split String input")?;
    let sep = args[1].as_str("Split String separator")?;
    let parts: Vec<Value> = if sep.is_empty() {
        text.chars().map(|c| Value::from(c.to_string().as_str())).collect()
    } else {
        text.split(sep).map(Value::from).collect()
    };
    Ok(Value::list(parts))
}

fn join_strings(args: &[Value]) -> EvalResult<Value> {
    let items = args[0].as_list("Join Strings input")?;
    let sep = args[1].as_str("Join Strings separator")?;
    let parts = items
        .iter()
        .map(|item| item.as_str("Join Strings element").map(str::to_owned))
        .collect::<EvalResult<Vec<_>>>()?;
    Ok(Value::String(parts.join(sep).into()))
}

fn string_case(args: &[Value]) -> EvalResult<Value> {
    let text = args[0].as_str("String Case input")?;
    let upper = args[1].is_truthy("String Case upper?")?;
    let converted = if upper { text.to_uppercase() } else { text.to_lowercase() };
    Ok(Value::String(converted.into()))
}

fn substring(args: &[Value]) -> EvalResult<Value> {
    let text = args[0].as_str("Substring input")?;
    let start = args[1].as_number("Substring start")?;
    let length = args[2].as_number("Substring length")?;
    let len = text.chars().count();
    let in_range = [start, length].iter().all(|n| n.is_finite() && *n >= 0.0);
    let end = in_range
        .then(|| (start as usize).checked_add(length as usize))
        .flatten()
        .filter(|end| *end <= len);
    let Some(end) = end else {
        return Err(EvalError::IndexOutOfRange {
            name: "Substring".to_string(),
            index: (start + length) as i64,
            len,
        });
    };
    let out: String = text.chars().take(end).skip(start as usize).collect();
    Ok(Value::String(out.into()))
}

fn decons(args: &[Value]) -> EvalResult<Value> {
    let items = args[0].as_list("De-Cons input")?;
    let first = items
        .first()
        .cloned()
        .ok_or_else(|| EvalError::EmptyList("De-Cons".to_string()))?;
    Ok(Value::list(vec![first, Value::list(items[1..].to_vec())]))
}
