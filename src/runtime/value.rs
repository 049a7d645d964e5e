use std::{fmt, rc::Rc};

use crate::runtime::{
    container::Container,
    error::{EvalError, EvalResult},
    native_function::NativeFunction,
};

/// Runtime value produced by evaluating a compiled graph.
///
/// ## Memory Management Model
///
/// Heap payloads (`String`, `Symbol`, `List`) sit behind `Rc` so cloning a
/// value is O(1) and list construction never copies elements. Values are
/// immutable once built.
///
/// ### Functions
///
/// A `Function` is only ever produced by evaluating a lambda or by wrapping a
/// native callable. It is opaque data for everything except application, so
/// [`Value::ensure_plain_data`] rejects it at boundaries that persist or
/// export values.
///
/// ### Booleans
///
/// There is no boolean variant. Logic nodes and comparisons produce
/// `Number(1.0)` and `Number(0.0)`, and conditionals treat `0` as false.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// 64-bit floating point number.
    Number(f64),
    /// UTF-8 string value.
    String(Rc<str>),
    /// Symbolic name.
    Symbol(Rc<str>),
    /// Opaque host object handle.
    Container(Container),
    /// Callable value.
    Function(NativeFunction),
    /// Ordered collection of values.
    List(Rc<Vec<Value>>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "\"{}\"", v),
            Value::Symbol(v) => write!(f, "{}", v),
            Value::Container(c) => write!(f, "<container {}>", c.type_name()),
            Value::Function(func) => write!(f, "<function {}>", func.name()),
            Value::List(elements) => {
                let items: Vec<String> = elements.iter().map(|e| e.to_string()).collect();
                write!(f, "({})", items.join(" "))
            }
        }
    }
}

impl Value {
    /// Returns the canonical runtime type label used in diagnostics.
    ///
    /// These labels are user-visible and are expected to remain stable.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "Number",
            Value::String(_) => "String",
            Value::Symbol(_) => "Symbol",
            Value::Container(_) => "Container",
            Value::Function(_) => "Function",
            Value::List(_) => "List",
        }
    }

    pub fn from_bool(value: bool) -> Value {
        Value::Number(if value { 1.0 } else { 0.0 })
    }

    pub fn list(items: Vec<Value>) -> Value {
        Value::List(Rc::new(items))
    }

    pub fn empty_list() -> Value {
        Value::List(Rc::new(Vec::new()))
    }

    pub fn as_number(&self, context: &str) -> EvalResult<f64> {
        match self {
            Value::Number(n) => Ok(*n),
            other => Err(EvalError::type_mismatch(context, "Number", other.type_name())),
        }
    }

    pub fn as_str(&self, context: &str) -> EvalResult<&str> {
        match self {
            Value::String(s) => Ok(s),
            other => Err(EvalError::type_mismatch(context, "String", other.type_name())),
        }
    }

    pub fn as_list(&self, context: &str) -> EvalResult<&Rc<Vec<Value>>> {
        match self {
            Value::List(items) => Ok(items),
            other => Err(EvalError::type_mismatch(context, "List", other.type_name())),
        }
    }

    pub fn as_function(&self, context: &str) -> EvalResult<&NativeFunction> {
        match self {
            Value::Function(func) => Ok(func),
            other => Err(EvalError::type_mismatch(context, "Function", other.type_name())),
        }
    }

    /// Conditional truthiness: only numbers can be tested, and `0` is false.
    pub fn is_truthy(&self, context: &str) -> EvalResult<bool> {
        Ok(self.as_number(context)? != 0.0)
    }

    /// Fails if the value (or anything nested in it) is a `Function`.
    pub fn ensure_plain_data(&self) -> EvalResult<()> {
        match self {
            Value::Function(_) => Err(EvalError::NotPlainData("Function")),
            Value::List(items) => items.iter().try_for_each(Value::ensure_plain_data),
            _ => Ok(()),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.into())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::list(items)
    }
}
