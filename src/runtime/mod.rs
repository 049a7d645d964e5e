//! Runtime values and the evaluator for compiled graph expressions.
//!
//! # No-Cycle Invariant
//! Runtime values are immutable DAGs shared through `Rc`. The one sanctioned
//! cycle is a closure defined in the global environment and stored back into
//! it (how recursive function definitions resolve by name); the interpreter
//! owns the global frame and clears it on drop.
use crate::runtime::{error::EvalResult, value::Value};

pub mod builtins;
pub mod container;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod native_function;
pub mod value;

pub type BuiltinFn = fn(&[Value]) -> EvalResult<Value>;
