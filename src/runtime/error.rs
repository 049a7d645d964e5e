use thiserror::Error;
use ulid::Ulid;

/// Result alias used by the evaluator and builtins.
pub type EvalResult<T> = std::result::Result<T, EvalError>;

/// Failures raised while evaluating a compiled expression.
///
/// Every variant aborts the current evaluation request only. `Paused` is not a
/// failure: it unwinds the evaluation when a breakpoint node is hit in debug
/// mode and is turned into a paused run by the engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("{context} expected {expected}, got {got}")]
    TypeMismatch {
        context: String,
        expected: &'static str,
        got: &'static str,
    },

    #[error("wrong number of arguments to `{name}`: expected {expected}, got {got}")]
    Arity {
        name: String,
        expected: String,
        got: usize,
    },

    #[error("unbound symbol `{0}`")]
    UnboundSymbol(String),

    #[error("attempted to call a non-function value of type {0}")]
    NotAFunction(&'static str),

    #[error("{name}: index {index} out of range for list of length {len}")]
    IndexOutOfRange {
        name: String,
        index: i64,
        len: usize,
    },

    #[error("{0}: list is empty")]
    EmptyList(String),

    #[error("maximum call depth of {0} exceeded")]
    RecursionLimit(usize),

    #[error("value of type {0} cannot cross a plain-data boundary")]
    NotPlainData(&'static str),

    #[error("execution paused at breakpoint {0}")]
    Paused(Ulid),

    #[error("{0}")]
    Native(String),
}

impl EvalError {
    pub fn type_mismatch(context: impl Into<String>, expected: &'static str, got: &'static str) -> Self {
        EvalError::TypeMismatch {
            context: context.into(),
            expected,
            got,
        }
    }
}
