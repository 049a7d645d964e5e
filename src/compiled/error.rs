use thiserror::Error;
use ulid::Ulid;

pub type CompileResult<T> = std::result::Result<T, CompileError>;

/// Build-time failures. Each one aborts the build of the requested root only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("{node}: required input `{port}` is not connected")]
    MissingConnection { node: String, port: String },

    #[error("a sequence needs at least one expression")]
    EmptySequence,

    #[error("node {0} depends on its own output")]
    CycleDetected(Ulid),

    #[error("`{name}` is not a parameter of this call")]
    UnknownParameter { name: String },

    #[error("node {0} does not exist")]
    NodeNotFound(Ulid),

    #[error("node {node} has no output port {port}")]
    PortOutOfRange { node: Ulid, port: usize },

    #[error("{node}: default of `{port}` is not plain data")]
    NotPlainData { node: String, port: String },

    #[error("function `{0}` is not defined")]
    FunctionNotFound(String),

    #[error("{node}: expected {expected} inputs, found {found}")]
    InputCount {
        node: String,
        expected: usize,
        found: usize,
    },

    #[error("{node}: graph nests deeper than {limit} nodes")]
    TooDeep { node: String, limit: usize },
}
