use thiserror::Error;

use crate::graph::node::NodeId;

pub type GraphResult<T> = std::result::Result<T, GraphError>;

/// Failures of editing operations on a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("node {0} does not exist")]
    NodeNotFound(NodeId),

    #[error("node {node} has no input port {port}")]
    InputNotFound { node: NodeId, port: usize },

    #[error("node {node} has no output port {port}")]
    OutputNotFound { node: NodeId, port: usize },

    #[error("node {node} cannot drop below {min} input ports")]
    CannotRemovePort { node: NodeId, min: usize },

    #[error("node {0} does not take a variable number of inputs")]
    NotVariadic(NodeId),

    #[error("node {0} does not hold an editable literal")]
    NotALiteral(NodeId),

    #[error("no builtin named `{0}`")]
    UnknownBuiltin(String),

    #[error("function `{0}` is not defined")]
    FunctionNotFound(String),
}
