use thiserror::Error;

use crate::{
    compiled::CompileError, engine::idle::IdleError, graph::GraphError, persist::PersistError,
    runtime::error::EvalError,
};

/// Any failure surfaced by the engine API.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("build failed: {0}")]
    Compile(#[from] CompileError),

    #[error("evaluation failed: {0}")]
    Eval(#[from] EvalError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read {path}: {reason}")]
    Io { path: String, reason: String },

    #[error(transparent)]
    Idle(#[from] IdleError),

    #[error("no run is paused at breakpoint {0}")]
    NotPaused(crate::graph::NodeId),
}
