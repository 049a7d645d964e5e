use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{engine::error::EngineError, runtime::interpreter::DEFAULT_MAX_CALL_DEPTH};

/// Engine settings, loadable from JSON. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Breakpoint nodes pause the run only when this is set.
    pub debug_breakpoints: bool,
    /// Nested call limit of the evaluator.
    pub max_call_depth: usize,
    /// Log every compiled root as an s-expression at debug level.
    pub trace_expressions: bool,
    /// Serve unchanged roots from the result cache.
    pub reuse_cached_results: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debug_breakpoints: false,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            trace_expressions: false,
            reuse_cached_results: true,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(text: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| EngineError::Io {
            path: path.as_ref().display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_json_str(&text)
    }
}
