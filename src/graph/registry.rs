use std::collections::BTreeMap;

use crate::graph::{
    error::{GraphError, GraphResult},
    node::GraphNode,
    workspace::Workspace,
};

/// User-defined functions by symbol.
///
/// Shared by the build and the dirty traversal through an explicit reference;
/// there is no global instance.
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    functions: BTreeMap<String, Workspace>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or replaces a definition.
    pub fn define(&mut self, symbol: impl Into<String>, workspace: Workspace) -> Option<Workspace> {
        self.functions.insert(symbol.into(), workspace)
    }

    pub fn remove(&mut self, symbol: &str) -> Option<Workspace> {
        self.functions.remove(symbol)
    }

    pub fn lookup(&self, symbol: &str) -> Option<&Workspace> {
        self.functions.get(symbol)
    }

    pub fn lookup_mut(&mut self, symbol: &str) -> Option<&mut Workspace> {
        self.functions.get_mut(symbol)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.functions.contains_key(symbol)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Workspace)> {
        self.functions.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Parameter and result names of a definition.
    pub fn signature(&self, symbol: &str) -> GraphResult<(Vec<String>, Vec<String>)> {
        let ws = self
            .lookup(symbol)
            .ok_or_else(|| GraphError::FunctionNotFound(symbol.to_string()))?;
        let params = ws.variables().map(|n| n.label()).collect();
        let results = ws.outputs().map(|n| n.label()).collect();
        Ok((params, results))
    }

    /// A reference node whose ports mirror the definition's signature.
    pub fn reference(&self, symbol: &str) -> GraphResult<GraphNode> {
        let (params, results) = self.signature(symbol)?;
        Ok(GraphNode::function(symbol, &params, &results))
    }
}
