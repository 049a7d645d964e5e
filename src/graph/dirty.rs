//! Incremental recalculation through function indirection.
//!
//! A reference to a user function is stale when the function's body is: any
//! node inside the referenced workspace being stale dirties every call site.
//! Definitions may call each other, so each traversal threads a set of the
//! symbols it has already entered and treats a repeat visit as clean. The set
//! lives for one top-level call only.

use std::collections::HashSet;

use tracing::{trace, warn};

use crate::graph::{
    node::{GraphNode, NodeId},
    registry::FunctionRegistry,
    workspace::Workspace,
};

/// Whether `node` needs to be recomputed.
pub fn requires_recalc(node: &GraphNode, registry: &FunctionRegistry) -> bool {
    let mut entered = HashSet::new();
    node_requires_recalc(node, registry, &mut entered)
}

/// Whether any node of `workspace` needs to be recomputed.
pub fn workspace_requires_recalc(workspace: &Workspace, registry: &FunctionRegistry) -> bool {
    let mut entered = HashSet::new();
    workspace
        .nodes()
        .any(|node| node_requires_recalc(node, registry, &mut entered))
}

fn node_requires_recalc(
    node: &GraphNode,
    registry: &FunctionRegistry,
    entered: &mut HashSet<String>,
) -> bool {
    if node.is_stale() {
        return true;
    }
    let Some(symbol) = node.kind().function_symbol() else {
        return false;
    };
    if !entered.insert(symbol.to_string()) {
        trace!(symbol, "recursion guard: already entered");
        return false;
    }
    match registry.lookup(symbol) {
        Some(body) => body
            .nodes()
            .any(|inner| node_requires_recalc(inner, registry, entered)),
        None => {
            warn!(symbol, node = %node.id(), "function is not defined; treating call as dirty");
            true
        }
    }
}

/// Marks `node` clean, and with it the body of any function it references.
pub fn mark_clean(node: &mut GraphNode, registry: &mut FunctionRegistry) {
    node.mark_clean();
    if let Some(symbol) = node.kind().function_symbol().map(str::to_string) {
        let mut entered = HashSet::new();
        mark_function_clean(&symbol, registry, &mut entered);
    }
}

fn mark_function_clean(symbol: &str, registry: &mut FunctionRegistry, entered: &mut HashSet<String>) {
    if !entered.insert(symbol.to_string()) {
        trace!(symbol, "recursion guard: already cleaned");
        return;
    }
    let Some(body) = registry.lookup_mut(symbol) else {
        warn!(symbol, "function is not defined; nothing to mark clean");
        return;
    };
    for inner in body.nodes_mut() {
        inner.mark_clean();
    }
    for nested in body.referenced_functions() {
        mark_function_clean(&nested, registry, entered);
    }
}

/// Tears down `node` and, for a function reference, every node of the
/// referenced body. Each node is reported exactly once even when definitions
/// reference each other; torn-down body nodes are left dirty so the definition
/// is rebuilt before its next use.
pub fn destroy(node: &GraphNode, registry: &mut FunctionRegistry) -> Vec<NodeId> {
    let mut destroyed = vec![node.id()];
    if let Some(symbol) = node.kind().function_symbol() {
        let mut entered = HashSet::new();
        destroy_function(symbol, registry, &mut entered, &mut destroyed);
    }
    destroyed
}

fn destroy_function(
    symbol: &str,
    registry: &mut FunctionRegistry,
    entered: &mut HashSet<String>,
    destroyed: &mut Vec<NodeId>,
) {
    if !entered.insert(symbol.to_string()) {
        trace!(symbol, "recursion guard: already destroyed");
        return;
    }
    let Some(body) = registry.lookup_mut(symbol) else {
        warn!(symbol, "function is not defined; nothing to destroy");
        return;
    };
    for inner in body.nodes_mut() {
        inner.mark_dirty();
        destroyed.push(inner.id());
    }
    for nested in body.referenced_functions() {
        destroy_function(&nested, registry, entered, destroyed);
    }
}
