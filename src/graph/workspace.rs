use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::graph::{
    error::{GraphError, GraphResult},
    kind::NodeKind,
    node::{Connection, GraphNode, NodeId},
};

/// An editable graph: the home canvas or the body of a user function.
///
/// Nodes keep insertion order, which is also the parameter and result order of
/// a function workspace.
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    name: String,
    nodes: Vec<GraphNode>,
    index: HashMap<NodeId, usize>,
}

impl Workspace {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_node(&mut self, node: GraphNode) -> NodeId {
        let id = node.id();
        self.index.insert(id, self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
        self.index.get(&id).map(|&i| &self.nodes[i])
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut GraphNode> {
        self.index.get(&id).map(|&i| &mut self.nodes[i])
    }

    fn require(&self, id: NodeId) -> GraphResult<&GraphNode> {
        self.node(id).ok_or(GraphError::NodeNotFound(id))
    }

    fn require_mut(&mut self, id: NodeId) -> GraphResult<&mut GraphNode> {
        self.node_mut(id).ok_or(GraphError::NodeNotFound(id))
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.iter()
    }

    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut GraphNode> {
        self.nodes.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Wires `from.from_port` into `to.to_port`, replacing any existing wire
    /// on that input. The consumer becomes dirty.
    pub fn connect(&mut self, from: NodeId, from_port: usize, to: NodeId, to_port: usize) -> GraphResult<()> {
        let producer = self.require(from)?;
        if from_port >= producer.outputs().len() {
            return Err(GraphError::OutputNotFound {
                node: from,
                port: from_port,
            });
        }
        let consumer = self.require_mut(to)?;
        if to_port >= consumer.inputs().len() {
            return Err(GraphError::InputNotFound { node: to, port: to_port });
        }
        consumer.set_connection(
            to_port,
            Some(Connection {
                node: from,
                port: from_port,
            }),
        );
        debug!(%from, from_port, %to, to_port, "connected");
        Ok(())
    }

    pub fn disconnect(&mut self, to: NodeId, to_port: usize) -> GraphResult<Option<Connection>> {
        let consumer = self.require_mut(to)?;
        if to_port >= consumer.inputs().len() {
            return Err(GraphError::InputNotFound { node: to, port: to_port });
        }
        Ok(consumer.set_connection(to_port, None))
    }

    pub fn mark_dirty(&mut self, id: NodeId) -> GraphResult<()> {
        self.require_mut(id)?.mark_dirty();
        Ok(())
    }

    pub fn add_input(&mut self, id: NodeId) -> GraphResult<()> {
        self.require_mut(id)?.push_input()
    }

    pub fn remove_input(&mut self, id: NodeId) -> GraphResult<()> {
        self.require_mut(id)?.pop_input().map(|_| ())
    }

    /// Removes a node and every wire that reads from it. Consumers become dirty.
    pub fn remove_node(&mut self, id: NodeId) -> GraphResult<GraphNode> {
        let position = *self.index.get(&id).ok_or(GraphError::NodeNotFound(id))?;
        for (consumer, port) in self.consumers(id) {
            if let Some(node) = self.node_mut(consumer) {
                node.set_connection(port, None);
            }
        }
        let node = self.nodes.remove(position);
        self.reindex();
        Ok(node)
    }

    fn reindex(&mut self) {
        self.index = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.id(), i))
            .collect();
    }

    /// Every `(consumer, input port)` wired to an output of `id`.
    pub fn consumers(&self, id: NodeId) -> Vec<(NodeId, usize)> {
        self.nodes
            .iter()
            .flat_map(|node| {
                node.connections()
                    .filter(move |(_, conn)| conn.node == id)
                    .map(move |(port, _)| (node.id(), port))
            })
            .collect()
    }

    /// `id` and everything it reads from, transitively; producers come first.
    pub fn upstream(&self, id: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut seen = HashSet::new();
        // (node, inputs already expanded)
        let mut stack = vec![(id, false)];
        while let Some((current, expanded)) = stack.pop() {
            if expanded {
                order.push(current);
                continue;
            }
            if !seen.insert(current) {
                continue;
            }
            stack.push((current, true));
            if let Some(node) = self.node(current) {
                let producers: Vec<NodeId> = node.connections().map(|(_, conn)| conn.node).collect();
                stack.extend(
                    producers
                        .into_iter()
                        .rev()
                        .filter(|p| !seen.contains(p))
                        .map(|p| (p, false)),
                );
            }
        }
        order
    }

    /// Every node reading from any of `ids`, transitively, `ids` included.
    pub fn downstream(&self, ids: &HashSet<NodeId>) -> HashSet<NodeId> {
        let mut reached = ids.clone();
        let mut stack: Vec<NodeId> = ids.iter().copied().collect();
        while let Some(id) = stack.pop() {
            for (consumer, _) in self.consumers(id) {
                if reached.insert(consumer) {
                    stack.push(consumer);
                }
            }
        }
        reached
    }

    /// Parameter nodes of a function workspace, in insertion order.
    pub fn variables(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes
            .iter()
            .filter(|n| matches!(n.kind(), NodeKind::Variable { .. }))
    }

    /// Result nodes of a function workspace, in insertion order.
    pub fn outputs(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes
            .iter()
            .filter(|n| matches!(n.kind(), NodeKind::Output { .. }))
    }

    /// Symbols of the user functions referenced from this workspace.
    pub fn referenced_functions(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.nodes
            .iter()
            .filter_map(|n| n.kind().function_symbol())
            .filter(|s| seen.insert(s.to_string()))
            .map(str::to_string)
            .collect()
    }
}
