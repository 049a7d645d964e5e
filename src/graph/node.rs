use std::f64::consts::PI;

use ulid::Ulid;

use crate::{
    graph::{
        error::{GraphError, GraphResult},
        kind::{NodeKind, builtin_spec},
        natives::NativeOp,
        port::{PortData, PortType},
        variadic::{Variadic, VariadicRule},
    },
    runtime::value::Value,
};

pub type NodeId = Ulid;

/// The producer end of a wire: `port` indexes the producer's outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Connection {
    pub node: NodeId,
    pub port: usize,
}

/// One node of a graph: ports, incoming wiring, dirty state and kind.
///
/// Edits go through [`Workspace`](crate::graph::workspace::Workspace) so that
/// consumers are dirtied consistently; the node only tracks its own state.
#[derive(Debug, Clone)]
pub struct GraphNode {
    id: NodeId,
    kind: NodeKind,
    inputs: Vec<PortData>,
    outputs: Vec<PortData>,
    connections: Vec<Option<Connection>>,
    requires_recalc: bool,
    variadic: Option<Variadic>,
}

impl GraphNode {
    fn with_ports(kind: NodeKind, inputs: Vec<PortData>, outputs: Vec<PortData>) -> Self {
        let connections = vec![None; inputs.len()];
        Self {
            id: Ulid::new(),
            kind,
            inputs,
            outputs,
            connections,
            requires_recalc: true,
            variadic: None,
        }
    }

    fn variadic_with(mut self, rule: VariadicRule) -> Self {
        self.variadic = Some(Variadic::new(rule));
        rule.rename(&mut self.inputs);
        self
    }

    /// Rebuilds a node from persisted parts. Wiring is restored separately.
    pub(crate) fn restore(
        id: NodeId,
        kind: NodeKind,
        inputs: Vec<PortData>,
        outputs: Vec<PortData>,
        variadic: Option<VariadicRule>,
    ) -> Self {
        let mut node = Self::with_ports(kind, inputs, outputs);
        node.id = id;
        if let Some(rule) = variadic {
            node = node.variadic_with(rule);
        }
        node
    }

    pub fn number(value: f64) -> Self {
        Self::with_ports(
            NodeKind::Number(value),
            Vec::new(),
            vec![PortData::new("n", "Number", PortType::Number)],
        )
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::with_ports(
            NodeKind::Text(value.into()),
            Vec::new(),
            vec![PortData::new("str", "String", PortType::String)],
        )
    }

    pub fn boolean(value: bool) -> Self {
        Self::with_ports(
            NodeKind::Bool(value),
            Vec::new(),
            vec![PortData::new("b", "Boolean", PortType::Bool)],
        )
    }

    pub fn pi() -> Self {
        Self::with_ports(
            NodeKind::Pi,
            Vec::new(),
            vec![PortData::new("3.14159...", "Pi", PortType::Number)],
        )
    }

    pub fn empty() -> Self {
        Self::with_ports(
            NodeKind::Empty,
            Vec::new(),
            vec![PortData::new("empty", "An empty list", PortType::List)],
        )
    }

    pub fn variable(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::with_ports(
            NodeKind::Variable { name: name.clone() },
            Vec::new(),
            vec![PortData::any(name)],
        )
    }

    pub fn output(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::with_ports(
            NodeKind::Output { name: name.clone() },
            vec![PortData::any(name)],
            Vec::new(),
        )
    }

    pub fn builtin(symbol: &str) -> GraphResult<Self> {
        let spec = builtin_spec(symbol).ok_or_else(|| GraphError::UnknownBuiltin(symbol.to_string()))?;
        let node = Self::with_ports(
            NodeKind::Builtin {
                symbol: symbol.to_string(),
            },
            spec.input_ports(),
            vec![spec.output_port()],
        );
        Ok(match symbol {
            "list" => node.variadic_with(VariadicRule::List),
            "cartesian-product" => node.variadic_with(VariadicRule::Combine),
            "concat-strings" => node.variadic_with(VariadicRule::Concat),
            _ => node,
        })
    }

    /// List constructor with one `item(s)` input.
    pub fn list() -> Self {
        Self::with_ports(
            NodeKind::Builtin {
                symbol: "list".to_string(),
            },
            vec![PortData::any("item(s)")],
            vec![PortData::new("seq", "List", PortType::List)],
        )
        .variadic_with(VariadicRule::List)
    }

    /// Element-wise `map` over two or more lists.
    pub fn combine() -> Self {
        Self::combinator("map", "Combined lists")
    }

    /// `comb` applied to every combination of elements of two or more lists.
    pub fn cartesian_product() -> Self {
        Self::combinator("cartesian-product", "Every combination")
    }

    fn combinator(symbol: &str, result: &str) -> Self {
        Self::with_ports(
            NodeKind::Builtin {
                symbol: symbol.to_string(),
            },
            vec![
                PortData::new("comb", "Combinator", PortType::Function),
                PortData::any("list1"),
                PortData::any("list2"),
            ],
            vec![PortData::new("combined", result, PortType::List)],
        )
        .variadic_with(VariadicRule::Combine)
    }

    pub fn concat_strings() -> Self {
        Self::with_ports(
            NodeKind::Builtin {
                symbol: "concat-strings".to_string(),
            },
            vec![PortData::any("s1"), PortData::any("s2")],
            vec![PortData::new("str", "Concatenated string", PortType::String)],
        )
        .variadic_with(VariadicRule::Concat)
    }

    pub fn native(op: NativeOp) -> Self {
        Self::with_ports(NodeKind::Native(op), op.inputs(), op.outputs())
    }

    pub fn conditional() -> Self {
        Self::with_ports(
            NodeKind::If,
            vec![
                PortData::new("test", "Test block", PortType::Bool),
                PortData::new("true", "True block", PortType::Any),
                PortData::new("false", "False block", PortType::Any),
            ],
            vec![PortData::new("result", "Result", PortType::Any)],
        )
    }

    pub fn begin() -> Self {
        Self::with_ports(
            NodeKind::Begin,
            vec![PortData::any("expr1"), PortData::any("expr2")],
            vec![PortData::new("last", "Result of the final expression", PortType::Any)],
        )
        .variadic_with(VariadicRule::Sequence)
    }

    pub fn apply() -> Self {
        Self::with_ports(
            NodeKind::Apply,
            vec![PortData::new("func", "Procedure", PortType::Function)],
            vec![PortData::new("result", "Result", PortType::Any)],
        )
        .variadic_with(VariadicRule::Apply)
    }

    pub fn and() -> Self {
        Self::logic(NodeKind::And)
    }

    pub fn or() -> Self {
        Self::logic(NodeKind::Or)
    }

    fn logic(kind: NodeKind) -> Self {
        Self::with_ports(
            kind,
            vec![
                PortData::new("a", "operand", PortType::Bool),
                PortData::new("b", "operand", PortType::Bool),
            ],
            vec![PortData::new("result", "Result", PortType::Bool)],
        )
    }

    /// Reference to a user function; ports mirror its parameters and results.
    pub fn function(symbol: impl Into<String>, params: &[String], results: &[String]) -> Self {
        Self::with_ports(
            NodeKind::Function {
                symbol: symbol.into(),
            },
            params.iter().map(PortData::any).collect(),
            results.iter().map(PortData::any).collect(),
        )
    }

    pub fn breakpoint() -> Self {
        Self::with_ports(
            NodeKind::Breakpoint,
            vec![PortData::new("", "Object to inspect", PortType::Any)],
            vec![PortData::new("", "Object inspected", PortType::Any)],
        )
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn label(&self) -> String {
        self.kind.label()
    }

    pub fn inputs(&self) -> &[PortData] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[PortData] {
        &self.outputs
    }

    pub fn input_mut(&mut self, port: usize) -> Option<&mut PortData> {
        self.inputs.get_mut(port)
    }

    pub fn connection(&self, port: usize) -> Option<Connection> {
        self.connections.get(port).copied().flatten()
    }

    pub fn connections(&self) -> impl Iterator<Item = (usize, Connection)> + '_ {
        self.connections
            .iter()
            .enumerate()
            .filter_map(|(port, conn)| conn.map(|c| (port, c)))
    }

    pub fn is_connected(&self, port: usize) -> bool {
        self.connection(port).is_some()
    }

    pub fn all_inputs_connected(&self) -> bool {
        self.connections.iter().all(Option::is_some)
    }

    pub fn variadic(&self) -> Option<&Variadic> {
        self.variadic.as_ref()
    }

    /// The node's own flag, ignoring kind rules and function indirection.
    pub fn local_requires_recalc(&self) -> bool {
        self.requires_recalc
    }

    /// Own staleness: the local flag combined with what the kind dictates.
    /// Function indirection is resolved by [`crate::graph::dirty`].
    pub fn is_stale(&self) -> bool {
        if self.kind.is_never_dirty() {
            return false;
        }
        if self.kind.is_always_dirty() {
            return true;
        }
        let ports_changed = self
            .variadic
            .is_some_and(|v| v.count_changed(self.inputs.len()));
        self.requires_recalc || ports_changed
    }

    pub fn mark_dirty(&mut self) {
        self.requires_recalc = true;
    }

    /// Clears the local flag and records the evaluated port count.
    pub fn mark_clean(&mut self) {
        self.requires_recalc = false;
        let count = self.inputs.len();
        if let Some(variadic) = self.variadic.as_mut() {
            variadic.last_evaluated = Some(count);
        }
    }

    /// Replaces the value of a literal node.
    pub fn set_literal(&mut self, value: Value) -> GraphResult<()> {
        let kind = match (&self.kind, value) {
            (NodeKind::Number(_), Value::Number(n)) => NodeKind::Number(n),
            (NodeKind::Text(_), Value::String(s)) => NodeKind::Text(s.to_string()),
            (NodeKind::Bool(_), Value::Number(n)) => NodeKind::Bool(n != 0.0),
            _ => return Err(GraphError::NotALiteral(self.id)),
        };
        self.kind = kind;
        self.requires_recalc = true;
        Ok(())
    }

    /// The literal a constant node stands for, if it is one.
    pub fn literal(&self) -> Option<Value> {
        match &self.kind {
            NodeKind::Number(n) => Some(Value::Number(*n)),
            NodeKind::Text(s) => Some(Value::from(s.as_str())),
            NodeKind::Bool(b) => Some(Value::from_bool(*b)),
            NodeKind::Pi => Some(Value::Number(PI)),
            NodeKind::Empty => Some(Value::empty_list()),
            _ => None,
        }
    }

    pub(crate) fn set_connection(&mut self, port: usize, conn: Option<Connection>) -> Option<Connection> {
        let previous = std::mem::replace(&mut self.connections[port], conn);
        self.requires_recalc = true;
        previous
    }

    pub(crate) fn push_input(&mut self) -> GraphResult<()> {
        let rule = self.variadic.map(|v| v.rule).ok_or(GraphError::NotVariadic(self.id))?;
        let index = self.inputs.len();
        self.inputs.push(rule.new_port(index, index + 1));
        self.connections.push(None);
        rule.rename(&mut self.inputs);
        self.requires_recalc = true;
        Ok(())
    }

    /// Drops the last input. Returns the wire that was attached to it.
    pub(crate) fn pop_input(&mut self) -> GraphResult<Option<Connection>> {
        let rule = self.variadic.map(|v| v.rule).ok_or(GraphError::NotVariadic(self.id))?;
        if self.inputs.len() <= rule.min_ports() {
            return Err(GraphError::CannotRemovePort {
                node: self.id,
                min: rule.min_ports(),
            });
        }
        self.inputs.pop();
        let dropped = self.connections.pop().flatten();
        rule.rename(&mut self.inputs);
        self.requires_recalc = true;
        Ok(dropped)
    }
}
