//! Lowers a workspace into the compiled-node tree.
//!
//! A [`Builder`] is one build pass. It memoizes every `(node, output port)` it
//! compiles so a fan-out producer is compiled once and every consumer shares
//! the same `Rc`. The memo never outlives the builder, so edits between passes
//! cannot leak stale subtrees.

use std::{
    collections::{HashMap, HashSet},
    f64::consts::PI,
    rc::Rc,
};

use tracing::{debug, trace};

use crate::{
    compiled::{CallNode, CompileError, CompileResult, CompiledNode},
    engine::breakpoint::BreakpointGate,
    expression::{ExprRef, Expression},
    graph::{
        kind::NodeKind,
        node::{GraphNode, NodeId},
        registry::FunctionRegistry,
        workspace::Workspace,
    },
    runtime::{interpreter::DEFAULT_MAX_CALL_DEPTH, value::Value},
};

/// Symbol a function parameter is bound to. Derived from the node id so it
/// can never collide with a builtin or a port name.
pub fn variable_symbol(id: NodeId) -> String {
    format!("${}", id)
}

fn describe(node: &GraphNode) -> String {
    format!("{} ({})", node.label(), node.id())
}

#[derive(Clone, Copy)]
enum Logic {
    And,
    Or,
}

pub struct Builder<'a> {
    workspace: &'a Workspace,
    registry: &'a FunctionRegistry,
    breakpoints: Option<Rc<BreakpointGate>>,
    memo: HashMap<(NodeId, usize), Rc<CompiledNode>>,
    building: HashSet<NodeId>,
    max_depth: usize,
}

impl<'a> Builder<'a> {
    pub fn new(workspace: &'a Workspace, registry: &'a FunctionRegistry) -> Self {
        Self {
            workspace,
            registry,
            breakpoints: None,
            memo: HashMap::new(),
            building: HashSet::new(),
            max_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }

    /// Longest chain of nodes a single build may descend through.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Breakpoint nodes compile to gate-checked pass-throughs instead of
    /// plain identity calls.
    pub fn with_breakpoints(mut self, gate: Rc<BreakpointGate>) -> Self {
        self.breakpoints = Some(gate);
        self
    }

    pub fn memoized(&self, node: NodeId, port: usize) -> Option<&Rc<CompiledNode>> {
        self.memo.get(&(node, port))
    }

    pub fn memo_len(&self) -> usize {
        self.memo.len()
    }

    /// Compiles output `port` of `id`, reusing anything built earlier in this pass.
    pub fn build(&mut self, id: NodeId, port: usize) -> CompileResult<Rc<CompiledNode>> {
        if let Some(hit) = self.memo.get(&(id, port)) {
            trace!(node = %id, port, "memo hit");
            return Ok(Rc::clone(hit));
        }
        let workspace = self.workspace;
        let node = workspace.node(id).ok_or(CompileError::NodeNotFound(id))?;
        if port >= node.outputs().len() {
            return Err(CompileError::PortOutOfRange { node: id, port });
        }
        if self.building.contains(&id) {
            return Err(CompileError::CycleDetected(id));
        }
        if self.building.len() >= self.max_depth {
            return Err(CompileError::TooDeep {
                node: describe(node),
                limit: self.max_depth,
            });
        }
        self.building.insert(id);
        let result = self.compile_node(node, port);
        self.building.remove(&id);
        let compiled = result?;
        self.memo.insert((id, port), Rc::clone(&compiled));
        Ok(compiled)
    }

    fn compile_node(&mut self, node: &'a GraphNode, port: usize) -> CompileResult<Rc<CompiledNode>> {
        match node.kind() {
            NodeKind::Number(n) => Ok(CompiledNode::number(*n)),
            NodeKind::Text(s) => Ok(CompiledNode::string(s.as_str())),
            NodeKind::Bool(b) => Ok(CompiledNode::number(if *b { 1.0 } else { 0.0 })),
            NodeKind::Pi => Ok(CompiledNode::number(PI)),
            NodeKind::Empty => Ok(CompiledNode::symbol("empty")),
            NodeKind::Variable { .. } => Ok(CompiledNode::symbol(variable_symbol(node.id()))),
            NodeKind::Output { .. } => self.build_input(node, 0),
            NodeKind::And => self.short_circuit(node, Logic::And),
            NodeKind::Or => self.short_circuit(node, Logic::Or),
            NodeKind::If => {
                let args: HashMap<_, _> = self.resolve_inputs(node, 0)?.into_iter().collect();
                CompiledNode::conditional_from_arguments(&describe(node), &args)
            }
            NodeKind::Begin => {
                let body = self
                    .resolve_inputs(node, 0)?
                    .into_iter()
                    .map(|(_, arg)| arg)
                    .collect();
                CompiledNode::sequence(body)
            }
            NodeKind::Apply => {
                let procedure = match node.connection(0) {
                    Some(conn) => Some(self.build(conn.node, conn.port)?),
                    None => None,
                };
                let args = self.resolve_inputs(node, 1)?;
                let call = CallNode::applier(&describe(node), procedure, params(node, 1), args)?;
                Ok(CompiledNode::call(call))
            }
            NodeKind::Builtin { symbol } => {
                let args = self.resolve_inputs(node, 0)?;
                Ok(CompiledNode::call(CallNode::named(symbol.as_str(), params(node, 0), args)?))
            }
            NodeKind::Native(op) => {
                let mut function = op.function();
                if node.outputs().len() > 1 {
                    function = function.project(port);
                }
                let args = self.resolve_inputs(node, 0)?;
                Ok(CompiledNode::call(CallNode::external(function, params(node, 0), args)?))
            }
            NodeKind::Function { symbol } => self.function_call(node, symbol, port),
            NodeKind::Breakpoint => {
                let args = self.resolve_inputs(node, 0)?;
                let call = match &self.breakpoints {
                    Some(gate) => CallNode::external(gate.function(node.id()), params(node, 0), args)?,
                    None => CallNode::named("identity", params(node, 0), args)?,
                };
                Ok(CompiledNode::call(call))
            }
        }
    }

    /// Compiles the inputs from `skip` on, in port order. Unconnected ports
    /// fall back to their default; without one they are left out for currying,
    /// or fail for kinds that need every input.
    fn resolve_inputs(
        &mut self,
        node: &'a GraphNode,
        skip: usize,
    ) -> CompileResult<Vec<(Rc<str>, Rc<CompiledNode>)>> {
        let mut args = Vec::new();
        for (index, port) in node.inputs().iter().enumerate().skip(skip) {
            let name: Rc<str> = Rc::from(port.name.as_str());
            if let Some(conn) = node.connection(index) {
                args.push((name, self.build(conn.node, conn.port)?));
            } else if let Some(default) = port.default_value() {
                args.push((name, literal(default, node, &port.name)?));
            } else if node.kind().requires_all_inputs() {
                return Err(CompileError::MissingConnection {
                    node: describe(node),
                    port: port.name.clone(),
                });
            }
        }
        Ok(args)
    }

    /// A single input that must be present.
    fn build_input(&mut self, node: &'a GraphNode, index: usize) -> CompileResult<Rc<CompiledNode>> {
        let port = node.inputs().get(index).ok_or(CompileError::PortOutOfRange {
            node: node.id(),
            port: index,
        })?;
        match (node.connection(index), port.default_value()) {
            (Some(conn), _) => self.build(conn.node, conn.port),
            (None, Some(default)) => literal(default, node, &port.name),
            (None, None) => Err(CompileError::MissingConnection {
                node: describe(node),
                port: port.name.clone(),
            }),
        }
    }

    /// With both operands wired, `and`/`or` become conditionals so the second
    /// operand only runs when it decides the result. Otherwise the node is a
    /// lambda over its ports with the wired operands partially applied.
    fn short_circuit(&mut self, node: &'a GraphNode, logic: Logic) -> CompileResult<Rc<CompiledNode>> {
        let names = params(node, 0);
        let [first, second] = names.as_slice() else {
            return Err(CompileError::InputCount {
                node: describe(node),
                expected: 2,
                found: names.len(),
            });
        };
        if node.all_inputs_connected() {
            let a = self.build_input(node, 0)?;
            let b = self.build_input(node, 1)?;
            return Ok(match logic {
                Logic::And => CompiledNode::conditional(a, b, CompiledNode::number(0.0)),
                Logic::Or => CompiledNode::conditional(a, CompiledNode::number(1.0), b),
            });
        }
        let a = CompiledNode::symbol(Rc::clone(first));
        let b = CompiledNode::symbol(Rc::clone(second));
        let entry = match logic {
            Logic::And => CompiledNode::conditional(a, b, CompiledNode::number(0.0)),
            Logic::Or => CompiledNode::conditional(a, CompiledNode::number(1.0), b),
        };
        let args = self.resolve_inputs(node, 0)?;
        Ok(CompiledNode::call(CallNode::anonymous(names, entry, args)?))
    }

    /// A call to a user function. Results past the first are projected out of
    /// the list the definition returns.
    fn function_call(
        &mut self,
        node: &'a GraphNode,
        symbol: &str,
        port: usize,
    ) -> CompileResult<Rc<CompiledNode>> {
        if !self.registry.contains(symbol) {
            debug!(symbol, "building a call to an undefined function");
        }
        let args = self.resolve_inputs(node, 0)?;
        if node.outputs().len() <= 1 {
            return Ok(CompiledNode::call(CallNode::named(symbol, params(node, 0), args)?));
        }
        // Positional names keep the wrapper from capturing symbols the
        // arguments refer to.
        let positional: Vec<Rc<str>> = (0..node.inputs().len())
            .map(|i| Rc::from(format!("${}", i)))
            .collect();
        let inner = CallNode::named(
            symbol,
            positional.clone(),
            positional
                .iter()
                .map(|p| (Rc::clone(p), CompiledNode::symbol(Rc::clone(p)))),
        )?;
        let index: Rc<str> = Rc::from("index");
        let seq: Rc<str> = Rc::from("seq");
        let project = CallNode::named(
            "get",
            vec![Rc::clone(&index), Rc::clone(&seq)],
            [
                (index, CompiledNode::number(port as f64)),
                (seq, CompiledNode::call(inner)),
            ],
        )?;
        let by_port: HashMap<Rc<str>, Rc<str>> = params(node, 0)
            .into_iter()
            .zip(positional.iter().cloned())
            .collect();
        let args = args
            .into_iter()
            .filter_map(|(name, arg)| by_port.get(&name).map(|p| (Rc::clone(p), arg)));
        Ok(CompiledNode::call(CallNode::anonymous(
            positional.clone(),
            CompiledNode::call(project),
            args,
        )?))
    }
}

fn params(node: &GraphNode, skip: usize) -> Vec<Rc<str>> {
    node.inputs()
        .iter()
        .skip(skip)
        .map(|p| Rc::from(p.name.as_str()))
        .collect()
}

/// Compiled form of a port default. Lists and symbols are quoted.
fn literal(value: &Value, node: &GraphNode, port: &str) -> CompileResult<Rc<CompiledNode>> {
    if value.ensure_plain_data().is_err() {
        return Err(CompileError::NotPlainData {
            node: describe(node),
            port: port.to_string(),
        });
    }
    Ok(match value {
        Value::Number(n) => CompiledNode::number(*n),
        Value::String(s) => CompiledNode::string(Rc::clone(s)),
        Value::Container(c) => CompiledNode::container(c.clone()),
        _ => CompiledNode::quote(value.clone()),
    })
}

/// Lowers a registered function to `(lambda (params..) body)`.
///
/// Parameters are the workspace's Variable nodes and results its Output nodes,
/// both in insertion order. Several results are returned as a list.
pub fn compile_function(
    symbol: &str,
    registry: &FunctionRegistry,
    breakpoints: Option<Rc<BreakpointGate>>,
) -> CompileResult<ExprRef> {
    let workspace = registry
        .lookup(symbol)
        .ok_or_else(|| CompileError::FunctionNotFound(symbol.to_string()))?;
    let mut builder = Builder::new(workspace, registry);
    builder.breakpoints = breakpoints;

    let params: Vec<Rc<str>> = workspace
        .variables()
        .map(|v| Rc::from(variable_symbol(v.id())))
        .collect();
    let outputs: Vec<&GraphNode> = workspace.outputs().collect();
    let body = match outputs.as_slice() {
        [] => {
            return Err(CompileError::MissingConnection {
                node: symbol.to_string(),
                port: "output".to_string(),
            });
        }
        [single] => builder.build_input(single, 0)?.compile(),
        many => {
            let names: Vec<Rc<str>> = (0..many.len()).map(|i| Rc::from(format!("index{}", i))).collect();
            let mut items = Vec::with_capacity(many.len());
            for (output, name) in many.iter().zip(&names) {
                items.push((Rc::clone(name), builder.build_input(output, 0)?));
            }
            CompiledNode::call(CallNode::named("list", names, items)?).compile()
        }
    };
    debug!(symbol, memo = builder.memo_len(), "compiled function definition");
    Ok(Expression::lambda(params, body))
}
