//! The evaluation driver.
//!
//! [`Engine`] owns the home workspace, the function registry and an
//! interpreter. A run compiles the requested output, evaluates it, and then
//! marks everything it read from clean, so the next request for the same
//! output can be served from the result cache until an upstream node or a
//! function it reaches is edited.

use std::{
    collections::{BTreeSet, HashMap, HashSet},
    rc::Rc,
};

use tracing::{debug, instrument, trace, warn};

use crate::{
    compiled::CompileError,
    expression::print_expression,
    graph::{
        Builder, FunctionRegistry, GraphError, NodeId, Workspace, compile_function, dirty,
    },
    persist::{self, Fingerprint},
    runtime::{error::EvalError, interpreter::Interpreter, value::Value},
};

pub mod breakpoint;
pub mod config;
pub mod error;
pub mod idle;

pub use breakpoint::{BreakpointGate, ResumeHandle};
pub use config::EngineConfig;
pub use error::EngineError;
pub use idle::{IdleDispatcher, IdleError, IdleHandle};

/// Result of [`Engine::run`].
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The output was compiled and evaluated.
    Computed(Value),
    /// Nothing the output depends on changed since it was last computed.
    Cached(Value),
    /// A breakpoint stopped the run. `inspected` is the value that reached it.
    Paused {
        breakpoint: NodeId,
        inspected: Value,
        handle: ResumeHandle,
    },
}

impl RunOutcome {
    pub fn value(&self) -> Option<&Value> {
        match self {
            RunOutcome::Computed(v) | RunOutcome::Cached(v) => Some(v),
            RunOutcome::Paused { .. } => None,
        }
    }

    pub fn is_cached(&self) -> bool {
        matches!(self, RunOutcome::Cached(_))
    }
}

pub struct Engine {
    config: EngineConfig,
    home: Workspace,
    registry: FunctionRegistry,
    interpreter: Interpreter,
    cache: HashMap<(NodeId, usize), Value>,
    node_errors: HashMap<NodeId, CompileError>,
    definitions: HashMap<String, Fingerprint>,
    breakpoints: Rc<BreakpointGate>,
    paused: Option<ResumeHandle>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_workspace(config, Workspace::new("home"), FunctionRegistry::new())
    }

    pub fn with_workspace(config: EngineConfig, home: Workspace, registry: FunctionRegistry) -> Self {
        let interpreter = Interpreter::new(config.max_call_depth);
        let breakpoints = BreakpointGate::new(config.debug_breakpoints);
        Self {
            config,
            home,
            registry,
            interpreter,
            cache: HashMap::new(),
            node_errors: HashMap::new(),
            definitions: HashMap::new(),
            breakpoints,
            paused: None,
        }
    }

    /// Loads a saved project: a home workspace plus its function definitions.
    pub fn from_project_json(config: EngineConfig, text: &str) -> Result<Self, EngineError> {
        let (home, registry) = persist::project_from_json(text)?;
        Ok(Self::with_workspace(config, home, registry))
    }

    pub fn to_project_json(&self) -> Result<String, EngineError> {
        Ok(persist::project_to_json(&self.home, &self.registry)?)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn home(&self) -> &Workspace {
        &self.home
    }

    /// Edits made through this reference mark the touched nodes dirty.
    pub fn home_mut(&mut self) -> &mut Workspace {
        &mut self.home
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut FunctionRegistry {
        &mut self.registry
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    /// Registers or replaces a user function. Returns the previous body.
    pub fn define_function(&mut self, symbol: impl Into<String>, body: Workspace) -> Option<Workspace> {
        let symbol = symbol.into();
        self.definitions.remove(&symbol);
        self.registry.define(symbol, body)
    }

    /// Build errors of the most recent run of each root.
    pub fn node_errors(&self) -> &HashMap<NodeId, CompileError> {
        &self.node_errors
    }

    pub fn set_debug_breakpoints(&mut self, enabled: bool) {
        self.config.debug_breakpoints = enabled;
        self.breakpoints.set_enabled(enabled);
    }

    pub fn paused(&self) -> Option<ResumeHandle> {
        self.paused
    }

    /// Computes output `port` of `root`, or serves it from the cache when
    /// nothing it depends on requires recalculation. A run that was paused
    /// and not resumed is abandoned.
    #[instrument(skip(self))]
    pub fn run(&mut self, root: NodeId, port: usize) -> Result<RunOutcome, EngineError> {
        if let Some(abandoned) = self.paused.take() {
            debug!(breakpoint = %abandoned.breakpoint, "abandoning paused run");
            self.breakpoints.rearm();
        }
        self.execute(root, port)
    }

    /// Releases the breakpoint `handle` stopped at and runs its root again.
    #[instrument(skip(self))]
    pub fn resume(&mut self, handle: ResumeHandle) -> Result<RunOutcome, EngineError> {
        if self.paused != Some(handle) {
            return Err(EngineError::NotPaused(handle.breakpoint));
        }
        self.paused = None;
        self.breakpoints.release(handle.breakpoint);
        self.execute(handle.root, handle.port)
    }

    /// Removes a home node. A function reference also tears down the
    /// referenced definition's nodes. Returns every destroyed node id.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Vec<NodeId>, EngineError> {
        let affected = self.home.downstream(&HashSet::from([id]));
        let node = self.home.remove_node(id)?;
        let destroyed = dirty::destroy(&node, &mut self.registry);
        if let Some(symbol) = node.kind().function_symbol() {
            self.definitions.remove(symbol);
        }
        self.cache.retain(|(n, _), _| !affected.contains(n));
        for gone in &destroyed {
            self.node_errors.remove(gone);
        }
        debug!(node = %id, destroyed = destroyed.len(), "removed node");
        Ok(destroyed)
    }

    fn execute(&mut self, root: NodeId, port: usize) -> Result<RunOutcome, EngineError> {
        if self.home.node(root).is_none() {
            return Err(GraphError::NodeNotFound(root).into());
        }
        let upstream = self.home.upstream(root);
        let stale: HashSet<NodeId> = upstream
            .iter()
            .copied()
            .filter(|id| {
                self.home
                    .node(*id)
                    .is_some_and(|n| dirty::requires_recalc(n, &self.registry))
            })
            .collect();

        if stale.is_empty() && self.config.reuse_cached_results {
            if let Some(value) = self.cache.get(&(root, port)) {
                trace!("serving cached result");
                return Ok(RunOutcome::Cached(value.clone()));
            }
        }

        let functions = self.reachable_functions(&upstream);
        let changed_functions = self.sync_definitions(&functions)?;

        let compiled = {
            let mut builder = Builder::new(&self.home, &self.registry)
                .with_max_depth(self.config.max_call_depth)
                .with_breakpoints(Rc::clone(&self.breakpoints));
            let result = builder.build(root, port);
            debug!(memo = builder.memo_len(), "built root");
            result
        };
        let compiled = match compiled {
            Ok(compiled) => {
                self.node_errors.remove(&root);
                compiled
            }
            Err(e) => {
                warn!(error = %e, "build failed");
                self.node_errors.insert(root, e.clone());
                return Err(e.into());
            }
        };

        let expr = compiled.compile();
        if self.config.trace_expressions {
            debug!(expr = %print_expression(&expr), "evaluating");
        } else {
            trace!(expr = %print_expression(&expr), "evaluating");
        }

        let value = match self.interpreter.eval(&expr) {
            Ok(value) => value,
            Err(EvalError::Paused(breakpoint)) => {
                let inspected = match self.breakpoints.take_hit() {
                    Some((_, inspected)) => inspected,
                    None => Value::empty_list(),
                };
                let handle = ResumeHandle {
                    root,
                    port,
                    breakpoint,
                };
                self.paused = Some(handle);
                return Ok(RunOutcome::Paused {
                    breakpoint,
                    inspected,
                    handle,
                });
            }
            Err(e) => {
                self.breakpoints.rearm();
                return Err(e.into());
            }
        };

        self.invalidate(&stale, &changed_functions);
        for id in &upstream {
            if let Some(node) = self.home.node_mut(*id) {
                dirty::mark_clean(node, &mut self.registry);
            }
        }
        self.breakpoints.rearm();
        self.cache.insert((root, port), value.clone());
        Ok(RunOutcome::Computed(value))
    }

    /// Every function symbol reachable from `ids`, through nested references.
    fn reachable_functions(&self, ids: &[NodeId]) -> BTreeSet<String> {
        let mut reached = BTreeSet::new();
        let mut pending: Vec<String> = ids
            .iter()
            .filter_map(|id| self.home.node(*id))
            .filter_map(|n| n.kind().function_symbol().map(str::to_string))
            .collect();
        while let Some(symbol) = pending.pop() {
            if !reached.insert(symbol.clone()) {
                continue;
            }
            if let Some(body) = self.registry.lookup(&symbol) {
                pending.extend(body.referenced_functions());
            }
        }
        reached
    }

    /// Defines every function in `symbols` as a global closure, recompiling
    /// only those whose content changed or that have dirty nodes. Returns the
    /// symbols that were recompiled.
    fn sync_definitions(&mut self, symbols: &BTreeSet<String>) -> Result<BTreeSet<String>, EngineError> {
        let mut changed = BTreeSet::new();
        for symbol in symbols {
            let Some(body) = self.registry.lookup(symbol) else {
                warn!(symbol = %symbol, "call to an undefined function");
                continue;
            };
            let fingerprint = persist::fingerprint(body)?;
            let current = self.definitions.get(symbol) == Some(&fingerprint)
                && self.interpreter.lookup(symbol).is_some()
                && !dirty::workspace_requires_recalc(body, &self.registry);
            if current {
                continue;
            }
            let lambda = compile_function(symbol, &self.registry, Some(Rc::clone(&self.breakpoints)))?;
            trace!(symbol = %symbol, expr = %print_expression(&lambda), "defining function");
            let closure = self.interpreter.eval(&lambda)?;
            self.interpreter.define(symbol.as_str(), closure);
            self.definitions.insert(symbol.clone(), fingerprint);
            changed.insert(symbol.clone());
        }
        Ok(changed)
    }

    /// Drops cached results that read from a node about to be marked clean,
    /// or that call a function whose definition just changed.
    fn invalidate(&mut self, stale: &HashSet<NodeId>, changed_functions: &BTreeSet<String>) {
        if stale.is_empty() && changed_functions.is_empty() {
            return;
        }
        let mut seeds = stale.clone();
        for node in self.home.nodes() {
            if let Some(symbol) = node.kind().function_symbol() {
                let calls_changed = self
                    .reachable_functions(&[node.id()])
                    .iter()
                    .any(|s| changed_functions.contains(s));
                if calls_changed || changed_functions.contains(symbol) {
                    seeds.insert(node.id());
                }
            }
        }
        let affected = self.home.downstream(&seeds);
        let before = self.cache.len();
        self.cache.retain(|(n, _), _| !affected.contains(n));
        trace!(dropped = before - self.cache.len(), "invalidated cached results");
    }
}
