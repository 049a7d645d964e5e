//! Debug breakpoints as an explicit suspend/resume protocol.
//!
//! A breakpoint node compiles to a pass-through function bound to a shared
//! [`BreakpointGate`]. When debugging is on and the breakpoint has not been
//! released, the function records the value it received and fails with
//! [`EvalError::Paused`], which unwinds the evaluation. The engine reports the
//! run as paused and hands out a [`ResumeHandle`]; resuming releases the
//! breakpoint and evaluates the root again.

use std::{
    cell::{Cell, RefCell},
    collections::HashSet,
    rc::Rc,
};

use tracing::debug;

use crate::{
    graph::node::NodeId,
    runtime::{
        error::EvalError,
        native_function::{Arity, NativeFunction},
        value::Value,
    },
};

#[derive(Debug, Default)]
pub struct BreakpointGate {
    enabled: Cell<bool>,
    released: RefCell<HashSet<NodeId>>,
    hit: RefCell<Option<(NodeId, Value)>>,
}

impl BreakpointGate {
    pub fn new(enabled: bool) -> Rc<Self> {
        Rc::new(Self {
            enabled: Cell::new(enabled),
            ..Self::default()
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
    }

    /// The pass-through callable for breakpoint node `node`.
    pub fn function(self: &Rc<Self>, node: NodeId) -> NativeFunction {
        let gate = Rc::clone(self);
        NativeFunction::new("breakpoint", Arity::Exact(1), move |args| {
            let value = args[0].clone();
            if gate.enabled.get() && !gate.released.borrow().contains(&node) {
                debug!(%node, "breakpoint hit");
                *gate.hit.borrow_mut() = Some((node, value));
                return Err(EvalError::Paused(node));
            }
            Ok(value)
        })
    }

    pub fn release(&self, node: NodeId) {
        self.released.borrow_mut().insert(node);
    }

    /// Re-arms every breakpoint. Called once a run completes.
    pub fn rearm(&self) {
        self.released.borrow_mut().clear();
        self.hit.borrow_mut().take();
    }

    /// The breakpoint that paused the last run and the value it received.
    pub fn take_hit(&self) -> Option<(NodeId, Value)> {
        self.hit.borrow_mut().take()
    }
}

/// Identifies a paused run: which output was requested and where it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResumeHandle {
    pub root: NodeId,
    pub port: usize,
    pub breakpoint: NodeId,
}
