//! Compiled-node tree: the graph-independent intermediate form a build pass
//! produces and the evaluator consumes.
//!
//! Nodes are immutable and shared through `Rc`; the memo table of a build pass
//! hands the same `Rc` to every consumer of a fan-out output. Lowering to an
//! [`Expression`] happens once per node: [`CompiledNode::compile`] caches its
//! result and returns the same `Rc` on every call.

use std::{cell::OnceCell, collections::HashMap, rc::Rc};

use crate::{
    expression::{ExprRef, Expression},
    runtime::{container::Container, value::Value},
};

pub mod call;
pub mod curry;
pub mod error;

pub use call::{CallBody, CallNode};
pub use error::{CompileError, CompileResult};

#[derive(Debug, Clone)]
pub enum CompiledKind {
    Number(f64),
    String(Rc<str>),
    Symbol(Rc<str>),
    Container(Container),
    /// A plain-data value that evaluates to itself.
    Quote(Value),
    /// Non-strict in its branches: only the taken one is evaluated.
    Conditional {
        test: Rc<CompiledNode>,
        then: Rc<CompiledNode>,
        otherwise: Rc<CompiledNode>,
    },
    /// Evaluated left to right, yields the last. Never empty.
    Sequence(Vec<Rc<CompiledNode>>),
    Call(CallNode),
}

#[derive(Debug)]
pub struct CompiledNode {
    kind: CompiledKind,
    lowered: OnceCell<ExprRef>,
}

impl CompiledNode {
    fn wrap(kind: CompiledKind) -> Rc<Self> {
        Rc::new(Self {
            kind,
            lowered: OnceCell::new(),
        })
    }

    pub fn number(value: f64) -> Rc<Self> {
        Self::wrap(CompiledKind::Number(value))
    }

    pub fn string(value: impl Into<Rc<str>>) -> Rc<Self> {
        Self::wrap(CompiledKind::String(value.into()))
    }

    pub fn symbol(name: impl Into<Rc<str>>) -> Rc<Self> {
        Self::wrap(CompiledKind::Symbol(name.into()))
    }

    pub fn container(value: Container) -> Rc<Self> {
        Self::wrap(CompiledKind::Container(value))
    }

    pub fn quote(value: Value) -> Rc<Self> {
        Self::wrap(CompiledKind::Quote(value))
    }

    pub fn conditional(
        test: Rc<CompiledNode>,
        then: Rc<CompiledNode>,
        otherwise: Rc<CompiledNode>,
    ) -> Rc<Self> {
        Self::wrap(CompiledKind::Conditional {
            test,
            then,
            otherwise,
        })
    }

    /// Builds a conditional from arguments keyed `test`, `true` and `false`.
    pub fn conditional_from_arguments(
        node: &str,
        arguments: &HashMap<Rc<str>, Rc<CompiledNode>>,
    ) -> CompileResult<Rc<Self>> {
        let take = |port: &str| {
            arguments
                .get(port)
                .cloned()
                .ok_or_else(|| CompileError::MissingConnection {
                    node: node.to_string(),
                    port: port.to_string(),
                })
        };
        Ok(Self::conditional(take("test")?, take("true")?, take("false")?))
    }

    pub fn sequence(body: Vec<Rc<CompiledNode>>) -> CompileResult<Rc<Self>> {
        if body.is_empty() {
            return Err(CompileError::EmptySequence);
        }
        Ok(Self::wrap(CompiledKind::Sequence(body)))
    }

    pub fn call(call: CallNode) -> Rc<Self> {
        Self::wrap(CompiledKind::Call(call))
    }

    pub fn kind(&self) -> &CompiledKind {
        &self.kind
    }

    /// Lowers this node to an expression. Repeated calls return the same `Rc`.
    pub fn compile(&self) -> ExprRef {
        Rc::clone(self.lowered.get_or_init(|| self.lower()))
    }

    fn lower(&self) -> ExprRef {
        match &self.kind {
            CompiledKind::Number(n) => Expression::number(*n),
            CompiledKind::String(s) => Rc::new(Expression::String(Rc::clone(s))),
            CompiledKind::Symbol(name) => Expression::symbol(Rc::clone(name)),
            CompiledKind::Container(c) => Rc::new(Expression::Container(c.clone())),
            CompiledKind::Quote(value) => Expression::from_value(value),
            CompiledKind::Conditional {
                test,
                then,
                otherwise,
            } => Expression::if_then_else(test.compile(), then.compile(), otherwise.compile()),
            CompiledKind::Sequence(body) => {
                Rc::new(Expression::Begin(body.iter().map(|n| n.compile()).collect()))
            }
            CompiledKind::Call(call) => call.lower(),
        }
    }
}
