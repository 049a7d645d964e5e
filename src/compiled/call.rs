use std::{collections::HashMap, rc::Rc};

use crate::{
    compiled::{
        CompiledNode,
        curry::{CallShape, classify, lower_call},
        error::{CompileError, CompileResult},
    },
    expression::{ExprRef, Expression},
    runtime::native_function::NativeFunction,
};

/// How a call obtains the callable it applies.
#[derive(Debug, Clone)]
pub enum CallBody {
    /// Looked up by name in the environment at evaluation time.
    Named(Rc<str>),
    /// A lambda over `params` whose body is `entry`.
    Anonymous {
        params: Vec<Rc<str>>,
        entry: Rc<CompiledNode>,
    },
    /// The callable is itself computed by another compiled node.
    Applier(Rc<CompiledNode>),
    External(NativeFunction),
}

/// A callable plus its formal parameters and the arguments supplied so far.
#[derive(Debug, Clone)]
pub struct CallNode {
    body: CallBody,
    params: Vec<Rc<str>>,
    arguments: HashMap<Rc<str>, Rc<CompiledNode>>,
}

impl CallNode {
    /// Every supplied argument must name a declared parameter.
    pub fn new(
        body: CallBody,
        params: Vec<Rc<str>>,
        arguments: impl IntoIterator<Item = (Rc<str>, Rc<CompiledNode>)>,
    ) -> CompileResult<Self> {
        let arguments: HashMap<_, _> = arguments.into_iter().collect();
        if let Some(name) = arguments.keys().find(|name| !params.contains(name)) {
            return Err(CompileError::UnknownParameter {
                name: name.to_string(),
            });
        }
        Ok(Self {
            body,
            params,
            arguments,
        })
    }

    pub fn named(
        symbol: impl Into<Rc<str>>,
        params: Vec<Rc<str>>,
        arguments: impl IntoIterator<Item = (Rc<str>, Rc<CompiledNode>)>,
    ) -> CompileResult<Self> {
        Self::new(CallBody::Named(symbol.into()), params, arguments)
    }

    /// A lambda over `params` applied to whichever of them were supplied.
    pub fn anonymous(
        params: Vec<Rc<str>>,
        entry: Rc<CompiledNode>,
        arguments: impl IntoIterator<Item = (Rc<str>, Rc<CompiledNode>)>,
    ) -> CompileResult<Self> {
        let body = CallBody::Anonymous {
            params: params.clone(),
            entry,
        };
        Self::new(body, params, arguments)
    }

    /// `procedure` is the compiled `func` input; a missing one is fatal.
    pub fn applier(
        node: &str,
        procedure: Option<Rc<CompiledNode>>,
        params: Vec<Rc<str>>,
        arguments: impl IntoIterator<Item = (Rc<str>, Rc<CompiledNode>)>,
    ) -> CompileResult<Self> {
        let procedure = procedure.ok_or_else(|| CompileError::MissingConnection {
            node: node.to_string(),
            port: "func".to_string(),
        })?;
        Self::new(CallBody::Applier(procedure), params, arguments)
    }

    pub fn external(
        function: NativeFunction,
        params: Vec<Rc<str>>,
        arguments: impl IntoIterator<Item = (Rc<str>, Rc<CompiledNode>)>,
    ) -> CompileResult<Self> {
        Self::new(CallBody::External(function), params, arguments)
    }

    pub fn body(&self) -> &CallBody {
        &self.body
    }

    pub fn params(&self) -> &[Rc<str>] {
        &self.params
    }

    pub fn argument(&self, name: &str) -> Option<&Rc<CompiledNode>> {
        self.arguments.get(name)
    }

    pub fn shape(&self) -> CallShape {
        classify(&self.params, &self.arguments)
    }

    fn body_expression(&self) -> ExprRef {
        match &self.body {
            CallBody::Named(symbol) => Expression::symbol(Rc::clone(symbol)),
            CallBody::Anonymous { params, entry } => {
                Expression::lambda(params.iter().cloned(), entry.compile())
            }
            CallBody::Applier(procedure) => procedure.compile(),
            CallBody::External(function) => Rc::new(Expression::Function(function.clone())),
        }
    }

    pub(super) fn lower(&self) -> ExprRef {
        let supplied: HashMap<Rc<str>, ExprRef> = self
            .arguments
            .iter()
            .map(|(name, node)| (Rc::clone(name), node.compile()))
            .collect();
        lower_call(self.body_expression(), &self.params, &supplied)
    }
}
