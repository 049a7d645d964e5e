//! The small Scheme-like expression language compiled graphs lower into.
//!
//! Expressions are immutable trees shared through `Rc`, so a subtree built
//! once for a fan-out node can appear under several parents without copying.

use std::rc::Rc;

use crate::runtime::{container::Container, native_function::NativeFunction, value::Value};

mod convert;
mod printer;

pub use printer::print_expression;

pub type ExprRef = Rc<Expression>;

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Number(f64),
    String(Rc<str>),
    /// Identifier resolved in the environment at evaluation time.
    Symbol(Rc<str>),
    Container(Container),
    Function(NativeFunction),
    /// Literal value evaluated to itself (lists and symbol values).
    Quote(Value),
    If {
        test: ExprRef,
        then: ExprRef,
        otherwise: ExprRef,
    },
    /// Evaluates left to right and yields the last result. Never empty.
    Begin(Vec<ExprRef>),
    Fun {
        params: Vec<Rc<str>>,
        body: ExprRef,
    },
    Apply {
        callee: ExprRef,
        args: Vec<ExprRef>,
    },
}

impl Expression {
    pub fn symbol(name: impl Into<Rc<str>>) -> ExprRef {
        Rc::new(Expression::Symbol(name.into()))
    }

    pub fn number(value: f64) -> ExprRef {
        Rc::new(Expression::Number(value))
    }

    pub fn lambda(params: impl IntoIterator<Item = Rc<str>>, body: ExprRef) -> ExprRef {
        Rc::new(Expression::Fun {
            params: params.into_iter().collect(),
            body,
        })
    }

    pub fn apply(callee: ExprRef, args: Vec<ExprRef>) -> ExprRef {
        Rc::new(Expression::Apply { callee, args })
    }

    pub fn if_then_else(test: ExprRef, then: ExprRef, otherwise: ExprRef) -> ExprRef {
        Rc::new(Expression::If {
            test,
            then,
            otherwise,
        })
    }
}

impl std::fmt::Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&print_expression(self))
    }
}
