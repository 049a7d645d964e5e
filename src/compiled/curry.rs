//! Partial application of callables with named formal parameters.
//!
//! Given a body expression, its declared parameters and the subset of
//! parameters that were supplied, a call lowers to one of three shapes:
//!
//! | supplied            | result                                        |
//! |---------------------|-----------------------------------------------|
//! | none, params > 0    | the body itself, unapplied                    |
//! | some but not all    | `(lambda (missing..) (body arg-or-name..))`   |
//! | all                 | `(body args..)`                               |
//!
//! Arguments are always laid out in declared parameter order, never in the
//! order they were supplied.

use std::{collections::HashMap, rc::Rc};

use crate::expression::{ExprRef, Expression};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallShape {
    Unapplied,
    Partial { missing: Vec<Rc<str>> },
    Saturated,
}

pub fn classify<V>(params: &[Rc<str>], supplied: &HashMap<Rc<str>, V>) -> CallShape {
    if supplied.is_empty() && !params.is_empty() {
        return CallShape::Unapplied;
    }
    let missing: Vec<Rc<str>> = params
        .iter()
        .filter(|p| !supplied.contains_key(*p))
        .cloned()
        .collect();
    if missing.is_empty() {
        CallShape::Saturated
    } else {
        CallShape::Partial { missing }
    }
}

/// Lowers a call. `supplied` holds already compiled argument expressions.
pub fn lower_call(
    body: ExprRef,
    params: &[Rc<str>],
    supplied: &HashMap<Rc<str>, ExprRef>,
) -> ExprRef {
    match classify(params, supplied) {
        CallShape::Unapplied => body,
        CallShape::Partial { missing } => {
            let args = params
                .iter()
                .map(|p| match supplied.get(p) {
                    Some(arg) => Rc::clone(arg),
                    None => Expression::symbol(Rc::clone(p)),
                })
                .collect();
            Expression::lambda(missing, Expression::apply(body, args))
        }
        CallShape::Saturated => {
            let args = params
                .iter()
                .filter_map(|p| supplied.get(p).cloned())
                .collect();
            Expression::apply(body, args)
        }
    }
}
