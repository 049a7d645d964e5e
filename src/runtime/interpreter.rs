use std::{cell::Cell, rc::Rc};

use tracing::trace;

use crate::{
    expression::Expression,
    runtime::{
        builtins,
        environment::Environment,
        error::{EvalError, EvalResult},
        native_function::{Arity, NativeFunction},
        value::Value,
    },
};

pub const DEFAULT_MAX_CALL_DEPTH: usize = 256;

#[derive(Debug)]
struct CallDepth {
    current: Cell<usize>,
    max: usize,
}

/// Decrements the shared depth counter when a call frame unwinds, including on
/// the error path.
struct DepthGuard(Rc<CallDepth>);

impl DepthGuard {
    fn enter(depth: &Rc<CallDepth>) -> EvalResult<Self> {
        let next = depth.current.get() + 1;
        if next > depth.max {
            return Err(EvalError::RecursionLimit(depth.max));
        }
        depth.current.set(next);
        Ok(DepthGuard(Rc::clone(depth)))
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        self.0.current.set(self.0.current.get() - 1);
    }
}

/// Tree-walking evaluator for compiled expressions.
///
/// The global environment holds the builtin library and any user function
/// definitions the engine installs before a run. Definitions are looked up by
/// name at call time, so recursive functions need no fix-point machinery.
pub struct Interpreter {
    globals: Rc<Environment>,
    depth: Rc<CallDepth>,
}

impl Interpreter {
    pub fn new(max_call_depth: usize) -> Self {
        let globals = Environment::new_global();
        builtins::install(&globals);
        Self {
            globals,
            depth: Rc::new(CallDepth {
                current: Cell::new(0),
                max: max_call_depth,
            }),
        }
    }

    pub fn globals(&self) -> &Rc<Environment> {
        &self.globals
    }

    pub fn define(&self, name: impl Into<Rc<str>>, value: Value) {
        self.globals.define(name, value);
    }

    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.globals.lookup(name)
    }

    pub fn eval(&self, expr: &Expression) -> EvalResult<Value> {
        eval_in(expr, &self.globals, &self.depth)
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CALL_DEPTH)
    }
}

impl Drop for Interpreter {
    fn drop(&mut self) {
        self.globals.clear();
    }
}

fn eval_in(expr: &Expression, env: &Rc<Environment>, depth: &Rc<CallDepth>) -> EvalResult<Value> {
    match expr {
        Expression::Number(n) => Ok(Value::Number(*n)),
        Expression::String(s) => Ok(Value::String(Rc::clone(s))),
        Expression::Symbol(name) => env
            .lookup(name)
            .ok_or_else(|| EvalError::UnboundSymbol(name.to_string())),
        Expression::Container(c) => Ok(Value::Container(c.clone())),
        Expression::Function(f) => Ok(Value::Function(f.clone())),
        Expression::Quote(value) => Ok(value.clone()),
        Expression::If {
            test,
            then,
            otherwise,
        } => {
            // Only the taken branch is evaluated.
            if eval_in(test, env, depth)?.is_truthy("if test")? {
                eval_in(then, env, depth)
            } else {
                eval_in(otherwise, env, depth)
            }
        }
        Expression::Begin(body) => {
            let mut last = Value::empty_list();
            for expr in body {
                last = eval_in(expr, env, depth)?;
            }
            Ok(last)
        }
        Expression::Fun { params, body } => Ok(Value::Function(make_closure(
            params.clone(),
            Rc::clone(body),
            env,
            depth,
        ))),
        Expression::Apply { callee, args } => {
            // Nested argument evaluation counts toward the depth too.
            let _guard = DepthGuard::enter(depth)?;
            let callee = eval_in(callee, env, depth)?;
            let Value::Function(func) = callee else {
                return Err(EvalError::NotAFunction(callee.type_name()));
            };
            let args = args
                .iter()
                .map(|arg| eval_in(arg, env, depth))
                .collect::<EvalResult<Vec<_>>>()?;
            trace!(function = func.name(), argc = args.len(), "apply");
            func.call(&args)
        }
    }
}

fn make_closure(
    params: Vec<Rc<str>>,
    body: Rc<Expression>,
    env: &Rc<Environment>,
    depth: &Rc<CallDepth>,
) -> NativeFunction {
    let captured = Rc::clone(env);
    let depth = Rc::clone(depth);
    let arity = Arity::Exact(params.len());
    NativeFunction::new("<lambda>", arity, move |args| {
        let frame = Environment::extend(
            &captured,
            params.iter().cloned().zip(args.iter().cloned()),
        );
        eval_in(&body, &frame, &depth)
    })
}

#[cfg(test)]
#[path = "interpreter_test.rs"]
mod interpreter_test;
