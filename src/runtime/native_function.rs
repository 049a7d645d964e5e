use std::{fmt, rc::Rc};

use crate::runtime::{
    error::{EvalError, EvalResult},
    value::Value,
};

/// Signature shared by builtins, lambdas and host callables.
pub type NativeFn = dyn Fn(&[Value]) -> EvalResult<Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exact(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{}", n),
            Arity::AtLeast(n) => write!(f, "{}+", n),
        }
    }
}

/// A callable runtime function: an ordered sequence of values in, one value out.
#[derive(Clone)]
pub struct NativeFunction {
    name: Rc<str>,
    arity: Arity,
    func: Rc<NativeFn>,
}

impl NativeFunction {
    pub fn new(
        name: impl Into<Rc<str>>,
        arity: Arity,
        func: impl Fn(&[Value]) -> EvalResult<Value> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            arity,
            func: Rc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    pub fn call(&self, args: &[Value]) -> EvalResult<Value> {
        if !self.arity.accepts(args.len()) {
            return Err(EvalError::Arity {
                name: self.name.to_string(),
                expected: self.arity.to_string(),
                got: args.len(),
            });
        }
        (self.func)(args)
    }

    /// Wraps a function returning one list element per output port so that the
    /// result is only the element at `index`.
    pub fn project(&self, index: usize) -> NativeFunction {
        let inner = self.clone();
        let name = format!("{}#{}", self.name, index);
        NativeFunction::new(name.clone(), self.arity, move |args| {
            match inner.call(args)? {
                Value::List(items) => items.get(index).cloned().ok_or(EvalError::IndexOutOfRange {
                    name: name.clone(),
                    index: index as i64,
                    len: items.len(),
                }),
                other => Err(EvalError::type_mismatch(name.as_str(), "List", other.type_name())),
            }
        })
    }

    pub fn ptr_eq(&self, other: &NativeFunction) -> bool {
        Rc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFunction({}/{})", self.name, self.arity)
    }
}

impl PartialEq for NativeFunction {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}
