use std::{cell::RefCell, collections::HashMap, rc::Rc};

use crate::runtime::value::Value;

/// Lexical scope chain for the evaluator.
///
/// The global frame holds builtins and user function definitions. Closures keep
/// an `Rc` to the frame they were created in, so a global closure stored back
/// into the global frame forms a reference cycle; the owner breaks it with
/// [`Environment::clear`] when the interpreter is dropped.
#[derive(Debug, Default)]
pub struct Environment {
    vars: RefCell<HashMap<Rc<str>, Value>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    pub fn new_global() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn extend(parent: &Rc<Environment>, bindings: impl IntoIterator<Item = (Rc<str>, Value)>) -> Rc<Self> {
        Rc::new(Self {
            vars: RefCell::new(bindings.into_iter().collect()),
            parent: Some(Rc::clone(parent)),
        })
    }

    pub fn define(&self, name: impl Into<Rc<str>>, value: Value) {
        self.vars.borrow_mut().insert(name.into(), value);
    }

    pub fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.vars.borrow().get(name) {
            return Some(value.clone());
        }
        self.parent.as_ref().and_then(|parent| parent.lookup(name))
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    pub fn clear(&self) {
        self.vars.borrow_mut().clear();
    }
}
