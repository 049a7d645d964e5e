use std::{any::Any, fmt, rc::Rc};

/// Opaque handle to a host object.
///
/// The engine never looks inside a container. It only carries it through the
/// evaluation and hands it back to whoever knows the wrapped type.
#[derive(Clone)]
pub struct Container {
    type_name: &'static str,
    inner: Rc<dyn Any>,
}

impl Container {
    pub fn new<T: Any>(value: T) -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            inner: Rc::new(value),
        }
    }

    /// Name of the wrapped Rust type, for diagnostics only.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }

    pub fn ptr_eq(&self, other: &Container) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Container({})", self.type_name)
    }
}

/// Containers are equal only when they share the same host object.
impl PartialEq for Container {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}
