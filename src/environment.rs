use core::fmt;
use std::{cell::RefCell, collections::HashMap, rc::{Rc, Weak}};

use itertools::Itertools;

use crate::value::Value;


#[derive(Default)]
struct Frame {
    bindings: HashMap<String, Value>,
    parent: Weak<RefCell<Frame>>,
}

/// A handle to one frame of bindings. Cloning the handle shares the frame;
/// use [`Environment::copy`] for an independent frame.
///
/// Parents are not owned. Whoever evaluates in a frame keeps its whole chain
/// alive for the duration of the evaluation: the root belongs to the
/// evaluation context and every other frame belongs to a lambda on the call
/// stack.
#[derive(Clone, Default)]
pub struct Environment(Rc<RefCell<Frame>>);

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// The root environment with every builtin bound.
    pub fn new_root() -> Self {
        crate::builtin::builtin_environment()
    }

    pub fn parent(&self) -> Option<Environment> {
        self.0.borrow().parent.upgrade().map(Self)
    }

    /// Point this frame at a new parent. Lambdas do this on every call, so a
    /// name that is not bound in the closure resolves in the caller.
    pub fn set_parent(&self, parent: &Environment) {
        self.0.borrow_mut().parent = Rc::downgrade(&parent.0);
    }

    /// Looks `name` up through the chain of parents, returning a copy of the
    /// bound value.
    pub fn lookup(&self, name: &str) -> Value {
        let parent = {
            let frame = self.0.borrow();
            if let Some(value) = frame.bindings.get(name) {
                return value.clone()
            }
            frame.parent.upgrade()
        };

        match parent {
            Some(parent) => Self(parent).lookup(name),
            None => Value::error(format!("unbound symbol '{}'", name)),
        }
    }

    pub fn define_local(&self, name: &str, value: Value) {
        self.0.borrow_mut().bindings.insert(name.to_owned(), value);
    }

    pub fn define_global(&self, name: &str, value: Value) {
        self.root().define_local(name, value)
    }

    pub fn root(&self) -> Environment {
        let mut environment = self.clone();
        while let Some(parent) = environment.parent() {
            environment = parent;
        }
        environment
    }

    /// A new frame with copies of every binding and the same parent.
    pub fn copy(&self) -> Self {
        let frame = self.0.borrow();
        Self(Rc::new(RefCell::new(Frame {
            bindings: frame.bindings.clone(),
            parent: frame.parent.clone(),
        })))
    }

    /// Bound names of this frame only, sorted.
    pub fn names(&self) -> Vec<String> {
        self.0.borrow().bindings.keys().cloned().sorted().collect()
    }

    pub fn same_frame(&self, other: &Environment) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment[{}]", self.names().iter().join(", "))
    }
}
