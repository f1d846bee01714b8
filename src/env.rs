// ABOUTME: Lexically scoped environments shared by reference between closures

use crate::object::Object;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Environments are handed around by `Rc` so closures and call frames can
/// share one scope chain. Self-referential `let` bindings form `Rc` cycles;
/// those scopes are never reclaimed, which is fine for an interpreter whose
/// environments live for the whole session anyway.
pub type Env = Rc<Environment>;

#[derive(Debug)]
pub struct Environment {
    store: RefCell<HashMap<String, Object>>,
    outer: Option<Env>,
}

impl Environment {
    pub fn new() -> Env {
        Rc::new(Environment {
            store: RefCell::new(HashMap::new()),
            outer: None,
        })
    }

    pub fn new_enclosed(outer: Env) -> Env {
        Rc::new(Environment {
            store: RefCell::new(HashMap::new()),
            outer: Some(outer),
        })
    }

    /// Walks the outer chain on a miss in this scope.
    pub fn get(&self, name: &str) -> Option<Object> {
        if let Some(value) = self.store.borrow().get(name) {
            return Some(value.clone());
        }
        self.outer.as_ref().and_then(|outer| outer.get(name))
    }

    /// Binds in this scope only and hands the value back, so a `let`
    /// evaluates to what it bound.
    pub fn set(&self, name: impl Into<String>, value: Object) -> Object {
        self.store.borrow_mut().insert(name.into(), value.clone());
        value
    }
}
