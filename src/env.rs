//! Chained mutable environments.
//!
//! Every environment handle is a reference-counted pointer to a frame, and
//! frames link to their parent the same way. Cloning a handle is cheap and
//! shares the underlying bindings, which is what closures rely on: a
//! function captured in one corner of the program still sees `def`initions
//! added to the global root after it was created.
//!
//! The interpreter is single-threaded, so `Rc<RefCell<..>>` is sufficient
//! and no borrow is held across evaluation of user code.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::LispError;
use crate::ast::{Builtin, Value};

struct Frame {
    bindings: HashMap<String, Value>,
    parent: Option<Environment>,
}

/// Handle to an environment frame. `Clone` shares the frame, it does not
/// copy the bindings.
#[derive(Clone)]
pub struct Environment {
    frame: Rc<RefCell<Frame>>,
}

impl Default for Environment {
    fn default() -> Self {
        Environment::new()
    }
}

impl Environment {
    /// Create a root environment with no parent
    pub fn new() -> Self {
        Environment {
            frame: Rc::new(RefCell::new(Frame {
                bindings: HashMap::new(),
                parent: None,
            })),
        }
    }

    /// Create an empty child frame whose parent is this environment
    pub fn child(&self) -> Self {
        Environment {
            frame: Rc::new(RefCell::new(Frame {
                bindings: HashMap::new(),
                parent: Some(self.clone()),
            })),
        }
    }

    /// Look a symbol up through the frame chain, innermost first.
    /// Returns a clone of the bound value.
    pub fn lookup(&self, name: &str) -> Result<Value, LispError> {
        let frame = self.frame.borrow();
        if let Some(value) = frame.bindings.get(name) {
            return Ok(value.clone());
        }
        match &frame.parent {
            Some(parent) => parent.lookup(name),
            None => Err(LispError::UnboundSymbol(name.to_owned())),
        }
    }

    /// Bind a name in this frame, shadowing any outer binding
    pub fn define_local(&self, name: String, value: Value) {
        self.frame.borrow_mut().bindings.insert(name, value);
    }

    /// Bind a name in the root frame, visible from every scope
    pub fn define_global(&self, name: String, value: Value) {
        let parent = self.frame.borrow().parent.clone();
        match parent {
            Some(root_ward) => root_ward.define_global(name, value),
            None => self.define_local(name, value),
        }
    }

    /// Bind a native function under its own name
    pub fn register_builtin(&self, builtin: Builtin) {
        self.define_local(builtin.name.to_owned(), Value::Builtin(builtin));
    }

    /// Bind a constant value (used for `True` and `False`)
    pub fn register_constant(&self, name: &str, value: Value) {
        self.define_local(name.to_owned(), value);
    }

    /// All names bound in this environment and its parents, sorted and
    /// deduplicated. Shadowed names appear once.
    pub fn bound_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        names.sort();
        names.dedup();
        names
    }

    fn collect_names(&self, names: &mut Vec<String>) {
        let frame = self.frame.borrow();
        names.extend(frame.bindings.keys().cloned());
        if let Some(parent) = &frame.parent {
            parent.collect_names(names);
        }
    }
}
