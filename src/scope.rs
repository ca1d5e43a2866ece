//! Component J: the scope chain.
//!
//! Every block introduces a new frame; function calls additionally mark
//! their frame as a function boundary so closures know where lexical
//! capture should start. `has_local`/`find`/`put` mirror the three-method
//! shape of the original scope type: check the current frame only, walk the
//! whole chain, or create-or-update wherever a binding already lives.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::value::Value;

struct ScopeFrame {
    parent: Option<Scope>,
    is_function_boundary: bool,
    bindings: HashMap<String, Value>,
}

/// A reference-counted handle to one frame in the scope chain. Cloning a
/// `Scope` is cheap and shares the same frame — this is what lets a closure
/// capture "the scope as it will continue to be mutated", not a snapshot.
///
/// Storing a function value in the very frame it closed over creates a
/// reference cycle (frame -> bindings -> function -> closure -> same
/// frame). That is what makes a named function able to call itself
/// recursively through ordinary scope lookup, and the crate accepts the
/// resulting leak rather than break recursion: there is no garbage
/// collector here, scripts run to completion and the whole interpreter is
/// dropped at once, so the cycle never outlives the process using it.
#[derive(Clone)]
pub struct Scope(Rc<RefCell<ScopeFrame>>);

impl Scope {
    pub fn new_global() -> Self {
        Self(Rc::new(RefCell::new(ScopeFrame {
            parent: None,
            is_function_boundary: true,
            bindings: HashMap::new(),
        })))
    }

    pub fn child_block(&self) -> Self {
        Self(Rc::new(RefCell::new(ScopeFrame {
            parent: Some(self.clone()),
            is_function_boundary: false,
            bindings: HashMap::new(),
        })))
    }

    pub fn child_function(&self) -> Self {
        Self(Rc::new(RefCell::new(ScopeFrame {
            parent: Some(self.clone()),
            is_function_boundary: true,
            bindings: HashMap::new(),
        })))
    }

    /// Whether `name` is bound somewhere in the current function's scope —
    /// this frame or any enclosing block frame, stopping at (and including)
    /// the nearest function-boundary frame. A binding that can only be
    /// reached by crossing a function boundary does not count: that's an
    /// outer-scope reference, not a local one.
    pub fn has_local(&self, name: &str) -> bool {
        let frame = self.0.borrow();
        if frame.bindings.contains_key(name) {
            return true;
        }
        if frame.is_function_boundary {
            return false;
        }
        match &frame.parent {
            Some(parent) => parent.has_local(name),
            None => false,
        }
    }

    pub fn find(&self, name: &str) -> Option<Value> {
        let frame = self.0.borrow();
        if let Some(value) = frame.bindings.get(name) {
            return Some(value.clone());
        }
        frame.parent.as_ref().and_then(|p| p.find(name))
    }

    /// Declares `name` in *this* frame, shadowing any outer binding of the
    /// same name for the rest of the frame's lifetime. Used for function
    /// parameters and `global` declarations' first introduction.
    pub fn declare_local(&self, name: impl Into<String>, value: Value) {
        self.0.borrow_mut().bindings.insert(name.into(), value);
    }

    /// Assigns `name`: if it is already bound somewhere in the chain, that
    /// binding is updated in place; otherwise a new local binding is
    /// created in the current frame.
    pub fn put(&self, name: impl Into<String>, value: Value) {
        let name = name.into();
        if self.assign_existing(&name, value.clone()) {
            return;
        }
        self.declare_local(name, value);
    }

    fn assign_existing(&self, name: &str, value: Value) -> bool {
        let target = {
            let mut frame = self.0.borrow_mut();
            if frame.bindings.contains_key(name) {
                frame.bindings.insert(name.to_string(), value.clone());
                return true;
            }
            frame.parent.clone()
        };
        match target {
            Some(parent) => parent.assign_existing(name, value),
            None => false,
        }
    }

    /// Walks up to the nearest function-boundary frame (the frame a new
    /// function call scope should treat as "outermost local"), used when
    /// resolving `global` declarations.
    pub fn is_function_boundary(&self) -> bool {
        self.0.borrow().is_function_boundary
    }

    pub fn parent(&self) -> Option<Scope> {
        self.0.borrow().parent.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_creates_local_binding_when_absent() {
        let scope = Scope::new_global();
        scope.put("x", Value::Int(1));
        assert!(scope.has_local("x"));
        assert_eq!(scope.find("x").unwrap().as_int(), Some(1));
    }

    #[test]
    fn put_updates_outer_binding_in_place() {
        let outer = Scope::new_global();
        outer.declare_local("x", Value::Int(1));
        let inner = outer.child_block();
        inner.put("x", Value::Int(2));
        // "x" lives in the same function scope as `inner` (just an
        // enclosing block), so it still counts as local.
        assert!(inner.has_local("x"));
        assert_eq!(outer.find("x").unwrap().as_int(), Some(2));
    }

    #[test]
    fn has_local_stops_at_a_function_boundary() {
        let outer = Scope::new_global();
        outer.declare_local("x", Value::Int(1));
        let call_scope = outer.child_function();
        let nested_block = call_scope.child_block();
        assert!(!nested_block.has_local("x"));
        assert!(!call_scope.has_local("x"));
    }

    #[test]
    fn declare_local_shadows_outer_binding() {
        let outer = Scope::new_global();
        outer.declare_local("x", Value::Int(1));
        let inner = outer.child_function();
        inner.declare_local("x", Value::Int(99));
        assert_eq!(inner.find("x").unwrap().as_int(), Some(99));
        assert_eq!(outer.find("x").unwrap().as_int(), Some(1));
    }

    #[test]
    fn find_walks_up_to_global() {
        let outer = Scope::new_global();
        outer.declare_local("g", Value::Int(7));
        let inner = outer.child_block().child_block();
        assert_eq!(inner.find("g").unwrap().as_int(), Some(7));
        assert!(inner.find("missing").is_none());
    }
}
