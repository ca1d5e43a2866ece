//! Component I: the dynamically-typed value model.
//!
//! Mirrors the original value representation's split between value types
//! (undefined, int, real, bool, string) that behave as if copied on
//! assignment, and reference types (array, object, function, class, hook)
//! that share identity through an `Rc`. [`Value::Reference`] makes that
//! sharing explicit for the cases that need it (array elements, object
//! attributes, variable slots) and [`Value::deref`] makes following it
//! transparent everywhere else.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::ast::Node;
use crate::errors::RuntimeError;
use crate::scope::Scope;

#[derive(Clone)]
pub enum Value {
    Undefined,
    Int(i64),
    Real(f64),
    Bool(bool),
    String(Rc<str>),
    Array(Rc<RefCell<Vec<Value>>>),
    Object(Rc<RefCell<ObjectData>>),
    Function(Rc<FunctionData>),
    Class(Rc<ClassData>),
    Hook(Rc<HookData>),
    Reference(Rc<RefCell<Value>>),
}

pub struct ObjectData {
    pub class: Rc<ClassData>,
    pub attributes: HashMap<String, Value>,
}

pub struct FunctionData {
    pub name: Option<String>,
    pub params: Vec<String>,
    pub body: Rc<Node>,
    /// The scope active where the function (or closure) was defined. Script
    /// functions declared at the top level capture the global scope;
    /// function expressions capture whatever block scope they were created
    /// in, giving proper lexical closures.
    pub closure: Scope,
}

pub struct ClassData {
    pub name: String,
    pub field_names: Vec<String>,
    pub methods: HashMap<String, Rc<FunctionData>>,
}

impl ClassData {
    /// The constructor is, by convention, the method whose name matches the
    /// class's own name — there is no separate `constructor` keyword.
    pub fn constructor(&self) -> Option<&Rc<FunctionData>> {
        self.methods.get(&self.name)
    }
}

pub struct HookData {
    pub name: String,
    pub arity: Option<usize>,
    pub func: Box<dyn Fn(&[Value]) -> Result<Value, RuntimeError>>,
}

impl Value {
    pub fn string(s: impl Into<Rc<str>>) -> Self {
        Value::String(s.into())
    }

    pub fn new_array(items: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    pub fn reference(inner: Value) -> Self {
        Value::Reference(Rc::new(RefCell::new(inner)))
    }

    /// Follows a chain of references until it reaches a non-reference
    /// value, cloning it out. Reference-typed values (array/object/
    /// function/class/hook) clone cheaply since cloning only bumps the
    /// `Rc` refcount; scalars clone their data directly, which is
    /// indistinguishable from "the value itself" since they have no
    /// identity to share.
    pub fn deref(&self) -> Value {
        match self {
            Value::Reference(cell) => cell.borrow().deref(),
            other => other.clone(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Int(_) => "int",
            Value::Real(_) => "real",
            Value::Bool(_) => "bool",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
            Value::Class(_) => "class",
            Value::Hook(_) => "hook",
            Value::Reference(cell) => cell.borrow().type_name(),
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self.deref() {
            Value::Undefined => false,
            Value::Bool(b) => b,
            Value::Int(n) => n != 0,
            Value::Real(r) => r != 0.0,
            _ => true,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self.deref() {
            Value::Int(n) => Some(n),
            Value::Real(r) => Some(r as i64),
            Value::Bool(b) => Some(b as i64),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self.deref() {
            Value::Int(n) => Some(n as f64),
            Value::Real(r) => Some(r),
            Value::Bool(b) => Some(if b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// `true` when either operand is real, forcing arithmetic to promote to
    /// `Real` rather than truncate to `Int`.
    pub fn is_numeric(&self) -> bool {
        matches!(self.deref(), Value::Int(_) | Value::Real(_) | Value::Bool(_))
    }

    pub fn is_real(&self) -> bool {
        matches!(self.deref(), Value::Real(_))
    }

    pub fn to_display_string(&self) -> String {
        match self.deref() {
            Value::Undefined => "undefined".to_string(),
            Value::Int(n) => n.to_string(),
            Value::Real(r) => r.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::String(s) => s.to_string(),
            Value::Array(items) => {
                let rendered: Vec<String> =
                    items.borrow().iter().map(Value::to_display_string).collect();
                format!("[{}]", rendered.join(", "))
            }
            Value::Object(obj) => format!("<{} instance>", obj.borrow().class.name),
            Value::Function(f) => match &f.name {
                Some(name) => format!("<function {name}>"),
                None => "<function>".to_string(),
            },
            Value::Class(c) => format!("<class {}>", c.name),
            Value::Hook(h) => format!("<hook {}>", h.name),
            Value::Reference(_) => unreachable!("deref() never returns Reference"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.type_name(), self.to_display_string())
    }
}
