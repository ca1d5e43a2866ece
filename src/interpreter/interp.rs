//! Component K: the tree-walking interpreter.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::{trace, warn as trace_warn};

use crate::ast::{Node, NodeKind};
use crate::errors::{RuntimeError, VeloxError};
use crate::interpreter::hooks::install_standard_library;
use crate::interpreter::import::{FileImporter, Importer, NoImporter};
use crate::language::velox_scanner;
use crate::parser::Parser;
use crate::scope::Scope;
use crate::source::Source;
use crate::value::{ClassData, FunctionData, HookData, ObjectData, Value};

/// What a statement hands back to its enclosing block: either it fell
/// through normally, or it is carrying a control-flow signal that must
/// propagate past intervening blocks (`return`, `break`, `continue`).
enum Signal {
    Normal,
    Return(Value),
    Break,
    Continue,
}

#[derive(Clone, Copy)]
enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

/// Where an assignment, compound-assignment or `++`/`--` writes: resolved
/// once so the target expression's side effects (evaluating the object of
/// a member access, say) happen exactly once even though the operation
/// needs both a read and a write.
enum Place {
    Var(Scope, String),
    Attr(Rc<RefCell<ObjectData>>, String),
    Elem(Rc<RefCell<Vec<Value>>>, usize),
}

/// Aggregate configuration for [`Interpreter::new`]: the entry point for
/// `import` resolution, whether to install the standard hook library, and
/// the print/warn host sinks (§6 "Print/warn sinks" — defaults are no-ops
/// beyond mirroring `warn` to a `tracing::warn!` event).
pub struct VeloxConfig {
    pub install_builtins: bool,
    pub import_search_paths: Vec<PathBuf>,
    pub print_sink: Box<dyn Fn(&str)>,
    pub warn_sink: Box<dyn Fn(&str)>,
}

impl Default for VeloxConfig {
    fn default() -> Self {
        Self {
            install_builtins: true,
            import_search_paths: Vec::new(),
            print_sink: Box::new(|s| println!("{s}")),
            warn_sink: Box::new(|_| {}),
        }
    }
}

pub struct Interpreter {
    global: Scope,
    importer: Box<dyn Importer>,
    origin: Option<PathBuf>,
    print_sink: Box<dyn Fn(&str)>,
    warn_sink: Box<dyn Fn(&str)>,
}

impl Interpreter {
    pub fn new(config: VeloxConfig) -> Self {
        let global = Scope::new_global();
        if config.install_builtins {
            install_standard_library(&global);
        }
        let importer: Box<dyn Importer> = if config.import_search_paths.is_empty() {
            Box::new(NoImporter)
        } else {
            Box::new(FileImporter::new(config.import_search_paths))
        };
        Self {
            global,
            importer,
            origin: None,
            print_sink: config.print_sink,
            warn_sink: config.warn_sink,
        }
    }

    /// Installs a custom importer, overriding the one built from
    /// [`VeloxConfig::import_search_paths`].
    pub fn with_importer(mut self, importer: impl Importer + 'static) -> Self {
        self.importer = Box::new(importer);
        self
    }

    pub fn run_source(&mut self, text: &str) -> Result<(), VeloxError> {
        let compiled = velox_scanner();
        let source = Source::from_text(compiled, text)?;
        let program = Parser::new(source).parse()?;
        self.run(&program)?;
        Ok(())
    }

    pub fn run_file(&mut self, path: &Path) -> Result<(), VeloxError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| RuntimeError::new(format!("could not read '{}': {e}", path.display())))?;
        self.origin = Some(path.to_path_buf());
        self.run_source(&text)
    }

    pub fn run(&mut self, program: &Node) -> Result<(), RuntimeError> {
        let global = self.global.clone();
        self.exec_block_in(program, &global)?;
        Ok(())
    }

    fn warn(&self, message: &str) {
        (self.warn_sink)(message);
        trace_warn!("{message}");
    }

    // ---- statement execution -------------------------------------------------

    fn hoist(&mut self, block: &Node, scope: &Scope) -> Result<(), RuntimeError> {
        for child in &block.children {
            match child.kind {
                NodeKind::FunctionDecl => {
                    let func = self.make_function(child, scope);
                    scope.declare_local(child.string().to_string(), Value::Function(func));
                }
                NodeKind::ClassDecl => {
                    let class = self.make_class(child, scope);
                    scope.declare_local(child.string().to_string(), Value::Class(class));
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn make_function(&self, decl: &Node, scope: &Scope) -> Rc<FunctionData> {
        let params = decl.child(0).children.iter().map(|p| p.string().to_string()).collect();
        let body = Rc::new(decl.child(1).clone());
        Rc::new(FunctionData {
            name: Some(decl.string().to_string()),
            params,
            body,
            closure: scope.clone(),
        })
    }

    fn make_class(&self, decl: &Node, scope: &Scope) -> Rc<ClassData> {
        let name = decl.string().to_string();
        let mut field_names = Vec::new();
        let mut methods = HashMap::new();
        for member in &decl.children {
            match member.kind {
                NodeKind::Field => field_names.push(member.string().to_string()),
                NodeKind::Method => {
                    methods.insert(member.string().to_string(), self.make_function(member, scope));
                }
                _ => {}
            }
        }
        Rc::new(ClassData { name, field_names, methods })
    }

    fn exec_block_in(&mut self, block: &Node, scope: &Scope) -> Result<Signal, RuntimeError> {
        self.hoist(block, scope)?;
        for stmt in &block.children {
            match self.exec_stmt(stmt, scope) {
                Ok(Signal::Normal) => continue,
                Ok(other) => return Ok(other),
                Err(e) => return Err(e.or_line(stmt.line)),
            }
        }
        Ok(Signal::Normal)
    }

    fn exec_stmt(&mut self, node: &Node, scope: &Scope) -> Result<Signal, RuntimeError> {
        match node.kind {
            NodeKind::Block => {
                let inner = scope.child_block();
                self.exec_block_in(node, &inner)
            }
            NodeKind::FunctionDecl | NodeKind::ClassDecl => Ok(Signal::Normal),
            NodeKind::VarDecl => {
                for entry in &node.children {
                    let value = if entry.children.is_empty() {
                        Value::Undefined
                    } else {
                        self.eval_expr(entry.child(0), scope)?
                    };
                    self.global.declare_local(entry.string().to_string(), value);
                }
                Ok(Signal::Normal)
            }
            NodeKind::If => {
                let cond = self.eval_expr(node.child(0), scope)?;
                if self.expect_bool(&cond, node.line)? {
                    self.exec_stmt(node.child(1), scope)
                } else if node.children.len() > 2 {
                    self.exec_stmt(node.child(2), scope)
                } else {
                    Ok(Signal::Normal)
                }
            }
            NodeKind::While => {
                loop {
                    let cond = self.eval_expr(node.child(0), scope)?;
                    if !self.expect_bool(&cond, node.line)? {
                        break;
                    }
                    match self.exec_stmt(node.child(1), scope)? {
                        Signal::Break => break,
                        Signal::Return(v) => return Ok(Signal::Return(v)),
                        Signal::Normal | Signal::Continue => {}
                    }
                }
                Ok(Signal::Normal)
            }
            NodeKind::Do => {
                loop {
                    match self.exec_stmt(node.child(0), scope)? {
                        Signal::Break => break,
                        Signal::Return(v) => return Ok(Signal::Return(v)),
                        Signal::Normal | Signal::Continue => {}
                    }
                    let cond = self.eval_expr(node.child(1), scope)?;
                    if !self.expect_bool(&cond, node.line)? {
                        break;
                    }
                }
                Ok(Signal::Normal)
            }
            NodeKind::For => {
                let for_scope = scope.child_block();
                self.exec_stmt(node.child(0), &for_scope)?;
                loop {
                    let cond = self.eval_expr(node.child(1), &for_scope)?;
                    if !self.expect_bool(&cond, node.line)? {
                        break;
                    }
                    match self.exec_stmt(node.child(3), &for_scope)? {
                        Signal::Break => break,
                        Signal::Return(v) => return Ok(Signal::Return(v)),
                        Signal::Normal | Signal::Continue => {}
                    }
                    let step = node.child(2);
                    if step.kind != NodeKind::Block {
                        self.eval_expr(step, &for_scope)?;
                    }
                }
                Ok(Signal::Normal)
            }
            NodeKind::Return => {
                let value = if node.children.is_empty() {
                    Value::Undefined
                } else {
                    self.eval_expr(node.child(0), scope)?
                };
                Ok(Signal::Return(value))
            }
            NodeKind::Break => Ok(Signal::Break),
            NodeKind::Continue => Ok(Signal::Continue),
            NodeKind::Print => {
                let value = self.eval_expr(node.child(0), scope)?;
                let text = self.stringify(&value)?;
                (self.print_sink)(&text);
                Ok(Signal::Normal)
            }
            NodeKind::Import => {
                let filename = node.string().to_string();
                let program = self
                    .importer
                    .resolve(&filename, self.origin.as_deref())
                    .map_err(|e| e.or_line(node.line))?
                    .ok_or_else(|| RuntimeError::at(format!("import failed: '{filename}' not found"), node.line))?;
                self.exec_block_in(&program, scope)
            }
            NodeKind::ExprStmt => {
                self.eval_expr(node.child(0), scope)?;
                Ok(Signal::Normal)
            }
            other => Err(RuntimeError::at(format!("not a statement: {other:?}"), node.line)),
        }
    }

    fn expect_bool(&self, value: &Value, line: usize) -> Result<bool, RuntimeError> {
        match value.deref() {
            Value::Bool(b) => Ok(b),
            other => Err(RuntimeError::at(
                format!("condition must be a bool, found {}", other.type_name()),
                line,
            )),
        }
    }

    // ---- expression evaluation ------------------------------------------------

    fn eval_expr(&mut self, node: &Node, scope: &Scope) -> Result<Value, RuntimeError> {
        match node.kind {
            NodeKind::IntLit => Ok(Value::Int(node.int_value.unwrap_or_default())),
            NodeKind::RealLit => Ok(Value::Real(node.real_value.unwrap_or_default())),
            NodeKind::StringLit => Ok(Value::string(node.string())),
            NodeKind::BoolLit => Ok(Value::Bool(node.int_value == Some(1))),
            NodeKind::Undefined => Ok(Value::Undefined),
            NodeKind::Ident => {
                let name = node.string();
                if let Some(value) = scope.find(name) {
                    if !scope.has_local(name) {
                        self.warn(&format!("'{name}' resolved from an outer scope"));
                    }
                    Ok(value)
                } else {
                    scope.declare_local(name.to_string(), Value::Undefined);
                    Ok(Value::Undefined)
                }
            }
            NodeKind::Member => {
                let object = self.eval_expr(node.child(0), scope)?.deref();
                let name = node.string();
                match object {
                    Value::Array(items) if name == "length" => Ok(Value::Int(items.borrow().len() as i64)),
                    Value::Array(_) => Err(RuntimeError::at(format!("arrays have no attribute '{name}'"), node.line)),
                    Value::Object(obj) => {
                        let existing = obj.borrow().attributes.get(name).cloned();
                        match existing {
                            Some(v) => Ok(v),
                            None => {
                                obj.borrow_mut().attributes.insert(name.to_string(), Value::Undefined);
                                Ok(Value::Undefined)
                            }
                        }
                    }
                    other => Err(RuntimeError::at(format!("cannot access field on {}", other.type_name()), node.line)),
                }
            }
            NodeKind::Index => {
                let array = self.eval_expr(node.child(0), scope)?.deref();
                let index_value = self.eval_expr(node.child(1), scope)?;
                let index = index_value
                    .as_int()
                    .ok_or_else(|| RuntimeError::at("array index must be numeric", node.line))?;
                match array {
                    Value::Array(items) => {
                        let items = items.borrow();
                        if index < 0 || index as usize >= items.len() {
                            Err(RuntimeError::at("array index out of bounds", node.line))
                        } else {
                            Ok(items[index as usize].clone())
                        }
                    }
                    other => Err(RuntimeError::at(format!("cannot index into {}", other.type_name()), node.line)),
                }
            }
            NodeKind::ArrayLit => {
                let mut items = Vec::with_capacity(node.children.len());
                for child in &node.children {
                    items.push(self.eval_expr(child, scope)?);
                }
                Ok(Value::new_array(items))
            }
            NodeKind::FunctionExpr => {
                let params = node.child(0).children.iter().map(|p| p.string().to_string()).collect();
                let body = Rc::new(node.child(1).clone());
                Ok(Value::Function(Rc::new(FunctionData {
                    name: None,
                    params,
                    body,
                    closure: scope.clone(),
                })))
            }
            NodeKind::New => self.eval_new(node, scope),
            NodeKind::Call => self.eval_call(node, scope),
            NodeKind::Assign => {
                let place = self.resolve_place(node.child(0), scope)?;
                let value = self.eval_expr(node.child(1), scope)?.deref();
                self.place_set(&place, value.clone(), node.line)?;
                Ok(value)
            }
            NodeKind::AssignAdd | NodeKind::AssignSub | NodeKind::AssignMul | NodeKind::AssignDiv | NodeKind::AssignMod => {
                let op = match node.kind {
                    NodeKind::AssignAdd => BinOp::Add,
                    NodeKind::AssignSub => BinOp::Sub,
                    NodeKind::AssignMul => BinOp::Mul,
                    NodeKind::AssignDiv => BinOp::Div,
                    _ => BinOp::Mod,
                };
                let place = self.resolve_place(node.child(0), scope)?;
                let current = self.place_get(&place, node.line)?;
                let rhs = self.eval_expr(node.child(1), scope)?;
                let result = self.apply_binary(op, &current, &rhs, node.line)?;
                self.place_set(&place, result.clone(), node.line)?;
                Ok(result)
            }
            NodeKind::Or => {
                let left = self.eval_expr(node.child(0), scope)?;
                if left.is_truthy() {
                    Ok(left)
                } else {
                    self.eval_expr(node.child(1), scope)
                }
            }
            NodeKind::And => {
                let left = self.eval_expr(node.child(0), scope)?;
                if !left.is_truthy() {
                    Ok(left)
                } else {
                    self.eval_expr(node.child(1), scope)
                }
            }
            NodeKind::Eq | NodeKind::Ne => {
                let left = self.eval_expr(node.child(0), scope)?;
                let right = self.eval_expr(node.child(1), scope)?;
                let equal = self.values_equal(&left, &right);
                Ok(Value::Bool(if node.kind == NodeKind::Eq { equal } else { !equal }))
            }
            NodeKind::Lt | NodeKind::Le | NodeKind::Gt | NodeKind::Ge => {
                let left = self.eval_expr(node.child(0), scope)?;
                let right = self.eval_expr(node.child(1), scope)?;
                self.compare(node.kind, &left, &right, node.line)
            }
            NodeKind::Add | NodeKind::Sub | NodeKind::Mul | NodeKind::Div | NodeKind::Mod => {
                let op = match node.kind {
                    NodeKind::Add => BinOp::Add,
                    NodeKind::Sub => BinOp::Sub,
                    NodeKind::Mul => BinOp::Mul,
                    NodeKind::Div => BinOp::Div,
                    _ => BinOp::Mod,
                };
                let left = self.eval_expr(node.child(0), scope)?;
                let right = self.eval_expr(node.child(1), scope)?;
                self.apply_binary(op, &left, &right, node.line)
            }
            NodeKind::Not => {
                let value = self.eval_expr(node.child(0), scope)?;
                Ok(Value::Bool(!value.is_truthy()))
            }
            NodeKind::Neg => {
                let value = self.eval_expr(node.child(0), scope)?.deref();
                if value.is_real() {
                    Ok(Value::Real(-value.as_real().unwrap()))
                } else if value.is_numeric() {
                    Ok(Value::Int(-value.as_int().unwrap()))
                } else {
                    Err(RuntimeError::at(format!("cannot negate {}", value.type_name()), node.line))
                }
            }
            NodeKind::PreInc | NodeKind::PreDec | NodeKind::PostInc | NodeKind::PostDec => {
                let place = self.resolve_place(node.child(0), scope)?;
                let current = self.place_get(&place, node.line)?.deref();
                let delta: i64 = if matches!(node.kind, NodeKind::PreInc | NodeKind::PostInc) { 1 } else { -1 };
                let updated = match current {
                    Value::Int(n) => Value::Int(n + delta),
                    Value::Real(r) => Value::Real(r + delta as f64),
                    other => {
                        return Err(RuntimeError::at(
                            format!("cannot increment/decrement {}", other.type_name()),
                            node.line,
                        ));
                    }
                };
                self.place_set(&place, updated.clone(), node.line)?;
                Ok(if matches!(node.kind, NodeKind::PreInc | NodeKind::PreDec) {
                    updated
                } else {
                    current
                })
            }
            other => Err(RuntimeError::at(format!("not an expression: {other:?}"), node.line)),
        }
    }

    fn eval_call(&mut self, node: &Node, scope: &Scope) -> Result<Value, RuntimeError> {
        let callee = node.child(0);
        let args_node = node.child(1);
        let mut args = Vec::with_capacity(args_node.children.len());
        for arg in &args_node.children {
            args.push(self.eval_expr(arg, scope)?);
        }

        if callee.kind == NodeKind::Member {
            let receiver = self.eval_expr(callee.child(0), scope)?.deref();
            let name = callee.string();
            match &receiver {
                Value::Object(obj) => {
                    let method = obj
                        .borrow()
                        .attributes
                        .get(name)
                        .cloned()
                        .or_else(|| obj.borrow().class.methods.get(name).cloned().map(Value::Function));
                    match method {
                        Some(Value::Function(f)) => self.call_function(&f, args, Some(receiver.clone()), node.line),
                        Some(Value::Hook(h)) => self.call_hook(&h, args, node.line),
                        Some(other) => Err(RuntimeError::at(format!("'{name}' is not callable ({})", other.type_name()), node.line)),
                        None => Err(RuntimeError::at(format!("unknown method '{name}'"), node.line)),
                    }
                }
                other => Err(RuntimeError::at(format!("cannot call a method on {}", other.type_name()), node.line)),
            }
        } else {
            let callee_value = self.eval_expr(callee, scope)?.deref();
            match callee_value {
                Value::Function(f) => self.call_function(&f, args, None, node.line),
                Value::Hook(h) => self.call_hook(&h, args, node.line),
                other => Err(RuntimeError::at(format!("{} is not callable", other.type_name()), node.line)),
            }
        }
    }

    fn eval_new(&mut self, node: &Node, scope: &Scope) -> Result<Value, RuntimeError> {
        let name = node.string();
        let class = match scope.find(name) {
            Some(v) => match v.deref() {
                Value::Class(c) => c,
                other => return Err(RuntimeError::at(format!("'{name}' is not a class ({})", other.type_name()), node.line)),
            },
            None => return Err(RuntimeError::at(format!("undefined class '{name}'"), node.line)),
        };
        let mut attributes = HashMap::new();
        for field in &class.field_names {
            attributes.insert(field.clone(), Value::Undefined);
        }
        let object = Rc::new(RefCell::new(ObjectData { class: class.clone(), attributes }));
        let object_value = Value::Object(object);

        let args_node = node.child(0);
        let mut args = Vec::with_capacity(args_node.children.len());
        for arg in &args_node.children {
            args.push(self.eval_expr(arg, scope)?);
        }
        if let Some(ctor) = class.constructor() {
            self.call_function(ctor, args, Some(object_value.clone()), node.line)?;
        }
        Ok(object_value)
    }

    fn call_function(&mut self, f: &Rc<FunctionData>, args: Vec<Value>, this: Option<Value>, line: usize) -> Result<Value, RuntimeError> {
        trace!(name = ?f.name, "calling function");
        let call_scope = f.closure.child_function();
        if let Some(this_value) = this {
            call_scope.declare_local("this", this_value);
        }
        for (index, param) in f.params.iter().enumerate() {
            call_scope.declare_local(param.clone(), args.get(index).cloned().unwrap_or(Value::Undefined));
        }
        match self.exec_block_in(&f.body, &call_scope).map_err(|e| e.or_line(line))? {
            Signal::Return(value) => Ok(value),
            _ => Ok(Value::Undefined),
        }
    }

    fn call_hook(&mut self, h: &Rc<HookData>, args: Vec<Value>, line: usize) -> Result<Value, RuntimeError> {
        if let Some(arity) = h.arity {
            if args.len() != arity {
                return Err(RuntimeError::at(
                    format!("hook '{}' expects {} argument(s), found {}", h.name, arity, args.len()),
                    line,
                ));
            }
        }
        (h.func)(&args).map_err(|e| e.or_line(line))
    }

    // ---- assignment targets ---------------------------------------------------

    fn resolve_place(&mut self, node: &Node, scope: &Scope) -> Result<Place, RuntimeError> {
        match node.kind {
            NodeKind::Ident => Ok(Place::Var(scope.clone(), node.string().to_string())),
            NodeKind::Member => {
                let object = self.eval_expr(node.child(0), scope)?.deref();
                match object {
                    Value::Object(obj) => Ok(Place::Attr(obj, node.string().to_string())),
                    other => Err(RuntimeError::at(format!("cannot assign a field on {}", other.type_name()), node.line)),
                }
            }
            NodeKind::Index => {
                let array = self.eval_expr(node.child(0), scope)?.deref();
                let index_value = self.eval_expr(node.child(1), scope)?;
                let index = index_value
                    .as_int()
                    .ok_or_else(|| RuntimeError::at("array index must be numeric", node.line))?;
                if index < 0 {
                    return Err(RuntimeError::at("array index out of bounds", node.line));
                }
                match array {
                    Value::Array(items) => Ok(Place::Elem(items, index as usize)),
                    other => Err(RuntimeError::at(format!("cannot index into {}", other.type_name()), node.line)),
                }
            }
            _ => Err(RuntimeError::at("invalid assignment target", node.line)),
        }
    }

    fn place_get(&self, place: &Place, line: usize) -> Result<Value, RuntimeError> {
        match place {
            Place::Var(scope, name) => Ok(scope.find(name).unwrap_or(Value::Undefined)),
            Place::Attr(obj, name) => Ok(obj.borrow().attributes.get(name).cloned().unwrap_or(Value::Undefined)),
            Place::Elem(items, index) => items
                .borrow()
                .get(*index)
                .cloned()
                .ok_or_else(|| RuntimeError::at("array index out of bounds", line)),
        }
    }

    fn place_set(&self, place: &Place, value: Value, line: usize) -> Result<(), RuntimeError> {
        match place {
            Place::Var(scope, name) => {
                scope.put(name.clone(), value);
                Ok(())
            }
            Place::Attr(obj, name) => {
                obj.borrow_mut().attributes.insert(name.clone(), value);
                Ok(())
            }
            Place::Elem(items, index) => {
                let mut items = items.borrow_mut();
                if *index == items.len() {
                    items.push(value);
                    Ok(())
                } else if *index < items.len() {
                    items[*index] = value;
                    Ok(())
                } else {
                    Err(RuntimeError::at("array index out of bounds", line))
                }
            }
        }
    }

    // ---- operators -------------------------------------------------------------

    fn apply_binary(&mut self, op: BinOp, left: &Value, right: &Value, line: usize) -> Result<Value, RuntimeError> {
        let left = left.deref();
        let right = right.deref();

        if matches!(op, BinOp::Add) {
            if matches!(left, Value::String(_)) || matches!(right, Value::String(_)) {
                let left_text = self.stringify(&left)?;
                let right_text = self.stringify(&right)?;
                return Ok(Value::string(format!("{left_text}{right_text}")));
            }
            if let Value::Array(items) = &left {
                items.borrow_mut().push(right.clone());
                return Ok(Value::Array(items.clone()));
            }
        }

        if !left.is_numeric() || !right.is_numeric() {
            return Err(RuntimeError::at(
                format!("operator requires numeric operands, found {} and {}", left.type_name(), right.type_name()),
                line,
            ));
        }

        if left.is_real() || right.is_real() {
            let a = left.as_real().unwrap();
            let b = right.as_real().unwrap();
            let result = match op {
                BinOp::Add => a + b,
                BinOp::Sub => a - b,
                BinOp::Mul => a * b,
                BinOp::Div => {
                    if b == 0.0 {
                        return Err(RuntimeError::at("division by zero", line));
                    }
                    a / b
                }
                BinOp::Mod => a % b,
            };
            Ok(Value::Real(result))
        } else {
            let a = left.as_int().unwrap();
            let b = right.as_int().unwrap();
            let result = match op {
                BinOp::Add => a.wrapping_add(b),
                BinOp::Sub => a.wrapping_sub(b),
                BinOp::Mul => a.wrapping_mul(b),
                BinOp::Div => {
                    if b == 0 {
                        return Err(RuntimeError::at("division by zero", line));
                    }
                    a / b
                }
                BinOp::Mod => {
                    if b == 0 {
                        return Err(RuntimeError::at("division by zero", line));
                    }
                    a % b
                }
            };
            Ok(Value::Int(result))
        }
    }

    fn values_equal(&self, left: &Value, right: &Value) -> bool {
        let left = left.deref();
        let right = right.deref();
        match (&left, &right) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (a, b) if a.is_numeric() && b.is_numeric() => a.as_real() == b.as_real(),
            (Value::Array(a), Value::Array(b)) => {
                let (a, b) = (a.borrow(), b.borrow());
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| self.values_equal(x, y))
            }
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Hook(a), Value::Hook(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    fn compare(&self, kind: NodeKind, left: &Value, right: &Value, line: usize) -> Result<Value, RuntimeError> {
        let left = left.deref();
        let right = right.deref();
        if !left.is_numeric() || !right.is_numeric() {
            return Err(RuntimeError::at("relational operator requires numeric operands", line));
        }
        let a = left.as_real().unwrap();
        let b = right.as_real().unwrap();
        let result = match kind {
            NodeKind::Lt => a < b,
            NodeKind::Le => a <= b,
            NodeKind::Gt => a > b,
            NodeKind::Ge => a >= b,
            _ => unreachable!("compare only called for relational node kinds"),
        };
        Ok(Value::Bool(result))
    }

    /// Stringification used by `print` and by `+` with a string operand:
    /// int/real decimal, bool `true`/`false`, undefined `UNDEFINED`,
    /// function/hook `func:<name>`/`hook:<name>`, array recursive, object
    /// via its `toString` attribute if resolvable, else `OBJ`.
    fn stringify(&mut self, value: &Value) -> Result<String, RuntimeError> {
        let value = value.deref();
        let text = match value {
            Value::Undefined => "UNDEFINED".to_string(),
            Value::Int(n) => n.to_string(),
            Value::Real(r) => r.to_string(),
            Value::Bool(b) => if b { "true" } else { "false" }.to_string(),
            Value::String(s) => s.to_string(),
            Value::Function(f) => format!("func:{}", f.name.as_deref().unwrap_or("<anonymous>")),
            Value::Hook(h) => format!("hook:{}", h.name),
            Value::Class(c) => format!("func:{}", c.name),
            Value::Array(items) => {
                let mut parts = Vec::with_capacity(items.borrow().len());
                let snapshot: Vec<Value> = items.borrow().clone();
                for item in &snapshot {
                    parts.push(self.stringify(item)?);
                }
                format!("[{}]", parts.join(", "))
            }
            Value::Object(obj) => {
                let to_string_attr = obj.borrow().attributes.get("toString").cloned();
                match to_string_attr {
                    Some(Value::Function(f)) => {
                        let result = self.call_function(&f, vec![], Some(Value::Object(obj.clone())), 0)?;
                        self.stringify(&result)?
                    }
                    Some(Value::Hook(h)) => {
                        let result = self.call_hook(&h, vec![], 0)?;
                        self.stringify(&result)?
                    }
                    _ => "OBJ".to_string(),
                }
            }
            Value::Reference(_) => unreachable!("deref() never returns Reference"),
        };
        Ok(text)
    }
}
