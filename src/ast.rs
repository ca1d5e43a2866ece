//! Component H: the parse tree. A single generic [`Node`] type tagged by
//! [`NodeKind`], rather than one Rust type per construct — this mirrors the
//! original AST's typeless node design (a kind enum plus an ordered child
//! list and an optional literal payload) and keeps the recursive-descent
//! parser in `parser.rs` uniform: every production builds a `Node` and
//! attaches it as a child of its caller.

/// Every shape of node the parser produces. Statement kinds and expression
/// kinds share one enum since both live in the same tree and the
/// interpreter dispatches on it directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Program,
    Block,

    VarDecl,
    FunctionDecl,
    Param,
    ClassDecl,
    Field,
    Method,

    If,
    While,
    Do,
    For,
    Return,
    Break,
    Continue,
    Print,
    Import,
    ExprStmt,

    Assign,
    AssignAdd,
    AssignSub,
    AssignMul,
    AssignDiv,
    AssignMod,

    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,

    Add,
    Sub,
    Mul,
    Div,
    Mod,

    Not,
    Neg,
    PreInc,
    PreDec,
    PostInc,
    PostDec,

    Call,
    New,
    Member,
    Index,
    Arguments,
    This,

    Ident,
    IntLit,
    RealLit,
    StringLit,
    BoolLit,
    Undefined,

    ArrayLit,
    FunctionExpr,
}

/// A generic AST node: a kind tag, an optional literal payload (at most one
/// of `string_value`/`int_value`/`real_value` populated, depending on
/// `kind`), an ordered child list, and the source line it originated from
/// (used to attach a location to runtime errors raised while evaluating it).
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub line: usize,
    pub string_value: Option<String>,
    pub int_value: Option<i64>,
    pub real_value: Option<f64>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind, line: usize) -> Self {
        Self {
            kind,
            line,
            string_value: None,
            int_value: None,
            real_value: None,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_string(mut self, value: impl Into<String>) -> Self {
        self.string_value = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_int(mut self, value: i64) -> Self {
        self.int_value = Some(value);
        self
    }

    #[must_use]
    pub fn with_real(mut self, value: f64) -> Self {
        self.real_value = Some(value);
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn child(&self, index: usize) -> &Node {
        &self.children[index]
    }

    pub fn string(&self) -> &str {
        self.string_value.as_deref().unwrap_or_default()
    }
}
