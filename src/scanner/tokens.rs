use std::fmt;

/// Every token kind the Velox scanner produces, including the three
/// internal kinds (`Ignore`, `BlockCommentStart`, `LineCommentStart`) that
/// never reach the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Ident,
    IntLit,
    RealLit,
    StringLit,
    ColorLit,
    True,
    False,
    Undefined,

    If,
    Else,
    While,
    Do,
    For,
    Function,
    Return,
    Print,
    Import,
    Class,
    New,
    Global,
    Break,
    Continue,

    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Not,
    PlusPlus,
    MinusMinus,

    Assign,
    AssignAdd,
    AssignSub,
    AssignMul,
    AssignDiv,
    AssignMod,

    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    AndAnd,
    OrOr,

    Dot,
    Comma,
    Semicolon,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,

    Eos,

    /// Whitespace and comments: matched, then discarded by the scanner.
    Ignore,
    BlockCommentStart,
    LineCommentStart,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A 1-based line/column position plus absolute character offset, per §3
/// ("Positions are 1-based (line, column) plus absolute character offset").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

/// A typed scanner payload: at most one of string/int/real is populated,
/// depending on the token's kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    pub string: Option<String>,
    pub int: Option<i64>,
    pub real: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: Position,
    pub payload: Payload,
}

impl Token {
    pub fn new(kind: TokenKind, pos: Position) -> Self {
        Self {
            kind,
            pos,
            payload: Payload::default(),
        }
    }

    pub fn string_value(&self) -> Option<&str> {
        self.payload.string.as_deref()
    }

    pub fn int_value(&self) -> Option<i64> {
        self.payload.int
    }

    pub fn real_value(&self) -> Option<f64> {
        self.payload.real
    }
}
