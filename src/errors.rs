//! Error families for the scanner, parser, and interpreter.
//!
//! Scanner and parser failures are fatal for the current compilation and
//! carry a single source line; interpreter failures carry an optional line
//! that the nearest enclosing statement fills in if it arrived unlocated
//! (see [`RuntimeError::or_line`]).

use thiserror::Error;

/// Error raised by the [`scanner`](crate::scanner) while tokenizing input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message} at line {line}")]
pub struct ScanError {
    pub line: usize,
    pub message: String,
}

impl ScanError {
    #[must_use]
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Error raised by the recursive-descent [`parser`](crate::parser).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message} at line {line}")]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}

impl ParseError {
    #[must_use]
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Error raised while evaluating a script.
///
/// The line is `None` when the error is raised deep inside expression
/// evaluation, away from any statement boundary; the interpreter's
/// statement-execution loop fills it in from the current AST node's
/// position (see §7 of the design: "the catching boundary at each
/// statement-level node attaches the node's line number if the exception
/// arrived unlocated").
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct RuntimeError {
    pub message: String,
    pub line: Option<usize>,
}

impl RuntimeError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
        }
    }

    #[must_use]
    pub fn at(message: impl Into<String>, line: usize) -> Self {
        Self {
            message: message.into(),
            line: Some(line),
        }
    }

    /// Fills in the line number if this error has none yet.
    #[must_use]
    pub fn or_line(mut self, line: usize) -> Self {
        if self.line.is_none() {
            self.line = Some(line);
        }
        self
    }
}

/// Errors that can arise while building automata or scanners (component
/// A/B/D construction errors), separate from the per-script error families
/// above since they surface at scanner-*construction* time, not scan time.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AutomatonError {
    #[error("no current state is open; call begin_state first")]
    NoCurrentState,
    #[error("unknown state handle {0}")]
    UnknownState(usize),
    #[error("automaton has no start state")]
    NoStartState,
    #[error("ambiguous transition: state {state} already transitions to {existing} on {symbol:?}, cannot also add {new}")]
    Ambiguous {
        state: usize,
        symbol: String,
        existing: usize,
        new: usize,
    },
}

/// Errors raised while validating a [`ScannerSpec`](crate::scanner::ScannerSpec).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScannerBuildError {
    #[error("required token kind '{0}' was not configured")]
    MissingRequiredKind(&'static str),
    #[error("string delimiter cannot also appear in the string-body character set")]
    DelimiterInBody,
    #[error("duplicate keyword literal '{0}'")]
    DuplicateKeyword(String),
    #[error("keyword literal must not be empty")]
    EmptyKeyword,
    #[error(transparent)]
    Automaton(#[from] AutomatonError),
}

/// Umbrella error covering every stage of building and running a script,
/// analogous to the teacher's `BuildError` aggregating `LexError`/`ParseError`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VeloxError {
    #[error("scan error: {0}")]
    Scan(#[from] ScanError),
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),
    #[error("scanner build error: {0}")]
    ScannerBuild(#[from] ScannerBuildError),
}
