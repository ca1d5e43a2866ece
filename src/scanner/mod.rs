//! The Velox scanner: built from the `automata` kit via [`ScannerBuilder`],
//! driving the maximal-munch loop in [`Scanner`], with [`MementoSource`]
//! sitting on top to give the parser cheap backtracking.

mod builder;
mod charset;
mod command;
mod memento;
mod scanner;
mod tokens;

pub use builder::{CompiledScanner, ScannerBuilder, ScannerSpec};
pub use charset::CharSet;
pub use command::{Command, ScanContext, ScanMode};
pub use memento::{Memento, MementoSource};
pub use scanner::Scanner;
pub use tokens::{Payload, Position, Token, TokenKind};
