//! The Velox scripting language toolchain: a reusable table-driven
//! finite-automaton construction kit (`automata`), a scanner built on top
//! of it (`scanner`), a recursive-descent parser producing an AST
//! (`ast`, `parser`), and a tree-walking interpreter with dynamic typing,
//! closures, classes, arrays, imports, and host-callable hook functions
//! (`value`, `scope`, `interpreter`).
//!
//! `language` wires the generic scanner kit into the one concrete Velox
//! grammar the parser assumes; everything upstream of it (`automata`,
//! `scanner`) stays generic and reusable for a different language front-end.

pub mod ast;
pub mod automata;
pub mod errors;
pub mod interpreter;
pub mod language;
pub mod parser;
pub mod scanner;
pub mod scope;
pub mod source;
pub mod value;

pub use errors::VeloxError;
pub use interpreter::{Interpreter, VeloxConfig};
