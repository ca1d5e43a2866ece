//! Component K: the tree-walking interpreter, plus its standard hook
//! library and import resolver.

mod hooks;
mod import;
mod interp;

pub use import::{FileImporter, Importer, NoImporter};
pub use interp::{Interpreter, VeloxConfig};
