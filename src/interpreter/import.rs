//! The `import "file";` contract: `resolve(filename, originPath) -> AST`,
//! returning `None` for file-not-found per §6 of the design.

use std::path::{Path, PathBuf};

use crate::ast::Node;
use crate::errors::{RuntimeError, VeloxError};
use crate::language::velox_scanner;
use crate::parser::Parser;
use crate::source::Source;

/// A host-provided resolver for `import` statements. The interpreter never
/// constructs an `Importer` itself; a host wires one in through
/// [`VeloxConfig`](crate::interpreter::VeloxConfig).
pub trait Importer {
    fn resolve(&self, filename: &str, origin: Option<&Path>) -> Result<Option<Node>, RuntimeError>;
}

/// Reads the named file from disk, resolving relative to `origin`'s parent
/// directory (the importing script's own path) when one is given, falling
/// back to each of `search_paths` in order.
pub struct FileImporter {
    pub search_paths: Vec<PathBuf>,
}

impl FileImporter {
    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        Self { search_paths }
    }

    fn candidate_paths(&self, filename: &str, origin: Option<&Path>) -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        if let Some(origin) = origin {
            if let Some(dir) = origin.parent() {
                candidates.push(dir.join(filename));
            }
        }
        for base in &self.search_paths {
            candidates.push(base.join(filename));
        }
        candidates.push(PathBuf::from(filename));
        candidates
    }
}

impl Importer for FileImporter {
    fn resolve(&self, filename: &str, origin: Option<&Path>) -> Result<Option<Node>, RuntimeError> {
        let path = self
            .candidate_paths(filename, origin)
            .into_iter()
            .find(|candidate| candidate.is_file());
        let Some(path) = path else {
            return Ok(None);
        };
        let text = std::fs::read_to_string(&path)
            .map_err(|e| RuntimeError::new(format!("could not read '{}': {e}", path.display())))?;
        let compiled = velox_scanner();
        let source = Source::from_text(compiled, &text).map_err(VeloxError::from).map_err(to_runtime_error)?;
        let program = Parser::new(source).parse().map_err(VeloxError::from).map_err(to_runtime_error)?;
        Ok(Some(program))
    }
}

fn to_runtime_error(err: VeloxError) -> RuntimeError {
    match err {
        VeloxError::Runtime(e) => e,
        other => RuntimeError::new(other.to_string()),
    }
}

/// Never resolves anything — the default when a host installs no importer,
/// matching §6: "absence of an importer is a runtime error".
pub struct NoImporter;

impl Importer for NoImporter {
    fn resolve(&self, _filename: &str, _origin: Option<&Path>) -> Result<Option<Node>, RuntimeError> {
        Ok(None)
    }
}
