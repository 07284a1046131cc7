pub mod ast;
pub mod context;
pub mod error;
pub mod json;
pub mod ops;
pub mod parser;
pub mod paths;
pub mod registry;
pub mod scanner;
pub mod tree;

use std::path::Path;

use tracing::debug;

pub use ast::{Expr, ExprType, Literal, Value};
pub use context::{ElementDef, LineDef, ParseContext, Printer};
pub use error::{ConfError, ErrorKind};
pub use tree::Config;

// ── Core API ───────────────────────────────────────────────────────

/// Parses lattice files into [`Config`] objects.
///
/// Each call builds a fresh [`ParseContext`]; the parser itself only carries
/// options shared by every parse it starts, including nested `parse(...)`
/// inclusions.
#[derive(Clone, Default)]
pub struct LatticeParser {
    printer: Option<Printer>,
}

impl LatticeParser {
    pub fn new() -> Self {
        LatticeParser::default()
    }

    /// Where `print(...)` statements write. `None` discards them.
    pub fn set_printer(&mut self, printer: Option<Printer>) {
        self.printer = printer;
    }

    /// Parse a file. Relative paths inside it resolve against the directory
    /// containing it.
    pub fn parse_file(&self, path: &Path) -> Result<Config, ConfError> {
        self.parse_file_at_depth(path, 0)
    }

    pub(crate) fn parse_file_at_depth(&self, path: &Path, depth: usize) -> Result<Config, ConfError> {
        let source = std::fs::read_to_string(path)
            .map_err(|e| ConfError::io(format!("failed to read {}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "parsing file");
        self.parse_in(&source, Some(source_dir(path)), depth)
    }

    /// Parse source text. Relative paths resolve against `dir`, or the
    /// process working directory when `dir` is `None`.
    pub fn parse_str(&self, source: &str, dir: Option<&Path>) -> Result<Config, ConfError> {
        self.parse_in(source, dir, 0)
    }

    fn parse_in(&self, source: &str, dir: Option<&Path>, depth: usize) -> Result<Config, ConfError> {
        let mut ctxt = ParseContext::with_depth(dir, depth)?;
        ctxt.set_printer(self.printer.clone());
        parser::parse(source, &mut ctxt)?;
        Ok(Config::from_context(&ctxt))
    }
}

/// The directory relative paths in the file at `path` resolve against.
pub fn source_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|d| !d.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

/// Parse lattice source with default options, resolving relative paths
/// against `dir` (or the process working directory).
pub fn parse_lattice(source: &str, dir: Option<&Path>) -> Result<Config, ConfError> {
    LatticeParser::new().parse_str(source, dir)
}
