//! Parse context: symbol tables, operation registry and diagnostic state
//! for one top-level or nested parse.
//!
//! The grammar driver calls into the context as it consumes tokens:
//! expression builders (`make_literal`, `apply`, `append_*`) bottom-up, then
//! one table action (`assign`, `add_element`, `add_line`, `command`, `call`)
//! per statement. Any `Err` returned here must abort the parse.

use std::cell::RefCell;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::ast::{Expr, ExprType, Literal};
use crate::error::ConfError;
use crate::ops::builtin_registry;
use crate::registry::Registry;

/// Shared sink for `print(...)` output. Nested parses write to the same sink.
pub type Printer = Rc<RefCell<dyn Write>>;

/// An element declaration: `label: type, key = expr, ...;`
#[derive(Debug, Clone, PartialEq)]
pub struct ElementDef {
    pub etype: String,
    pub properties: IndexMap<String, Expr>,
}

/// A beamline declaration: `label: type = (a, b, ...);`
#[derive(Debug, Clone, PartialEq)]
pub struct LineDef {
    pub etype: String,
    pub names: Vec<String>,
}

pub struct ParseContext {
    vars: IndexMap<String, Expr>,
    elements: IndexMap<String, ElementDef>,
    lines: IndexMap<String, LineDef>,

    registry: Registry,

    last_error: Option<ConfError>,
    last_line: usize,
    printer: Option<Printer>,

    /// Directory relative paths are resolved against.
    cwd: PathBuf,
    /// Number of enclosing `parse(...)` inclusions.
    depth: usize,
}

impl ParseContext {
    /// Create a context rooted at `path` (canonicalized), or at the process
    /// working directory when no path is given.
    pub fn new(path: Option<&Path>) -> Result<Self, ConfError> {
        Self::with_depth(path, 0)
    }

    pub(crate) fn with_depth(path: Option<&Path>, depth: usize) -> Result<Self, ConfError> {
        let cwd = match path {
            Some(p) => std::fs::canonicalize(p).map_err(|e| {
                ConfError::not_found(format!("\"{}\" does not exist: {}", p.display(), e))
            })?,
            None => std::env::current_dir()
                .map_err(|e| ConfError::io(format!("cannot determine working directory: {}", e)))?,
        };

        Ok(ParseContext {
            vars: IndexMap::new(),
            elements: IndexMap::new(),
            lines: IndexMap::new(),
            registry: builtin_registry(),
            last_error: None,
            last_line: 0,
            printer: None,
            cwd,
            depth,
        })
    }

    // ── Diagnostics ─────────────────────────────────────────────────

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn printer(&self) -> Option<&Printer> {
        self.printer.as_ref()
    }

    pub fn set_printer(&mut self, printer: Option<Printer>) {
        self.printer = printer;
    }

    /// Line of the token most recently consumed by the grammar driver.
    pub fn line(&self) -> usize {
        self.last_line
    }

    pub fn set_line(&mut self, line: usize) {
        self.last_line = line;
    }

    pub fn last_error(&self) -> Option<&ConfError> {
        self.last_error.as_ref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Record a failure, annotated with the current line. Only the first
    /// failure is kept; the returned error is the one stored.
    pub fn fail(&mut self, err: ConfError) -> ConfError {
        let err = err.at_line(self.last_line);
        self.last_error.get_or_insert(err).clone()
    }

    // ── Expression builders ─────────────────────────────────────────

    /// Build a node from a literal, resolving name references through the
    /// symbol tables.
    pub fn make_literal(&self, literal: Literal) -> Result<Expr, ConfError> {
        match literal {
            Literal::Number(n) => Ok(Expr::number(n)),
            Literal::Vector(v) => Ok(Expr::vector(v)),
            Literal::String(s) => Ok(Expr::text(s)),
            Literal::Var(name) => self.resolve_name(&name),
            Literal::Element(name) => {
                if self.elements.contains_key(&name) {
                    Ok(Expr::line(vec![name]))
                } else {
                    Err(ConfError::undefined(format!("Element '{}' not defined", name)))
                }
            }
        }
    }

    /// Variables shadow elements, which shadow lines. A line name expands
    /// to a copy of its references.
    fn resolve_name(&self, name: &str) -> Result<Expr, ConfError> {
        if let Some(expr) = self.vars.get(name) {
            Ok(expr.clone())
        } else if self.elements.contains_key(name) {
            Ok(Expr::line(vec![name.to_string()]))
        } else if let Some(line) = self.lines.get(name) {
            Ok(Expr::line(line.names.clone()))
        } else {
            Err(ConfError::undefined(format!(
                "Variable/Element/Line '{}' not defined",
                name
            )))
        }
    }

    /// Apply the operation `name` to `args` via signature dispatch.
    pub fn apply(&self, name: &str, args: Vec<Expr>) -> Result<Expr, ConfError> {
        let op = self.registry.resolve(name, &args)?;
        trace!(op = %op.signature(), "dispatch");
        let value = (op.eval)(self, &args)?;
        Expr::new(op.result, value)
    }

    /// Append one entry of a vector literal.
    pub fn append_vector(&self, vector: &mut Vec<f64>, expr: Expr) -> Result<(), ConfError> {
        if expr.etype() != ExprType::Number {
            return Err(ConfError::syntax(
                format!("vector entries must be numbers, not {}", expr.etype()),
                self.last_line,
            ));
        }
        vector.push(expr.as_number()?);
        Ok(())
    }

    /// Append one entry of a beamline list.
    pub fn append_line_entry(&self, names: &mut Vec<String>, expr: Expr) -> Result<(), ConfError> {
        if expr.etype() != ExprType::Line {
            return Err(ConfError::syntax(
                format!(
                    "beamline entries must be elements or lines, not {}",
                    expr.etype()
                ),
                self.last_line,
            ));
        }
        names.extend_from_slice(expr.as_line()?);
        Ok(())
    }

    // ── Table actions ───────────────────────────────────────────────

    /// Insert or overwrite a variable. Reassignment keeps the original
    /// position in iteration order.
    pub fn assign(&mut self, name: &str, expr: Expr) {
        debug!(name, etype = %expr.etype(), "assign");
        self.vars.insert(name.to_string(), expr);
    }

    pub fn add_element(
        &mut self,
        name: &str,
        etype: &str,
        properties: IndexMap<String, Expr>,
    ) -> Result<(), ConfError> {
        if self.elements.contains_key(name) {
            return Err(ConfError::duplicate_name(format!(
                "Element '{}' already defined",
                name
            )));
        }
        debug!(name, etype, properties = properties.len(), "add element");
        self.elements.insert(
            name.to_string(),
            ElementDef {
                etype: etype.to_string(),
                properties,
            },
        );
        Ok(())
    }

    pub fn add_line(&mut self, name: &str, etype: &str, names: Vec<String>) -> Result<(), ConfError> {
        if self.lines.contains_key(name) {
            return Err(ConfError::duplicate_name(format!(
                "Line '{}' already defined",
                name
            )));
        }
        debug!(name, etype, length = names.len(), "add line");
        self.lines.insert(
            name.to_string(),
            LineDef {
                etype: etype.to_string(),
                names,
            },
        );
        Ok(())
    }

    /// A bare `keyword;` statement. Only `END` is recognised.
    pub fn command(&mut self, keyword: &str) -> Result<(), ConfError> {
        if keyword == "END" {
            return Ok(());
        }
        Err(ConfError::undefined(format!("Undefined command '{}'", keyword)))
    }

    /// A global function call statement `name(expr);`. Only `print` is
    /// defined; it writes to the printer, if any.
    pub fn call(&mut self, name: &str, arg: &Expr) -> Result<(), ConfError> {
        if name != "print" {
            return Err(ConfError::undefined(format!(
                "Undefined global function '{}'",
                name
            )));
        }
        if let Some(printer) = &self.printer {
            writeln!(printer.borrow_mut(), "On line {} : {}", self.last_line, arg)
                .map_err(|e| ConfError::io(format!("print failed: {}", e)))?;
        }
        Ok(())
    }

    // ── Table access ────────────────────────────────────────────────

    pub fn var(&self, name: &str) -> Option<&Expr> {
        self.vars.get(name)
    }

    pub fn element(&self, name: &str) -> Option<&ElementDef> {
        self.elements.get(name)
    }

    pub fn line_def(&self, name: &str) -> Option<&LineDef> {
        self.lines.get(name)
    }

    pub fn vars(&self) -> &IndexMap<String, Expr> {
        &self.vars
    }

    pub fn elements(&self) -> &IndexMap<String, ElementDef> {
        &self.elements
    }

    pub fn lines(&self) -> &IndexMap<String, LineDef> {
        &self.lines
    }
}
