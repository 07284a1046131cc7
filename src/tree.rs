use std::fmt;

use indexmap::IndexMap;

use crate::ast::Value;
use crate::context::{ElementDef, LineDef, ParseContext};

/// The configuration assembled from a successful parse.
///
/// An immutable snapshot of the three symbol tables, in declaration order.
/// Nested configurations produced by `parse(...)` appear as
/// `Value::Config` entries and are shared, not copied.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Config {
    vars: IndexMap<String, Value>,
    elements: IndexMap<String, ElementDef>,
    lines: IndexMap<String, LineDef>,
}

impl Config {
    pub fn new() -> Self {
        Config::default()
    }

    /// Snapshot the tables of a finished parse.
    pub fn from_context(ctxt: &ParseContext) -> Self {
        Config {
            vars: ctxt
                .vars()
                .iter()
                .map(|(name, expr)| (name.clone(), expr.value().clone()))
                .collect(),
            elements: ctxt.elements().clone(),
            lines: ctxt.lines().clone(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    pub fn element(&self, name: &str) -> Option<&ElementDef> {
        self.elements.get(name)
    }

    pub fn line(&self, name: &str) -> Option<&LineDef> {
        self.lines.get(name)
    }

    pub fn vars(&self) -> &IndexMap<String, Value> {
        &self.vars
    }

    pub fn elements(&self) -> &IndexMap<String, ElementDef> {
        &self.elements
    }

    pub fn lines(&self) -> &IndexMap<String, LineDef> {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty() && self.elements.is_empty() && self.lines.is_empty()
    }

    /// Serialize to compact JSON.
    pub fn to_json(&self) -> String {
        crate::json::to_json(self)
    }

    /// Serialize to pretty-printed JSON (2-space indent).
    pub fn to_json_pretty(&self) -> String {
        crate::json::to_json_pretty(self)
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Config({} vars, {} elements, {} lines)",
            self.vars.len(),
            self.elements.len(),
            self.lines.len()
        )
    }
}
