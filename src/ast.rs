//! Value and expression model shared by the dispatch engine, the symbol
//! tables and the grammar driver.

use std::fmt;
use std::rc::Rc;

use crate::error::ConfError;
use crate::tree::Config;

/// Type tag of an expression.
///
/// `Var` and `Element` mark unresolved name references. They never carry an
/// evaluated value; the symbol tables resolve them to one of the other tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExprType {
    Number,
    Vector,
    String,
    Config,
    Var,
    Line,
    Element,
}

impl ExprType {
    pub fn name(&self) -> &'static str {
        match self {
            ExprType::Number => "number",
            ExprType::Vector => "vector",
            ExprType::String => "string",
            ExprType::Config => "config",
            ExprType::Var => "var",
            ExprType::Line => "beamline",
            ExprType::Element => "element",
        }
    }
}

impl fmt::Display for ExprType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An evaluated value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Vector(Vec<f64>),
    Text(String),
    /// Ordered element names.
    Line(Vec<String>),
    /// Configuration produced by a nested parse, shared between holders.
    Config(Rc<Config>),
}

impl Value {
    /// The tag an expression holding this value must carry.
    pub fn expr_type(&self) -> ExprType {
        match self {
            Value::Number(_) => ExprType::Number,
            Value::Vector(_) => ExprType::Vector,
            Value::Text(_) => ExprType::String,
            Value::Line(_) => ExprType::Line,
            Value::Config(_) => ExprType::Config,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Vector(v) => {
                f.write_str("[")?;
                for (i, n) in v.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", n)?;
                }
                f.write_str("]")
            }
            Value::Text(s) => write!(f, "\"{}\"", s),
            Value::Line(names) => write!(f, "({})", names.join(", ")),
            Value::Config(conf) => write!(f, "{}", conf),
        }
    }
}

/// An evaluated expression node. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    etype: ExprType,
    value: Value,
}

impl Expr {
    /// Build a node from a tag and a value, rejecting inconsistent pairs.
    pub fn new(etype: ExprType, value: Value) -> Result<Self, ConfError> {
        if value.expr_type() != etype {
            return Err(ConfError::invalid_access(format!(
                "{} value cannot be tagged as {}",
                value.expr_type(),
                etype
            )));
        }
        Ok(Expr { etype, value })
    }

    pub fn number(n: f64) -> Self {
        Expr {
            etype: ExprType::Number,
            value: Value::Number(n),
        }
    }

    pub fn vector(v: Vec<f64>) -> Self {
        Expr {
            etype: ExprType::Vector,
            value: Value::Vector(v),
        }
    }

    pub fn text(s: impl Into<String>) -> Self {
        Expr {
            etype: ExprType::String,
            value: Value::Text(s.into()),
        }
    }

    pub fn line(names: Vec<String>) -> Self {
        Expr {
            etype: ExprType::Line,
            value: Value::Line(names),
        }
    }

    pub fn config(conf: Rc<Config>) -> Self {
        Expr {
            etype: ExprType::Config,
            value: Value::Config(conf),
        }
    }

    pub fn etype(&self) -> ExprType {
        self.etype
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn as_number(&self) -> Result<f64, ConfError> {
        match self.value {
            Value::Number(n) => Ok(n),
            _ => Err(self.wrong_access(ExprType::Number)),
        }
    }

    pub fn as_vector(&self) -> Result<&[f64], ConfError> {
        match &self.value {
            Value::Vector(v) => Ok(v),
            _ => Err(self.wrong_access(ExprType::Vector)),
        }
    }

    pub fn as_text(&self) -> Result<&str, ConfError> {
        match &self.value {
            Value::Text(s) => Ok(s),
            _ => Err(self.wrong_access(ExprType::String)),
        }
    }

    pub fn as_line(&self) -> Result<&[String], ConfError> {
        match &self.value {
            Value::Line(names) => Ok(names),
            _ => Err(self.wrong_access(ExprType::Line)),
        }
    }

    pub fn as_config(&self) -> Result<&Rc<Config>, ConfError> {
        match &self.value {
            Value::Config(conf) => Ok(conf),
            _ => Err(self.wrong_access(ExprType::Config)),
        }
    }

    fn wrong_access(&self, wanted: ExprType) -> ConfError {
        ConfError::invalid_access(format!(
            "expression of type {} accessed as {}",
            self.etype, wanted
        ))
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// A literal handed to the core by the grammar layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    Vector(Vec<f64>),
    String(String),
    /// A bare name: variable, element or line.
    Var(String),
    /// A name that must denote a declared element.
    Element(String),
}
