//! Operator and function registry with signature-matched dispatch.

use indexmap::IndexMap;

use crate::ast::{Expr, ExprType, Value};
use crate::context::ParseContext;
use crate::error::ConfError;

/// Evaluation function of a registered operation.
///
/// Receives the calling context (for the working directory and printer) and
/// the actual arguments, whose tags already match the signature.
pub type EvalFn = fn(&ParseContext, &[Expr]) -> Result<Value, ConfError>;

/// One registered signature.
#[derive(Clone)]
pub struct Operation {
    pub name: String,
    pub result: ExprType,
    pub args: Vec<ExprType>,
    pub eval: EvalFn,
}

impl Operation {
    /// Whether the actual arguments match this signature positionally.
    pub fn accepts(&self, args: &[Expr]) -> bool {
        self.args.len() == args.len()
            && self.args.iter().zip(args).all(|(want, got)| *want == got.etype())
    }

    /// Human-readable signature, e.g. `*(number, beamline) -> beamline`.
    pub fn signature(&self) -> String {
        format!(
            "{}({}) -> {}",
            self.name,
            join_types(self.args.iter().copied()),
            self.result
        )
    }
}

impl std::fmt::Debug for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.signature())
    }
}

/// Multi-valued mapping from name to signatures, in registration order.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    operations: IndexMap<String, Vec<Operation>>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    /// Add an alternative under `name`. Existing entries are never replaced.
    pub fn register(&mut self, name: &str, result: ExprType, args: &[ExprType], eval: EvalFn) {
        self.operations
            .entry(name.to_string())
            .or_default()
            .push(Operation {
                name: name.to_string(),
                result,
                args: args.to_vec(),
                eval,
            });
    }

    /// All signatures registered under `name`, in registration order.
    pub fn lookup(&self, name: &str) -> &[Operation] {
        self.operations.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First signature, in registration order, whose argument tags exactly
    /// match the actual arguments.
    pub fn resolve(&self, name: &str, args: &[Expr]) -> Result<&Operation, ConfError> {
        self.lookup(name)
            .iter()
            .find(|op| op.accepts(args))
            .ok_or_else(|| {
                ConfError::unknown_operation(format!(
                    "Operation '{}' with {} argument(s) ({}) not defined",
                    name,
                    args.len(),
                    join_types(args.iter().map(Expr::etype))
                ))
            })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Operation> {
        self.operations.values().flatten()
    }
}

fn join_types(types: impl Iterator<Item = ExprType>) -> String {
    types.map(|t| t.name()).collect::<Vec<_>>().join(", ")
}
