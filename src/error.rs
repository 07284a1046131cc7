use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// The category of a failure, with a stable machine-readable code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No registered signature matches the name, arity and argument types.
    UnknownOperation,
    /// Mathematically invalid result (e.g. non-finite division).
    Domain,
    /// Value outside an operation's accepted domain.
    Range,
    /// Symbol re-declared in the same namespace.
    DuplicateName,
    /// Filesystem path does not resolve to an existing entry.
    NotFound,
    /// Failure surfaced from a recursively included file.
    NestedParse,
    /// A value was read under the wrong type tag. Programming error.
    InvalidAccess,
    /// Reference to an undeclared variable, element, line, command or function.
    Undefined,
    /// Scanner or grammar error.
    Syntax,
    /// A source file could not be read.
    Io,
}

impl ErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::UnknownOperation => "unknown-operation",
            ErrorKind::Domain => "domain-error",
            ErrorKind::Range => "range-error",
            ErrorKind::DuplicateName => "duplicate-name",
            ErrorKind::NotFound => "not-found",
            ErrorKind::NestedParse => "nested-parse-error",
            ErrorKind::InvalidAccess => "invalid-access",
            ErrorKind::Undefined => "undefined-name",
            ErrorKind::Syntax => "syntax-error",
            ErrorKind::Io => "io-error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// An error raised while evaluating or parsing lattice source.
///
/// `line` is 1-based and is filled in by the grammar driver from the
/// context's current line when the error is recorded.
#[derive(Debug, Clone, PartialEq, Error)]
pub struct ConfError {
    pub kind: ErrorKind,
    pub message: String,
    pub line: Option<usize>,
    /// For `NestedParse`: the included file and the error raised inside it.
    #[source]
    pub nested: Option<Box<NestedError>>,
}

/// The failure of an included file, kept whole so callers can walk the chain.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("in {}: {error}", .path.display())]
pub struct NestedError {
    pub path: PathBuf,
    pub error: ConfError,
}

impl ConfError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        ConfError {
            kind,
            message: message.into(),
            line: None,
            nested: None,
        }
    }

    pub fn unknown_operation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownOperation, message)
    }

    pub fn domain(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Domain, message)
    }

    pub fn range(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Range, message)
    }

    pub fn duplicate_name(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DuplicateName, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn invalid_access(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidAccess, message)
    }

    pub fn undefined(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Undefined, message)
    }

    pub fn syntax(message: impl Into<String>, line: usize) -> Self {
        Self::new(ErrorKind::Syntax, message).at_line(line)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    /// Wrap the failure of an included file.
    pub fn nested_parse(path: PathBuf, error: ConfError) -> Self {
        ConfError {
            kind: ErrorKind::NestedParse,
            message: format!("error while parsing \"{}\": {}", path.display(), error),
            line: None,
            nested: Some(Box::new(NestedError { path, error })),
        }
    }

    /// Attach a line number unless one is already set.
    pub fn at_line(mut self, line: usize) -> Self {
        if self.line.is_none() {
            self.line = Some(line);
        }
        self
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

impl fmt::Display for ConfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}: {} ({})", line, self.message, self.kind),
            None => write!(f, "{} ({})", self.message, self.kind),
        }
    }
}
