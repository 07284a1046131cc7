//! Filesystem-facing operations: path canonicalization, `file`/`dir`,
//! `h5file` container paths and recursive inclusion with `parse`.

use std::path::{Component, Path, PathBuf};
use std::rc::Rc;

use tracing::debug;

use crate::ast::{Expr, Value};
use crate::context::ParseContext;
use crate::error::ConfError;
use crate::LatticeParser;

/// Nesting limit for `parse`, so a file that includes itself fails instead
/// of exhausting the stack.
pub const MAX_INCLUDE_DEPTH: usize = 32;

/// Resolve `path` against `cwd` and canonicalize it (absolute, symlinks
/// resolved). Fails with `NotFound` if nothing exists there or `path` is
/// empty.
pub fn canonicalize_in(cwd: &Path, path: &str) -> Result<PathBuf, ConfError> {
    if path.is_empty() {
        return Err(ConfError::not_found("\"\" does not exist"));
    }
    let joined = cwd.join(path);
    std::fs::canonicalize(&joined).map_err(|_| {
        ConfError::not_found(format!("\"{}\" does not exist", normalize(&joined).display()))
    })
}

/// Lexically fold `.` and `..` components, for messages about paths that
/// cannot be canonicalized because they do not exist.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() && !out.has_root() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Split `input` into an existing container file and the path inside it.
///
/// The boundary between the two is ambiguous since both use `/`. Candidate
/// file paths are tried by truncating at each `/` from the right; the first
/// one that exists wins and the rest (with its leading `/`) is returned
/// verbatim. If no truncation exists, the whole input is tried with an empty
/// internal path. An empty input never names a container.
pub fn split_container_path(cwd: &Path, input: &str) -> Result<(PathBuf, String), ConfError> {
    if input.is_empty() {
        return Err(ConfError::not_found("\"\" does not exist"));
    }
    let boundaries = input
        .rmatch_indices('/')
        .map(|(i, _)| i)
        .filter(|&i| i > 0)
        .chain(std::iter::once(input.len()));

    for sep in boundaries {
        let candidate = &input[..sep];
        if cwd.join(candidate).exists() {
            let container = canonicalize_in(cwd, candidate)?;
            return Ok((container, input[sep..].to_string()));
        }
    }

    Err(ConfError::not_found(format!("\"{}\" does not exist", input)))
}

pub(crate) fn unary_file(ctxt: &ParseContext, args: &[Expr]) -> Result<Value, ConfError> {
    let path = canonicalize_in(ctxt.cwd(), args[0].as_text()?)?;
    Ok(Value::Text(path.to_string_lossy().into_owned()))
}

pub(crate) fn unary_h5file(ctxt: &ParseContext, args: &[Expr]) -> Result<Value, ConfError> {
    let (container, internal) = split_container_path(ctxt.cwd(), args[0].as_text()?)?;
    Ok(Value::Text(format!("{}{}", container.display(), internal)))
}

pub(crate) fn unary_parse(ctxt: &ParseContext, args: &[Expr]) -> Result<Value, ConfError> {
    let name = canonicalize_in(ctxt.cwd(), args[0].as_text()?)?;

    if ctxt.depth() >= MAX_INCLUDE_DEPTH {
        return Err(ConfError::range(format!(
            "include depth exceeds {} while parsing \"{}\"",
            MAX_INCLUDE_DEPTH,
            name.display()
        )));
    }

    debug!(path = %name.display(), depth = ctxt.depth() + 1, "parsing included file");

    let mut parser = LatticeParser::new();
    parser.set_printer(ctxt.printer().cloned());
    let conf = parser
        .parse_file_at_depth(&name, ctxt.depth() + 1)
        .map_err(|err| ConfError::nested_parse(name.clone(), err))?;

    Ok(Value::Config(Rc::new(conf)))
}
