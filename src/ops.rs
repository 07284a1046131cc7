//! Built-in numeric and beamline operations.

use std::f64::consts::PI;

use crate::ast::{Expr, ExprType, Value};
use crate::context::ParseContext;
use crate::error::ConfError;
use crate::paths;
use crate::registry::Registry;

use ExprType::{Config, Line, Number, String as Str};

/// Build the full table of built-in operations.
///
/// Registration order is the dispatch tie-break and must not change.
pub fn builtin_registry() -> Registry {
    let mut reg = Registry::new();

    reg.register("-", Number, &[Number], unary_negate);

    reg.register("sin", Number, &[Number], unary_sin);
    reg.register("cos", Number, &[Number], unary_cos);
    reg.register("tan", Number, &[Number], unary_tan);
    reg.register("asin", Number, &[Number], unary_asin);
    reg.register("acos", Number, &[Number], unary_acos);
    reg.register("atan", Number, &[Number], unary_atan);
    // legacy spellings
    reg.register("arcsin", Number, &[Number], unary_asin);
    reg.register("arccos", Number, &[Number], unary_acos);
    reg.register("arctan", Number, &[Number], unary_atan);

    reg.register("deg2rad", Number, &[Number], unary_deg2rad);
    reg.register("rad2deg", Number, &[Number], unary_rad2deg);

    reg.register("+", Number, &[Number, Number], binary_add);
    reg.register("-", Number, &[Number, Number], binary_sub);
    reg.register("*", Number, &[Number, Number], binary_mult);
    reg.register("/", Number, &[Number, Number], binary_div);

    reg.register("-", Line, &[Line], unary_line_negate);
    reg.register("*", Line, &[Number, Line], scale_mult_line);
    reg.register("*", Line, &[Line, Number], line_mult_scale);

    reg.register("parse", Config, &[Str], paths::unary_parse);
    reg.register("file", Str, &[Str], paths::unary_file);
    reg.register("dir", Str, &[Str], paths::unary_file);
    reg.register("h5file", Str, &[Str], paths::unary_h5file);

    reg
}

// ── Numeric ─────────────────────────────────────────────────────────

fn unary_number(args: &[Expr], f: fn(f64) -> f64) -> Result<Value, ConfError> {
    Ok(Value::Number(f(args[0].as_number()?)))
}

fn binary_number(args: &[Expr], f: fn(f64, f64) -> f64) -> Result<Value, ConfError> {
    Ok(Value::Number(f(args[0].as_number()?, args[1].as_number()?)))
}

fn unary_negate(_: &ParseContext, args: &[Expr]) -> Result<Value, ConfError> {
    unary_number(args, |x| -x)
}

fn unary_sin(_: &ParseContext, args: &[Expr]) -> Result<Value, ConfError> {
    unary_number(args, f64::sin)
}

fn unary_cos(_: &ParseContext, args: &[Expr]) -> Result<Value, ConfError> {
    unary_number(args, f64::cos)
}

fn unary_tan(_: &ParseContext, args: &[Expr]) -> Result<Value, ConfError> {
    unary_number(args, f64::tan)
}

fn unary_asin(_: &ParseContext, args: &[Expr]) -> Result<Value, ConfError> {
    unary_number(args, f64::asin)
}

fn unary_acos(_: &ParseContext, args: &[Expr]) -> Result<Value, ConfError> {
    unary_number(args, f64::acos)
}

fn unary_atan(_: &ParseContext, args: &[Expr]) -> Result<Value, ConfError> {
    unary_number(args, f64::atan)
}

fn unary_deg2rad(_: &ParseContext, args: &[Expr]) -> Result<Value, ConfError> {
    unary_number(args, |x| x * (PI / 180.0))
}

fn unary_rad2deg(_: &ParseContext, args: &[Expr]) -> Result<Value, ConfError> {
    unary_number(args, |x| x * (180.0 / PI))
}

fn binary_add(_: &ParseContext, args: &[Expr]) -> Result<Value, ConfError> {
    binary_number(args, |a, b| a + b)
}

fn binary_sub(_: &ParseContext, args: &[Expr]) -> Result<Value, ConfError> {
    binary_number(args, |a, b| a - b)
}

fn binary_mult(_: &ParseContext, args: &[Expr]) -> Result<Value, ConfError> {
    binary_number(args, |a, b| a * b)
}

fn binary_div(_: &ParseContext, args: &[Expr]) -> Result<Value, ConfError> {
    let result = args[0].as_number()? / args[1].as_number()?;
    if !result.is_finite() {
        return Err(ConfError::domain("division results in non-finite value"));
    }
    Ok(Value::Number(result))
}

// ── Beamline ────────────────────────────────────────────────────────

/// Reverse the order of a beamline. Nested lines are not touched.
pub fn reverse_line(line: &[String]) -> Vec<String> {
    line.iter().rev().cloned().collect()
}

/// Upper bound on the number of references a repeated beamline may hold.
pub const MAX_LINE_LENGTH: usize = 1 << 26;

/// Repeat a beamline `factor` times.
///
/// The factor must be finite, non-negative and fit in a `u32`; any
/// fractional part is truncated. The result may not exceed
/// [`MAX_LINE_LENGTH`] references.
pub fn repeat_line(line: &[String], factor: f64) -> Result<Vec<String>, ConfError> {
    if !factor.is_finite() || factor < 0.0 || factor > f64::from(u32::MAX) {
        return Err(ConfError::range(
            "beamline scale by negative value or out of range value",
        ));
    }
    let count = factor as usize;
    if line.is_empty() || count == 0 {
        return Ok(Vec::new());
    }

    let too_long = || {
        ConfError::range(format!(
            "beamline of {} references repeated {} times is too long",
            line.len(),
            count
        ))
    };
    let total = line
        .len()
        .checked_mul(count)
        .filter(|&n| n <= MAX_LINE_LENGTH)
        .ok_or_else(too_long)?;
    let mut ret = Vec::new();
    ret.try_reserve_exact(total).map_err(|_| too_long())?;
    for _ in 0..count {
        ret.extend_from_slice(line);
    }
    Ok(ret)
}

fn unary_line_negate(_: &ParseContext, args: &[Expr]) -> Result<Value, ConfError> {
    Ok(Value::Line(reverse_line(args[0].as_line()?)))
}

fn scale_mult_line(_: &ParseContext, args: &[Expr]) -> Result<Value, ConfError> {
    Ok(Value::Line(repeat_line(args[1].as_line()?, args[0].as_number()?)?))
}

fn line_mult_scale(_: &ParseContext, args: &[Expr]) -> Result<Value, ConfError> {
    Ok(Value::Line(repeat_line(args[0].as_line()?, args[1].as_number()?)?))
}
