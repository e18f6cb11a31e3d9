//! The standard library.
//!
//! Each submodule registers one family of builtins. Overloads are tried in
//! registration order, so specific signatures come before general ones
//! (`Number, Number` before `Dist|Number, Dist|Number`).
//!
//! Argument accessors below assume the overload's `FrType`s already matched;
//! their errors only fire when a definition's inputs and body disagree.

mod arith;
mod collections;
mod date;
mod dist;
mod misc;
mod number;
mod plot;
mod sample_set;
mod tag;

use sq_dist::{Dist, SymbolicDist};
use sq_value::{ErrorMessage, EvalError, Lambda, Value, ValueMap};

use crate::Registry;

pub(crate) fn register(registry: &mut Registry) {
    arith::register(registry);
    dist::register(registry);
    sample_set::register(registry);
    collections::register(registry);
    number::register(registry);
    date::register(registry);
    tag::register(registry);
    plot::register(registry);
    misc::register(registry);
}

fn expected(expected: &str, got: Option<&Value>) -> EvalError {
    ErrorMessage::ExpectedType {
        expected: expected.to_string(),
        got: got.map_or("nothing", Value::type_name).to_string(),
    }
    .into()
}

pub(crate) fn number(args: &[Value], i: usize) -> Result<f64, EvalError> {
    args.get(i)
        .and_then(Value::as_number)
        .ok_or_else(|| expected("Number", args.get(i)))
}

pub(crate) fn string(args: &[Value], i: usize) -> Result<&str, EvalError> {
    args.get(i)
        .and_then(Value::as_str)
        .ok_or_else(|| expected("String", args.get(i)))
}

pub(crate) fn boolean(args: &[Value], i: usize) -> Result<bool, EvalError> {
    args.get(i)
        .and_then(Value::as_bool)
        .ok_or_else(|| expected("Boolean", args.get(i)))
}

pub(crate) fn array(args: &[Value], i: usize) -> Result<&[Value], EvalError> {
    args.get(i)
        .and_then(Value::as_array)
        .ok_or_else(|| expected("List", args.get(i)))
}

pub(crate) fn dict(args: &[Value], i: usize) -> Result<&ValueMap, EvalError> {
    args.get(i)
        .and_then(Value::as_dict)
        .ok_or_else(|| expected("Dict", args.get(i)))
}

pub(crate) fn lambda(args: &[Value], i: usize) -> Result<&Lambda, EvalError> {
    args.get(i)
        .and_then(Value::as_lambda)
        .ok_or_else(|| expected("Lambda", args.get(i)))
}

/// A distribution argument. Numbers become point masses.
pub(crate) fn dist(args: &[Value], i: usize) -> Result<Dist, EvalError> {
    let value = args.get(i);
    if let Some(dist) = value.and_then(Value::as_dist) {
        return Ok(dist.clone());
    }
    match value.and_then(Value::as_number) {
        Some(n) => Ok(Dist::Symbolic(SymbolicDist::point_mass(n)?)),
        None => Err(expected("Dist", value)),
    }
}

/// A present, non-void argument at `i`.
pub(crate) fn optional(args: &[Value], i: usize) -> Option<&Value> {
    args.get(i).filter(|v| !v.is_void())
}

pub(crate) fn numbers(values: &[Value]) -> Result<Vec<f64>, EvalError> {
    values
        .iter()
        .map(|v| v.as_number().ok_or_else(|| expected("Number", Some(v))))
        .collect()
}

/// Field of a dict argument, treating void as absent.
pub(crate) fn field<'a>(map: &'a ValueMap, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|v| !v.is_void())
}

pub(crate) fn number_field(map: &ValueMap, key: &str) -> Result<Option<f64>, EvalError> {
    field(map, key)
        .map(|v| v.as_number().ok_or_else(|| expected("Number", Some(v))))
        .transpose()
}

pub(crate) fn string_field(map: &ValueMap, key: &str) -> Result<Option<String>, EvalError> {
    field(map, key)
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| expected("String", Some(v)))
        })
        .transpose()
}

pub(crate) fn bool_field(map: &ValueMap, key: &str) -> Result<Option<bool>, EvalError> {
    field(map, key)
        .map(|v| v.as_bool().ok_or_else(|| expected("Boolean", Some(v))))
        .transpose()
}

/// Result of a lambda that must return a number.
pub(crate) fn returned_number(value: &Value) -> Result<f64, EvalError> {
    value.as_number().ok_or_else(|| expected("Number", Some(value)))
}

pub(crate) fn returned_bool(value: &Value) -> Result<bool, EvalError> {
    value.as_bool().ok_or_else(|| expected("Boolean", Some(value)))
}

/// Index argument for list functions: a non-negative integer.
pub(crate) fn count(args: &[Value], i: usize) -> Result<usize, EvalError> {
    let n = number(args, i)?;
    if n < 0.0 || n.fract() != 0.0 || !n.is_finite() {
        return Err(EvalError::other(format!(
            "Expected a non-negative integer, got {}",
            sq_ir::format_number(n)
        )));
    }
    Ok(n as usize)
}
