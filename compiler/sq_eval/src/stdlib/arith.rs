//! Operators: arithmetic, pointwise arithmetic, comparison and logic.

use std::cmp::Ordering;

use sq_dist::{
    algebraic_combination, pointwise_combination, pointwise_combination_float, AlgebraicOperation,
    SymbolicDist,
};
use sq_value::{Context, EvalError, FnDefinition, FrType as T, Value, ValueKind};

use super::{boolean, dist, number, string};
use crate::Registry;

type Result = std::result::Result<Value, EvalError>;

pub(super) fn register(registry: &mut Registry) {
    registry.define(
        "add",
        vec![
            FnDefinition::new(vec![T::Number, T::Number], |a, _| {
                Ok(Value::number(number(a, 0)? + number(a, 1)?))
            }),
            FnDefinition::new(vec![T::String, T::String], |a, _| {
                Ok(Value::string(format!("{}{}", string(a, 0)?, string(a, 1)?)))
            }),
            FnDefinition::new(vec![T::Date, T::Duration], |a, _| {
                Ok(Value::date(millis(a, 0)? + millis(a, 1)?))
            }),
            FnDefinition::new(vec![T::Duration, T::Date], |a, _| {
                Ok(Value::date(millis(a, 0)? + millis(a, 1)?))
            }),
            FnDefinition::new(vec![T::Duration, T::Duration], |a, _| {
                Ok(Value::duration(millis(a, 0)? + millis(a, 1)?))
            }),
            FnDefinition::new(vec![T::DistOrNumber, T::DistOrNumber], |a, c| {
                algebraic(a, c, AlgebraicOperation::Add)
            }),
        ],
    );
    registry.define(
        "subtract",
        vec![
            FnDefinition::new(vec![T::Number, T::Number], |a, _| {
                Ok(Value::number(number(a, 0)? - number(a, 1)?))
            }),
            FnDefinition::new(vec![T::Date, T::Date], |a, _| {
                Ok(Value::duration(millis(a, 0)? - millis(a, 1)?))
            }),
            FnDefinition::new(vec![T::Date, T::Duration], |a, _| {
                Ok(Value::date(millis(a, 0)? - millis(a, 1)?))
            }),
            FnDefinition::new(vec![T::Duration, T::Duration], |a, _| {
                Ok(Value::duration(millis(a, 0)? - millis(a, 1)?))
            }),
            FnDefinition::new(vec![T::DistOrNumber, T::DistOrNumber], |a, c| {
                algebraic(a, c, AlgebraicOperation::Subtract)
            }),
        ],
    );
    registry.define(
        "multiply",
        vec![
            FnDefinition::new(vec![T::Number, T::Number], |a, _| {
                Ok(Value::number(number(a, 0)? * number(a, 1)?))
            }),
            FnDefinition::new(vec![T::Duration, T::Number], |a, _| {
                Ok(Value::duration(millis(a, 0)? * number(a, 1)?))
            }),
            FnDefinition::new(vec![T::Number, T::Duration], |a, _| {
                Ok(Value::duration(number(a, 0)? * millis(a, 1)?))
            }),
            FnDefinition::new(vec![T::DistOrNumber, T::DistOrNumber], |a, c| {
                algebraic(a, c, AlgebraicOperation::Multiply)
            }),
        ],
    );
    registry.define(
        "divide",
        vec![
            FnDefinition::new(vec![T::Number, T::Number], |a, _| {
                Ok(Value::number(number(a, 0)? / number(a, 1)?))
            }),
            FnDefinition::new(vec![T::Duration, T::Number], |a, _| {
                Ok(Value::duration(millis(a, 0)? / number(a, 1)?))
            }),
            FnDefinition::new(vec![T::Duration, T::Duration], |a, _| {
                Ok(Value::number(millis(a, 0)? / millis(a, 1)?))
            }),
            FnDefinition::new(vec![T::DistOrNumber, T::DistOrNumber], |a, c| {
                algebraic(a, c, AlgebraicOperation::Divide)
            }),
        ],
    );
    registry.define(
        "pow",
        vec![
            FnDefinition::new(vec![T::Number, T::Number], |a, _| {
                Ok(Value::number(number(a, 0)?.powf(number(a, 1)?)))
            }),
            FnDefinition::new(vec![T::DistOrNumber, T::DistOrNumber], |a, c| {
                algebraic(a, c, AlgebraicOperation::Power)
            }),
        ],
    );
    registry.define(
        "unaryMinus",
        vec![
            FnDefinition::new(vec![T::Number], |a, _| Ok(Value::number(-number(a, 0)?))),
            FnDefinition::new(vec![T::Duration], |a, _| Ok(Value::duration(-millis(a, 0)?))),
            FnDefinition::new(vec![T::Dist], |a, c| {
                let args = [a[0].clone(), Value::number(-1.0)];
                algebraic(&args, c, AlgebraicOperation::Multiply)
            }),
        ],
    );

    registry.define("dotAdd", pointwise(|a, c| dot(a, c, AlgebraicOperation::Add)));
    registry.define(
        "dotSubtract",
        pointwise(|a, c| dot(a, c, AlgebraicOperation::Subtract)),
    );
    registry.define(
        "dotMultiply",
        pointwise(|a, c| dot(a, c, AlgebraicOperation::Multiply)),
    );
    registry.define(
        "dotDivide",
        pointwise(|a, c| dot(a, c, AlgebraicOperation::Divide)),
    );
    registry.define("dotPow", pointwise(|a, c| dot(a, c, AlgebraicOperation::Power)));

    registry.define(
        "equal",
        vec![FnDefinition::new(vec![T::Any, T::Any], |a, _| {
            Ok(Value::bool(a[0].is_equal(&a[1])))
        })],
    );
    registry.define(
        "unequal",
        vec![FnDefinition::new(vec![T::Any, T::Any], |a, _| {
            Ok(Value::bool(!a[0].is_equal(&a[1])))
        })],
    );
    registry.define(
        "smaller",
        comparison(|a, _| compare(a, |o| o == Ordering::Less)),
    );
    registry.define(
        "smallerEq",
        comparison(|a, _| compare(a, |o| o != Ordering::Greater)),
    );
    registry.define(
        "larger",
        comparison(|a, _| compare(a, |o| o == Ordering::Greater)),
    );
    registry.define(
        "largerEq",
        comparison(|a, _| compare(a, |o| o != Ordering::Less)),
    );

    registry.define(
        "and",
        vec![FnDefinition::new(vec![T::Bool, T::Bool], |a, _| {
            Ok(Value::bool(boolean(a, 0)? && boolean(a, 1)?))
        })],
    );
    registry.define(
        "or",
        vec![FnDefinition::new(vec![T::Bool, T::Bool], |a, _| {
            Ok(Value::bool(boolean(a, 0)? || boolean(a, 1)?))
        })],
    );
    registry.define(
        "not",
        vec![FnDefinition::new(vec![T::Bool], |a, _| {
            Ok(Value::bool(!boolean(a, 0)?))
        })],
    );

    registry.define(
        "to",
        vec![FnDefinition::new(vec![T::Number, T::Number], |a, _| {
            let dist = SymbolicDist::from_ninety_percent_interval(number(a, 0)?, number(a, 1)?)?;
            Ok(Value::dist(dist))
        })],
    );
}

fn millis(args: &[Value], i: usize) -> std::result::Result<f64, EvalError> {
    match args.get(i).map(Value::kind) {
        Some(ValueKind::Date(ms) | ValueKind::Duration(ms)) => Ok(*ms),
        _ => Err(EvalError::other("Expected a date or duration")),
    }
}

fn algebraic(args: &[Value], context: &mut dyn Context, op: AlgebraicOperation) -> Result {
    let a = dist(args, 0)?;
    let b = dist(args, 1)?;
    let (env, rng) = context.sampler();
    Ok(Value::dist(algebraic_combination(&a, &b, op, env, rng)?))
}

fn pointwise(run: sq_value::BuiltinFn) -> Vec<FnDefinition> {
    vec![
        FnDefinition::new(vec![T::Number, T::Number], run),
        FnDefinition::new(vec![T::Dist, T::Number], run),
        FnDefinition::new(vec![T::Dist, T::Dist], run),
    ]
}

/// `.+` and friends: plain arithmetic on numbers, density arithmetic on
/// distributions.
fn dot(args: &[Value], context: &mut dyn Context, op: AlgebraicOperation) -> Result {
    if let (Some(x), Some(y)) = (args[0].as_number(), args[1].as_number()) {
        return Ok(Value::number(op.apply(x, y)?));
    }
    let a = dist(args, 0)?;
    let env = context.env();
    if let Some(factor) = args[1].as_number() {
        return Ok(Value::dist(pointwise_combination_float(&a, op, factor, env)?));
    }
    let b = dist(args, 1)?;
    Ok(Value::dist(pointwise_combination(&a, &b, op, env)?))
}

fn comparison(run: sq_value::BuiltinFn) -> Vec<FnDefinition> {
    vec![
        FnDefinition::new(vec![T::Number, T::Number], run),
        FnDefinition::new(vec![T::String, T::String], run),
        FnDefinition::new(vec![T::Date, T::Date], run),
        FnDefinition::new(vec![T::Duration, T::Duration], run),
    ]
}

/// NaN compares false with everything.
fn compare(args: &[Value], accept: fn(Ordering) -> bool) -> Result {
    let ordering = match (args[0].kind(), args[1].kind()) {
        (ValueKind::String(a), ValueKind::String(b)) => Some(a.as_str().cmp(b.as_str())),
        (ValueKind::Number(a), ValueKind::Number(b))
        | (ValueKind::Date(a), ValueKind::Date(b))
        | (ValueKind::Duration(a), ValueKind::Duration(b)) => a.partial_cmp(b),
        _ => None,
    };
    Ok(Value::bool(ordering.is_some_and(accept)))
}
