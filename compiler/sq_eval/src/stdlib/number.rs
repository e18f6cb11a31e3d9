//! `Number.*` and `Math.*`.

use sq_value::{Domain, EvalError, FnDefinition, FrType as T, Value};

use super::{array, number, numbers};
use crate::Registry;

fn number_list() -> Vec<T> {
    vec![T::Array(Box::new(T::Number))]
}

fn non_empty(args: &[Value]) -> Result<Vec<f64>, EvalError> {
    let xs = numbers(array(args, 0)?)?;
    if xs.is_empty() {
        return Err(EvalError::other("List must not be empty"));
    }
    Ok(xs)
}

pub(super) fn register(registry: &mut Registry) {
    registry.define_value("Math.pi", Value::number(std::f64::consts::PI));
    registry.define_value("Math.e", Value::number(std::f64::consts::E));

    registry.define(
        "Number.sum",
        vec![FnDefinition::new(number_list(), |a, _| {
            Ok(Value::number(numbers(array(a, 0)?)?.iter().sum()))
        })],
    );
    registry.alias("List.sum", "Number.sum");
    registry.define(
        "Number.product",
        vec![FnDefinition::new(number_list(), |a, _| {
            Ok(Value::number(numbers(array(a, 0)?)?.iter().product()))
        })],
    );
    registry.define(
        "Number.min",
        vec![
            FnDefinition::new(number_list(), |a, _| {
                Ok(Value::number(non_empty(a)?.into_iter().fold(f64::INFINITY, f64::min)))
            }),
            FnDefinition::new(vec![T::Number, T::Number], |a, _| {
                Ok(Value::number(number(a, 0)?.min(number(a, 1)?)))
            }),
        ],
    );
    registry.define(
        "Number.max",
        vec![
            FnDefinition::new(number_list(), |a, _| {
                Ok(Value::number(
                    non_empty(a)?.into_iter().fold(f64::NEG_INFINITY, f64::max),
                ))
            }),
            FnDefinition::new(vec![T::Number, T::Number], |a, _| {
                Ok(Value::number(number(a, 0)?.max(number(a, 1)?)))
            }),
        ],
    );
    registry.define(
        "Number.mean",
        vec![FnDefinition::new(number_list(), |a, _| {
            let xs = non_empty(a)?;
            Ok(Value::number(xs.iter().sum::<f64>() / xs.len() as f64))
        })],
    );

    let unary: [(&str, sq_value::BuiltinFn); 7] = [
        ("Number.floor", |a, _| Ok(Value::number(number(a, 0)?.floor()))),
        ("Number.ceil", |a, _| Ok(Value::number(number(a, 0)?.ceil()))),
        ("Number.abs", |a, _| Ok(Value::number(number(a, 0)?.abs()))),
        ("Number.exp", |a, _| Ok(Value::number(number(a, 0)?.exp()))),
        ("Number.log", |a, _| Ok(Value::number(number(a, 0)?.ln()))),
        ("Number.log10", |a, _| Ok(Value::number(number(a, 0)?.log10()))),
        ("Number.sqrt", |a, _| Ok(Value::number(number(a, 0)?.sqrt()))),
    ];
    for (name, run) in unary {
        registry.define(name, vec![FnDefinition::new(vec![T::Number], run)]);
    }

    registry.define(
        "Number.rangeDomain",
        vec![FnDefinition::new(vec![T::Number, T::Number], |a, _| {
            Ok(Value::domain(Domain::numeric_range(number(a, 0)?, number(a, 1)?)?))
        })],
    );
}
