//! `Plot.*`, `Scale.*`, `Calculator.make`, `Input.*` and `Table.make`.

use sq_value::{
    Calculator, EvalError, FnDefinition, FrType as T, Input, InputKind, LabeledDist, Plot, Scale,
    ScaleKind, TableChart, TableColumn, Value, ValueKind, ValueMap,
};

use super::{array, bool_field, dict, dist, field, lambda, number_field, optional, string_field};
use crate::Registry;

const DEFAULT_SYMLOG_CONSTANT: f64 = 0.0001;
const DEFAULT_POWER_EXPONENT: f64 = 0.1;

fn opt_dict() -> T {
    T::Optional(Box::new(T::Dict))
}

/// The params dict at `i`, empty when omitted.
fn params(args: &[Value], i: usize) -> Result<ValueMap, EvalError> {
    match optional(args, i) {
        Some(_) => Ok(dict(args, i)?.clone()),
        None => Ok(ValueMap::new()),
    }
}

fn scale_field(map: &ValueMap, key: &str, default: ScaleKind) -> Result<Scale, EvalError> {
    match field(map, key).map(Value::kind) {
        None => Ok(Scale::new(default)),
        Some(ValueKind::Scale(scale)) => Ok((**scale).clone()),
        Some(_) => Err(EvalError::other(format!("{key} must be a scale"))),
    }
}

fn scale(kind: ScaleKind, map: &ValueMap) -> Result<Value, EvalError> {
    let min = number_field(map, "min")?;
    let max = number_field(map, "max")?;
    if let (Some(min), Some(max)) = (min, max) {
        if min >= max {
            return Err(EvalError::other(format!(
                "Max must be greater than min, got: min={min}, max={max}"
            )));
        }
    }
    Ok(Value::scale(Scale {
        kind,
        min,
        max,
        tick_format: string_field(map, "tickFormat")?,
        title: string_field(map, "title")?,
    }))
}

/// A dist entry of `Plot.dists`: a dist, a number, or `{name, value}`.
fn labeled(value: &Value) -> Result<LabeledDist, EvalError> {
    if let Some(map) = value.as_dict() {
        let dist_value = field(map, "value")
            .ok_or_else(|| EvalError::other("Each entry needs a value"))?;
        return Ok(LabeledDist {
            name: string_field(map, "name")?,
            dist: dist(std::slice::from_ref(dist_value), 0)?,
        });
    }
    Ok(LabeledDist {
        name: None,
        dist: dist(std::slice::from_ref(value), 0)?,
    })
}

fn distributions_plot(distributions: Vec<LabeledDist>, map: &ValueMap) -> Result<Value, EvalError> {
    Ok(Value::plot(Plot::Distributions {
        distributions,
        x_scale: scale_field(map, "xScale", ScaleKind::Linear)?,
        y_scale: scale_field(map, "yScale", ScaleKind::Linear)?,
        show_summary: bool_field(map, "showSummary")?.unwrap_or(true),
    }))
}

fn numeric_fn_plot(args: &[Value], function_at: usize, map: &ValueMap) -> Result<Value, EvalError> {
    let points = match number_field(map, "xPoints")? {
        Some(n) if n >= 2.0 && n.fract() == 0.0 => Some(n as usize),
        Some(_) => return Err(EvalError::other("xPoints must be an integer of at least 2")),
        None => None,
    };
    Ok(Value::plot(Plot::NumericFn {
        function: lambda(args, function_at)?.clone(),
        x_scale: scale_field(map, "xScale", ScaleKind::Linear)?,
        y_scale: scale_field(map, "yScale", ScaleKind::Linear)?,
        points,
    }))
}

fn input(map: &ValueMap, kind: InputKind) -> Result<Value, EvalError> {
    let name = string_field(map, "name")?
        .ok_or_else(|| EvalError::other("Input needs a name"))?;
    Ok(Value::input(Input {
        name,
        description: string_field(map, "description")?,
        kind,
    }))
}

/// `default` may be given as a string or a number; both display as text.
fn text_default(map: &ValueMap) -> Result<Option<String>, EvalError> {
    match field(map, "default") {
        Some(v) if v.as_number().is_some() => Ok(Some(v.to_string())),
        _ => string_field(map, "default"),
    }
}

fn calculator(args: &[Value], function_at: usize, map: &ValueMap) -> Result<Value, EvalError> {
    let function = lambda(args, function_at)?.clone();
    let mut inputs = Vec::new();
    if let Some(list) = field(map, "inputs") {
        let items = list
            .as_array()
            .ok_or_else(|| EvalError::other("inputs must be a list"))?;
        for item in items {
            match item.kind() {
                ValueKind::Input(input) => inputs.push((**input).clone()),
                _ => return Err(EvalError::other("inputs must contain Input values")),
            }
        }
    }
    if let Some(count) = function.parameter_count() {
        if count != inputs.len() {
            return Err(EvalError::other(format!(
                "Calculator function needs {count} inputs, got {}",
                inputs.len()
            )));
        }
    }
    let sample_count = match number_field(map, "sampleCount")? {
        Some(n) if n >= 1.0 && n.fract() == 0.0 => Some(n as usize),
        Some(_) => return Err(EvalError::other("sampleCount must be a positive integer")),
        None => None,
    };
    Ok(Value::calculator(Calculator {
        function,
        inputs,
        autorun: bool_field(map, "autorun")?.unwrap_or(true),
        title: string_field(map, "title")?,
        description: string_field(map, "description")?,
        sample_count,
    }))
}

pub(super) fn register(registry: &mut Registry) {
    registry.define(
        "Plot.dist",
        vec![
            FnDefinition::new(vec![T::DistOrNumber, opt_dict()], |a, _| {
                let map = params(a, 1)?;
                distributions_plot(vec![labeled(&a[0])?], &map)
            }),
            FnDefinition::new(vec![T::Dict], |a, _| {
                let map = dict(a, 0)?;
                let entry = field(map, "dist")
                    .ok_or_else(|| EvalError::other("Plot.dist needs a dist"))?;
                distributions_plot(vec![labeled(entry)?], map)
            }),
        ],
    );
    registry.define(
        "Plot.dists",
        vec![
            FnDefinition::new(vec![T::Array(Box::new(T::Any)), opt_dict()], |a, _| {
                let map = params(a, 1)?;
                let entries = array(a, 0)?;
                let dists = entries.iter().map(labeled).collect::<Result<_, _>>()?;
                distributions_plot(dists, &map)
            }),
            FnDefinition::new(vec![T::Dict], |a, _| {
                let map = dict(a, 0)?;
                let entries = field(map, "dists")
                    .and_then(Value::as_array)
                    .ok_or_else(|| EvalError::other("Plot.dists needs a list of dists"))?;
                let dists = entries.iter().map(labeled).collect::<Result<_, _>>()?;
                distributions_plot(dists, map)
            }),
        ],
    );
    registry.define(
        "Plot.numericFn",
        vec![
            FnDefinition::new(vec![T::Lambda, opt_dict()], |a, _| {
                let map = params(a, 1)?;
                numeric_fn_plot(a, 0, &map)
            }),
            FnDefinition::new(vec![T::Dict], |a, _| {
                let map = dict(a, 0)?;
                let function = field(map, "fn")
                    .ok_or_else(|| EvalError::other("Plot.numericFn needs a fn"))?;
                numeric_fn_plot(std::slice::from_ref(function), 0, map)
            }),
        ],
    );

    registry.define(
        "Scale.linear",
        vec![FnDefinition::new(vec![opt_dict()], |a, _| {
            scale(ScaleKind::Linear, &params(a, 0)?)
        })],
    );
    registry.define(
        "Scale.log",
        vec![FnDefinition::new(vec![opt_dict()], |a, _| {
            let map = params(a, 0)?;
            if number_field(&map, "min")?.is_some_and(|min| min <= 0.0) {
                return Err(EvalError::other("Min must be over 0 for log scale"));
            }
            scale(ScaleKind::Log, &map)
        })],
    );
    registry.define(
        "Scale.symlog",
        vec![FnDefinition::new(vec![opt_dict()], |a, _| {
            let map = params(a, 0)?;
            let constant = number_field(&map, "constant")?.unwrap_or(DEFAULT_SYMLOG_CONSTANT);
            if constant == 0.0 {
                return Err(EvalError::other("Symlog scale constant cannot be 0"));
            }
            scale(ScaleKind::Symlog { constant }, &map)
        })],
    );
    registry.define(
        "Scale.power",
        vec![FnDefinition::new(vec![opt_dict()], |a, _| {
            let map = params(a, 0)?;
            let exponent = number_field(&map, "exponent")?.unwrap_or(DEFAULT_POWER_EXPONENT);
            if exponent <= 0.0 {
                return Err(EvalError::other("Power scale exponent must be over 0"));
            }
            scale(ScaleKind::Power { exponent }, &map)
        })],
    );
    registry.define(
        "Scale.date",
        vec![FnDefinition::new(vec![opt_dict()], |a, _| {
            scale(ScaleKind::Date, &params(a, 0)?)
        })],
    );

    registry.define(
        "Calculator.make",
        vec![
            FnDefinition::new(vec![T::Lambda, opt_dict()], |a, _| {
                let map = params(a, 1)?;
                calculator(a, 0, &map)
            }),
            FnDefinition::new(vec![T::Dict], |a, _| {
                let map = dict(a, 0)?;
                let function = field(map, "fn")
                    .ok_or_else(|| EvalError::other("Calculator.make needs a fn"))?;
                calculator(std::slice::from_ref(function), 0, map)
            }),
        ],
    );

    registry.define(
        "Input.text",
        vec![FnDefinition::new(vec![T::Dict], |a, _| {
            let map = dict(a, 0)?;
            input(map, InputKind::Text { default: text_default(map)? })
        })],
    );
    registry.define(
        "Input.textArea",
        vec![FnDefinition::new(vec![T::Dict], |a, _| {
            let map = dict(a, 0)?;
            input(map, InputKind::TextArea { default: text_default(map)? })
        })],
    );
    registry.define(
        "Input.checkbox",
        vec![FnDefinition::new(vec![T::Dict], |a, _| {
            let map = dict(a, 0)?;
            input(map, InputKind::Checkbox { default: bool_field(map, "default")? })
        })],
    );
    registry.define(
        "Input.select",
        vec![FnDefinition::new(vec![T::Dict], |a, _| {
            let map = dict(a, 0)?;
            let options: Vec<String> = field(map, "options")
                .and_then(Value::as_array)
                .ok_or_else(|| EvalError::other("Input.select needs a list of options"))?
                .iter()
                .map(|o| {
                    o.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| EvalError::other("Options must be strings"))
                })
                .collect::<Result<_, _>>()?;
            let default = string_field(map, "default")?;
            if let Some(default) = &default {
                if !options.contains(default) {
                    return Err(EvalError::other(format!(
                        "Default value {default} is not in the options"
                    )));
                }
            }
            input(map, InputKind::Select { options, default })
        })],
    );

    registry.define(
        "Table.make",
        vec![FnDefinition::new(
            vec![T::Array(Box::new(T::Any)), T::Dict],
            |a, _| {
                let map = dict(a, 1)?;
                let columns = field(map, "columns")
                    .and_then(Value::as_array)
                    .ok_or_else(|| EvalError::other("Table.make needs a list of columns"))?;
                let mut parsed = Vec::with_capacity(columns.len());
                for column in columns {
                    let column = column
                        .as_dict()
                        .ok_or_else(|| EvalError::other("Each column must be a dict"))?;
                    let function = field(column, "fn")
                        .and_then(Value::as_lambda)
                        .ok_or_else(|| EvalError::other("Each column needs a fn"))?;
                    parsed.push(TableColumn {
                        name: string_field(column, "name")?,
                        function: function.clone(),
                    });
                }
                Ok(Value::table_chart(TableChart {
                    data: array(a, 0)?.to_vec(),
                    columns: parsed,
                }))
            },
        )],
    );
}
