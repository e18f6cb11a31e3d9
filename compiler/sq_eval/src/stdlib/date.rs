//! Dates, durations and unit suffixes.

use chrono::NaiveDate;
use sq_compile::unit_multiplier;
use sq_value::{
    BuiltinFn, Domain, EvalError, FnDefinition, FrType as T, Value, ValueKind, MS_PER_DAY,
    MS_PER_HOUR, MS_PER_MINUTE, MS_PER_SECOND, MS_PER_YEAR,
};

use super::number;
use crate::Registry;

const MIN_YEAR: f64 = 100.0;
const MAX_YEAR: f64 = 200_000.0;

/// Midnight UTC on the given day, in epoch milliseconds.
fn date_ms(year: f64, month: f64, day: f64) -> Result<f64, EvalError> {
    if year < MIN_YEAR {
        return Err(EvalError::other("Year must be over 100"));
    }
    if year > MAX_YEAR {
        return Err(EvalError::other("Year must be less than 200000"));
    }
    NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|datetime| datetime.and_utc().timestamp_millis() as f64)
        .ok_or_else(|| EvalError::other("Invalid date"))
}

fn duration_ms(args: &[Value]) -> Result<f64, EvalError> {
    match args.first().map(Value::kind) {
        Some(ValueKind::Duration(ms)) => Ok(*ms),
        _ => Err(EvalError::other("Expected a duration")),
    }
}

pub(super) fn register(registry: &mut Registry) {
    registry.define(
        "Date.make",
        vec![FnDefinition::new(vec![T::Number, T::Number, T::Number], |a, _| {
            Ok(Value::date(date_ms(number(a, 0)?, number(a, 1)?, number(a, 2)?)?))
        })],
    );
    registry.define(
        "Date.fromYear",
        vec![FnDefinition::new(vec![T::Number], |a, _| {
            let year = number(a, 0)?;
            let start = date_ms(year.floor(), 1.0, 1.0)?;
            Ok(Value::date(start + year.fract() * MS_PER_YEAR))
        })],
    );
    registry.define(
        "Date.rangeDomain",
        vec![FnDefinition::new(vec![T::Date, T::Date], |a, _| {
            let domain = Domain::from_annotation(&Value::array(a.to_vec()))?;
            Ok(Value::domain(domain))
        })],
    );

    let from: [(&str, BuiltinFn); 5] = [
        ("Duration.fromSeconds", |a, _| {
            Ok(Value::duration(number(a, 0)? * MS_PER_SECOND))
        }),
        ("Duration.fromMinutes", |a, _| {
            Ok(Value::duration(number(a, 0)? * MS_PER_MINUTE))
        }),
        ("Duration.fromHours", |a, _| {
            Ok(Value::duration(number(a, 0)? * MS_PER_HOUR))
        }),
        ("Duration.fromDays", |a, _| {
            Ok(Value::duration(number(a, 0)? * MS_PER_DAY))
        }),
        ("Duration.fromYears", |a, _| {
            Ok(Value::duration(number(a, 0)? * MS_PER_YEAR))
        }),
    ];
    for (name, run) in from {
        registry.define(name, vec![FnDefinition::new(vec![T::Number], run)]);
    }
    let to: [(&str, BuiltinFn); 5] = [
        ("Duration.toSeconds", |a, _| {
            Ok(Value::number(duration_ms(a)? / MS_PER_SECOND))
        }),
        ("Duration.toMinutes", |a, _| {
            Ok(Value::number(duration_ms(a)? / MS_PER_MINUTE))
        }),
        ("Duration.toHours", |a, _| {
            Ok(Value::number(duration_ms(a)? / MS_PER_HOUR))
        }),
        ("Duration.toDays", |a, _| {
            Ok(Value::number(duration_ms(a)? / MS_PER_DAY))
        }),
        ("Duration.toYears", |a, _| {
            Ok(Value::number(duration_ms(a)? / MS_PER_YEAR))
        }),
    ];
    for (name, run) in to {
        registry.define(name, vec![FnDefinition::new(vec![T::Duration], run)]);
    }

    registry.alias("fromUnit_minutes", "Duration.fromMinutes");
    registry.alias("fromUnit_hours", "Duration.fromHours");
    registry.alias("fromUnit_days", "Duration.fromDays");
    registry.alias("fromUnit_years", "Duration.fromYears");

    // Literals are folded by the compiler; these cover suffixed expressions.
    let numeric: [(&str, BuiltinFn); 9] = [
        ("%", |a, _| scaled(a, "%")),
        ("n", |a, _| scaled(a, "n")),
        ("m", |a, _| scaled(a, "m")),
        ("k", |a, _| scaled(a, "k")),
        ("M", |a, _| scaled(a, "M")),
        ("B", |a, _| scaled(a, "B")),
        ("G", |a, _| scaled(a, "G")),
        ("T", |a, _| scaled(a, "T")),
        ("P", |a, _| scaled(a, "P")),
    ];
    for (unit, run) in numeric {
        registry.define(
            &format!("fromUnit_{unit}"),
            vec![FnDefinition::new(vec![T::Number], run)],
        );
    }
}

fn scaled(args: &[Value], unit: &str) -> Result<Value, EvalError> {
    let factor = unit_multiplier(unit)
        .ok_or_else(|| EvalError::other(format!("Unknown unit: {unit}")))?;
    Ok(Value::number(number(args, 0)? * factor))
}
