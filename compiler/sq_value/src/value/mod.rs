//! Runtime values.
//!
//! Every heap payload sits behind [`Heap`], whose constructor is private to
//! this crate, so all allocation goes through the factory methods on
//! [`Value`]:
//!
//! ```text
//! let s = Value::string("hello");             // OK
//! let xs = Value::array(vec![Value::number(1.0)]); // OK
//! let s = ValueKind::String(Heap::new(...));  // ERROR: Heap::new is pub(crate)
//! ```
//!
//! Tags ride alongside the kind in a separate shared allocation, so tagging
//! a value never copies its payload.

use std::fmt;

use chrono::DateTime;
use indexmap::IndexMap;
use sq_dist::Dist;

use crate::{Calculator, Domain, Heap, Input, Lambda, Plot, Scale, ScaleKind, TableChart, ValueTags};

pub type ValueMap = IndexMap<String, Value>;

pub const MS_PER_SECOND: f64 = 1000.0;
pub const MS_PER_MINUTE: f64 = 60.0 * MS_PER_SECOND;
pub const MS_PER_HOUR: f64 = 60.0 * MS_PER_MINUTE;
pub const MS_PER_DAY: f64 = 24.0 * MS_PER_HOUR;
pub const MS_PER_YEAR: f64 = 365.25 * MS_PER_DAY;

#[derive(Clone, Debug, PartialEq)]
pub enum ValueKind {
    Void,
    Number(f64),
    Bool(bool),
    String(Heap<String>),
    /// Milliseconds since the Unix epoch.
    Date(f64),
    /// Milliseconds.
    Duration(f64),
    Array(Heap<Vec<Value>>),
    Dict(Heap<ValueMap>),
    Lambda(Heap<Lambda>),
    Dist(Heap<Dist>),
    Domain(Heap<Domain>),
    Scale(Heap<Scale>),
    Plot(Heap<Plot>),
    Calculator(Heap<Calculator>),
    Input(Heap<Input>),
    TableChart(Heap<TableChart>),
}

/// A value plus optional tags. `PartialEq` compares tags too; the
/// language's `==` is [`Value::is_equal`].
#[derive(Clone, Debug, PartialEq)]
pub struct Value {
    kind: ValueKind,
    tags: Option<Heap<ValueTags>>,
}

impl From<ValueKind> for Value {
    fn from(kind: ValueKind) -> Self {
        Value { kind, tags: None }
    }
}

impl Value {
    pub fn void() -> Self {
        ValueKind::Void.into()
    }

    pub fn number(n: f64) -> Self {
        ValueKind::Number(n).into()
    }

    pub fn bool(b: bool) -> Self {
        ValueKind::Bool(b).into()
    }

    pub fn string(s: impl Into<String>) -> Self {
        ValueKind::String(Heap::new(s.into())).into()
    }

    pub fn date(ms: f64) -> Self {
        ValueKind::Date(ms).into()
    }

    pub fn duration(ms: f64) -> Self {
        ValueKind::Duration(ms).into()
    }

    pub fn array(items: Vec<Value>) -> Self {
        ValueKind::Array(Heap::new(items)).into()
    }

    pub fn dict(entries: ValueMap) -> Self {
        ValueKind::Dict(Heap::new(entries)).into()
    }

    pub fn lambda(lambda: Lambda) -> Self {
        ValueKind::Lambda(Heap::new(lambda)).into()
    }

    pub fn dist(dist: impl Into<Dist>) -> Self {
        ValueKind::Dist(Heap::new(dist.into())).into()
    }

    pub fn domain(domain: Domain) -> Self {
        ValueKind::Domain(Heap::new(domain)).into()
    }

    pub fn scale(scale: Scale) -> Self {
        ValueKind::Scale(Heap::new(scale)).into()
    }

    pub fn plot(plot: Plot) -> Self {
        ValueKind::Plot(Heap::new(plot)).into()
    }

    pub fn calculator(calculator: Calculator) -> Self {
        ValueKind::Calculator(Heap::new(calculator)).into()
    }

    pub fn input(input: Input) -> Self {
        ValueKind::Input(Heap::new(input)).into()
    }

    pub fn table_chart(table: TableChart) -> Self {
        ValueKind::TableChart(Heap::new(table)).into()
    }

    pub fn kind(&self) -> &ValueKind {
        &self.kind
    }

    pub fn tags(&self) -> Option<&ValueTags> {
        self.tags.as_deref()
    }

    /// The same payload with `tags` merged over the existing ones.
    #[must_use]
    pub fn with_tags(&self, tags: &ValueTags) -> Value {
        let merged = match self.tags() {
            Some(existing) => existing.merge(tags),
            None => tags.clone(),
        };
        self.replace_tags(merged)
    }

    /// The same payload with exactly `tags`.
    #[must_use]
    pub fn replace_tags(&self, tags: ValueTags) -> Value {
        Value {
            kind: self.kind.clone(),
            tags: (!tags.is_empty()).then(|| Heap::new(tags)),
        }
    }

    /// Address of the heap payload, for sharing-aware serialization.
    pub fn heap_address(&self) -> Option<usize> {
        match &self.kind {
            ValueKind::Void
            | ValueKind::Number(_)
            | ValueKind::Bool(_)
            | ValueKind::Date(_)
            | ValueKind::Duration(_) => None,
            ValueKind::String(h) => Some(h.address()),
            ValueKind::Array(h) => Some(h.address()),
            ValueKind::Dict(h) => Some(h.address()),
            ValueKind::Lambda(h) => Some(h.address()),
            ValueKind::Dist(h) => Some(h.address()),
            ValueKind::Domain(h) => Some(h.address()),
            ValueKind::Scale(h) => Some(h.address()),
            ValueKind::Plot(h) => Some(h.address()),
            ValueKind::Calculator(h) => Some(h.address()),
            ValueKind::Input(h) => Some(h.address()),
            ValueKind::TableChart(h) => Some(h.address()),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match &self.kind {
            ValueKind::Void => "Void",
            ValueKind::Number(_) => "Number",
            ValueKind::Bool(_) => "Boolean",
            ValueKind::String(_) => "String",
            ValueKind::Date(_) => "Date",
            ValueKind::Duration(_) => "Duration",
            ValueKind::Array(_) => "List",
            ValueKind::Dict(_) => "Dict",
            ValueKind::Lambda(_) => "Lambda",
            ValueKind::Dist(_) => "Dist",
            ValueKind::Domain(_) => "Domain",
            ValueKind::Scale(_) => "Scale",
            ValueKind::Plot(_) => "Plot",
            ValueKind::Calculator(_) => "Calculator",
            ValueKind::Input(_) => "Input",
            ValueKind::TableChart(_) => "TableChart",
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self.kind, ValueKind::Void)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self.kind {
            ValueKind::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.kind {
            ValueKind::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.kind {
            ValueKind::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match &self.kind {
            ValueKind::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&ValueMap> {
        match &self.kind {
            ValueKind::Dict(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_lambda(&self) -> Option<&Lambda> {
        match &self.kind {
            ValueKind::Lambda(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_dist(&self) -> Option<&Dist> {
        match &self.kind {
            ValueKind::Dist(d) => Some(d),
            _ => None,
        }
    }

    /// The language's `==`: structural, tag-blind, and false for values
    /// without a meaningful notion of equality (lambdas, plots).
    pub fn is_equal(&self, other: &Value) -> bool {
        match (&self.kind, &other.kind) {
            (ValueKind::Array(a), ValueKind::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.is_equal(y))
            }
            (ValueKind::Dict(a), ValueKind::Dict(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).is_some_and(|w| v.is_equal(w)))
            }
            (
                ValueKind::Lambda(_)
                | ValueKind::Plot(_)
                | ValueKind::Calculator(_)
                | ValueKind::TableChart(_),
                _,
            ) => false,
            (a, b) => a == b,
        }
    }
}

/// `Mon Jan 01 2024`, or `Invalid Date` outside chrono's range.
pub(crate) fn format_date(ms: f64) -> String {
    if !ms.is_finite() {
        return "Invalid Date".to_string();
    }
    match DateTime::from_timestamp_millis(ms as i64) {
        Some(date) => date.format("%a %b %d %Y").to_string(),
        None => "Invalid Date".to_string(),
    }
}

/// Largest whole unit first: `3 days`, `1.5 hours`, `250 ms`.
pub(crate) fn format_duration(ms: f64) -> String {
    let units = [
        (MS_PER_YEAR, "years"),
        (MS_PER_DAY, "days"),
        (MS_PER_HOUR, "hours"),
        (MS_PER_MINUTE, "minutes"),
        (MS_PER_SECOND, "seconds"),
    ];
    for (size, name) in units {
        if ms.abs() >= size {
            return format!("{} {name}", sq_ir::format_number(ms / size));
        }
    }
    format!("{} ms", sq_ir::format_number(ms))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ValueKind::Void => f.write_str("()"),
            ValueKind::Number(n) => f.write_str(&sq_ir::format_number(*n)),
            ValueKind::Bool(b) => write!(f, "{b}"),
            ValueKind::String(s) => write!(f, "'{}'", s.as_str()),
            ValueKind::Date(ms) => f.write_str(&format_date(*ms)),
            ValueKind::Duration(ms) => f.write_str(&format_duration(*ms)),
            ValueKind::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            ValueKind::Dict(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
            ValueKind::Lambda(lambda) => write!(f, "{lambda}"),
            ValueKind::Dist(dist) => write!(f, "{dist}"),
            ValueKind::Domain(domain) => write!(f, "{domain}"),
            ValueKind::Scale(scale) => match scale.kind {
                ScaleKind::Linear => f.write_str("Linear scale"),
                ScaleKind::Log => f.write_str("Logarithmic scale"),
                ScaleKind::Symlog { .. } => f.write_str("Symlog scale"),
                ScaleKind::Power { exponent } => {
                    write!(f, "Power scale ({})", sq_ir::format_number(exponent))
                }
                ScaleKind::Date => f.write_str("Date scale"),
            },
            ValueKind::Plot(plot) => match &**plot {
                Plot::Distributions { distributions, .. } => {
                    let names: Vec<&str> = distributions
                        .iter()
                        .map(|d| d.name.as_deref().unwrap_or(""))
                        .collect();
                    write!(f, "Plot containing {}", names.join(", "))
                }
                Plot::NumericFn { function, .. } => {
                    write!(f, "Plot for numeric function {function}")
                }
            },
            ValueKind::Calculator(_) => f.write_str("Calculator"),
            ValueKind::Input(input) => write!(f, "Input({})", input.name),
            ValueKind::TableChart(table) => write!(
                f,
                "Table with {}x{} elements",
                table.data.len(),
                table.columns.len()
            ),
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
