//! The wire format.

use std::fmt;

use serde::{Deserialize, Serialize};
use sq_dist::Dist;
use sq_ir::Expression;
use sq_value::{ExportData, Input, Location, Scale};

use crate::SerializationError;

/// Which table an index points into.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Value,
    Expression,
    Lambda,
    Tags,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::Value => "value",
            EntityKind::Expression => "expression",
            EntityKind::Lambda => "lambda",
            EntityKind::Tags => "tags",
        })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entrypoint {
    pub kind: EntityKind,
    pub pos: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Bundle {
    pub values: Vec<SerializedValueEntry>,
    pub expressions: Vec<Expression>,
    pub lambdas: Vec<SerializedLambda>,
    pub tags: Vec<SerializedTags>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SerializedValueEntry {
    pub value: SerializedValue,
    /// Index into `Bundle::tags`.
    pub tags: Option<usize>,
}

/// Value payloads. `usize` fields are indices into the bundle's tables:
/// values unless the field says otherwise.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SerializedValue {
    Void,
    Number(f64),
    Bool(bool),
    String(String),
    Date(f64),
    Duration(f64),
    Array(Vec<usize>),
    Dict(Vec<(String, usize)>),
    /// Index into `Bundle::lambdas`.
    Lambda(usize),
    Dist(Dist),
    Domain(sq_value::Domain),
    Scale(Scale),
    Plot(SerializedPlot),
    Calculator(SerializedCalculator),
    Input(Input),
    TableChart(SerializedTable),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SerializedLambda {
    Builtin {
        name: String,
    },
    User {
        name: Option<String>,
        parameters: Vec<SerializedParameter>,
        /// Index into `Bundle::expressions`.
        body: usize,
        captures: Vec<usize>,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SerializedParameter {
    pub name: String,
    /// A `Domain` value.
    pub domain: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SerializedTags {
    pub name: Option<String>,
    pub doc: Option<String>,
    pub description: Option<String>,
    pub show_as: Option<usize>,
    pub format: Option<String>,
    pub hidden: Option<bool>,
    pub export_data: Option<ExportData>,
    pub location: Option<Location>,
}

/// Lambda fields index `Bundle::lambdas`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SerializedPlot {
    Distributions {
        distributions: Vec<(Option<String>, Dist)>,
        x_scale: Scale,
        y_scale: Scale,
        show_summary: bool,
    },
    NumericFn {
        function: usize,
        x_scale: Scale,
        y_scale: Scale,
        points: Option<usize>,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SerializedCalculator {
    pub function: usize,
    pub inputs: Vec<Input>,
    pub autorun: bool,
    pub title: Option<String>,
    pub description: Option<String>,
    pub sample_count: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SerializedTable {
    pub data: Vec<usize>,
    /// Column name and lambda index.
    pub columns: Vec<(Option<String>, usize)>,
}

impl Bundle {
    pub fn to_bytes(&self) -> Result<Vec<u8>, SerializationError> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Bundle, SerializationError> {
        Ok(bincode::deserialize(bytes)?)
    }

    /// Pretty-printed JSON, for inspection only: non-finite numbers are
    /// written as `null`.
    pub fn to_json(&self) -> Result<String, SerializationError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Total entries across all tables.
    pub fn len(&self) -> usize {
        self.values.len() + self.expressions.len() + self.lambdas.len() + self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
