//! Presentation values: scales, plots, calculators, inputs and tables.
//!
//! The engine only builds and carries these; rendering is someone else's job.

use serde::{Deserialize, Serialize};

use crate::{Lambda, Value};
use sq_dist::Dist;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ScaleKind {
    Linear,
    Log,
    Symlog { constant: f64 },
    Power { exponent: f64 },
    Date,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scale {
    pub kind: ScaleKind,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub tick_format: Option<String>,
    pub title: Option<String>,
}

impl Scale {
    pub fn new(kind: ScaleKind) -> Self {
        Scale {
            kind,
            min: None,
            max: None,
            tick_format: None,
            title: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LabeledDist {
    pub name: Option<String>,
    pub dist: Dist,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Plot {
    Distributions {
        distributions: Vec<LabeledDist>,
        x_scale: Scale,
        y_scale: Scale,
        show_summary: bool,
    },
    NumericFn {
        function: Lambda,
        x_scale: Scale,
        y_scale: Scale,
        points: Option<usize>,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum InputKind {
    Text { default: Option<String> },
    TextArea { default: Option<String> },
    Checkbox { default: Option<bool> },
    Select { options: Vec<String>, default: Option<String> },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Input {
    pub name: String,
    pub description: Option<String>,
    pub kind: InputKind,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Calculator {
    pub function: Lambda,
    pub inputs: Vec<Input>,
    pub autorun: bool,
    pub title: Option<String>,
    pub description: Option<String>,
    pub sample_count: Option<usize>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TableColumn {
    pub name: Option<String>,
    pub function: Lambda,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TableChart {
    pub data: Vec<Value>,
    pub columns: Vec<TableColumn>,
}
