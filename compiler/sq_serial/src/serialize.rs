use std::ptr;

use rustc_hash::FxHashMap;
use sq_ir::Expression;
use sq_value::{Lambda, Plot, Value, ValueKind, ValueTags};

use crate::{
    Bundle, EntityKind, Entrypoint, SerializedCalculator, SerializedLambda, SerializedParameter,
    SerializedPlot, SerializedTable, SerializedTags, SerializedValue, SerializedValueEntry,
};

/// Builds a [`Bundle`] incrementally. Several roots may share one bundle.
///
/// Heap values are keyed by payload address plus tag address, so a value
/// reachable along two paths is stored once. Roots are retained until
/// `finish` so no address is reused while it is a key. Expressions are keyed
/// by structure.
#[derive(Default)]
pub struct Serializer {
    bundle: Bundle,
    roots: Vec<Value>,
    values: FxHashMap<(usize, Option<usize>), usize>,
    lambdas: FxHashMap<usize, usize>,
    expressions: FxHashMap<Expression, usize>,
}

impl Serializer {
    pub fn new() -> Self {
        Serializer::default()
    }

    pub fn value(&mut self, value: &Value) -> Entrypoint {
        self.roots.push(value.clone());
        Entrypoint {
            kind: EntityKind::Value,
            pos: self.value_index(value),
        }
    }

    pub fn expression(&mut self, expression: &Expression) -> Entrypoint {
        Entrypoint {
            kind: EntityKind::Expression,
            pos: self.expression_index(expression),
        }
    }

    pub fn finish(self) -> Bundle {
        tracing::trace!(
            roots = self.roots.len(),
            values = self.bundle.values.len(),
            expressions = self.bundle.expressions.len(),
            lambdas = self.bundle.lambdas.len(),
            "finished bundle"
        );
        self.bundle
    }

    fn value_index(&mut self, value: &Value) -> usize {
        let tag_address = value.tags().map(|tags| ptr::from_ref(tags) as usize);
        let key = value.heap_address().map(|address| (address, tag_address));
        if let Some(index) = key.and_then(|key| self.values.get(&key)) {
            return *index;
        }

        let payload = self.payload(value.kind());
        let tags = value.tags().map(|tags| self.tags_index(tags));
        let index = self.push_value(payload, tags);
        if let Some(key) = key {
            self.values.insert(key, index);
        }
        index
    }

    fn push_value(&mut self, value: SerializedValue, tags: Option<usize>) -> usize {
        let index = self.bundle.values.len();
        self.bundle.values.push(SerializedValueEntry { value, tags });
        index
    }

    fn payload(&mut self, kind: &ValueKind) -> SerializedValue {
        match kind {
            ValueKind::Void => SerializedValue::Void,
            ValueKind::Number(n) => SerializedValue::Number(*n),
            ValueKind::Bool(b) => SerializedValue::Bool(*b),
            ValueKind::String(s) => SerializedValue::String(s.to_string()),
            ValueKind::Date(ms) => SerializedValue::Date(*ms),
            ValueKind::Duration(ms) => SerializedValue::Duration(*ms),
            ValueKind::Array(items) => {
                SerializedValue::Array(items.iter().map(|item| self.value_index(item)).collect())
            }
            ValueKind::Dict(map) => SerializedValue::Dict(
                map.iter()
                    .map(|(key, value)| (key.clone(), self.value_index(value)))
                    .collect(),
            ),
            ValueKind::Lambda(lambda) => SerializedValue::Lambda(self.lambda_index(lambda)),
            ValueKind::Dist(dist) => SerializedValue::Dist((**dist).clone()),
            ValueKind::Domain(domain) => SerializedValue::Domain(**domain),
            ValueKind::Scale(scale) => SerializedValue::Scale((**scale).clone()),
            ValueKind::Plot(plot) => SerializedValue::Plot(match &**plot {
                Plot::Distributions {
                    distributions,
                    x_scale,
                    y_scale,
                    show_summary,
                } => SerializedPlot::Distributions {
                    distributions: distributions
                        .iter()
                        .map(|d| (d.name.clone(), d.dist.clone()))
                        .collect(),
                    x_scale: x_scale.clone(),
                    y_scale: y_scale.clone(),
                    show_summary: *show_summary,
                },
                Plot::NumericFn {
                    function,
                    x_scale,
                    y_scale,
                    points,
                } => SerializedPlot::NumericFn {
                    function: self.lambda_index(function),
                    x_scale: x_scale.clone(),
                    y_scale: y_scale.clone(),
                    points: *points,
                },
            }),
            ValueKind::Calculator(calculator) => {
                SerializedValue::Calculator(SerializedCalculator {
                    function: self.lambda_index(&calculator.function),
                    inputs: calculator.inputs.clone(),
                    autorun: calculator.autorun,
                    title: calculator.title.clone(),
                    description: calculator.description.clone(),
                    sample_count: calculator.sample_count,
                })
            }
            ValueKind::Input(input) => SerializedValue::Input((**input).clone()),
            ValueKind::TableChart(table) => SerializedValue::TableChart(SerializedTable {
                data: table.data.iter().map(|v| self.value_index(v)).collect(),
                columns: table
                    .columns
                    .iter()
                    .map(|c| (c.name.clone(), self.lambda_index(&c.function)))
                    .collect(),
            }),
        }
    }

    fn lambda_index(&mut self, lambda: &Lambda) -> usize {
        let address = ptr::from_ref(lambda) as usize;
        if let Some(index) = self.lambdas.get(&address) {
            return *index;
        }
        let serialized = match lambda {
            Lambda::Builtin(builtin) => SerializedLambda::Builtin {
                name: builtin.name().to_string(),
            },
            Lambda::User(user) => {
                let parameters = user
                    .parameters
                    .iter()
                    .map(|parameter| SerializedParameter {
                        name: parameter.name.clone(),
                        domain: parameter
                            .domain
                            .map(|domain| self.push_value(SerializedValue::Domain(domain), None)),
                    })
                    .collect();
                SerializedLambda::User {
                    name: user.name.clone(),
                    parameters,
                    body: self.expression_index(&user.body),
                    captures: user.captures.iter().map(|v| self.value_index(v)).collect(),
                }
            }
        };
        let index = self.bundle.lambdas.len();
        self.bundle.lambdas.push(serialized);
        self.lambdas.insert(address, index);
        index
    }

    fn expression_index(&mut self, expression: &Expression) -> usize {
        if let Some(index) = self.expressions.get(expression) {
            return *index;
        }
        let index = self.bundle.expressions.len();
        self.bundle.expressions.push(expression.clone());
        self.expressions.insert(expression.clone(), index);
        index
    }

    fn tags_index(&mut self, tags: &ValueTags) -> usize {
        let serialized = SerializedTags {
            name: tags.name.clone(),
            doc: tags.doc.clone(),
            description: tags.description.clone(),
            show_as: tags.show_as.as_ref().map(|v| self.value_index(v)),
            format: tags.format.clone(),
            hidden: tags.hidden,
            export_data: tags.export_data.clone(),
            location: tags.location.clone(),
        };
        let index = self.bundle.tags.len();
        self.bundle.tags.push(serialized);
        index
    }
}
