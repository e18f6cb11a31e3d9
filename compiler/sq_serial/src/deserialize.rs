use std::sync::Arc;

use sq_eval::Registry;
use sq_ir::Expression;
use sq_value::{
    Calculator, Lambda, LabeledDist, LambdaParameter, Plot, TableChart, TableColumn, UserLambda,
    Value, ValueKind, ValueMap, ValueTags,
};

use crate::{
    Bundle, EntityKind, Entrypoint, SerializationError, SerializedLambda, SerializedPlot,
    SerializedValue,
};

#[derive(Clone)]
enum Slot {
    Empty,
    InProgress,
    Done(Value),
}

/// Rebuilds values from a [`Bundle`].
///
/// Each value entry is materialized once, so entries referenced from
/// several places come back as one shared allocation.
pub struct Deserializer<'a> {
    bundle: &'a Bundle,
    registry: &'a Registry,
    values: Vec<Slot>,
    bodies: Vec<Option<Arc<Expression>>>,
}

type Result<T> = std::result::Result<T, SerializationError>;

fn entry<'b, T>(table: &'b [T], kind: EntityKind, index: usize) -> Result<&'b T> {
    table.get(index).ok_or(SerializationError::OutOfBounds {
        kind,
        index,
        len: table.len(),
    })
}

impl<'a> Deserializer<'a> {
    pub fn new(bundle: &'a Bundle, registry: &'a Registry) -> Self {
        Deserializer {
            bundle,
            registry,
            values: vec![Slot::Empty; bundle.values.len()],
            bodies: vec![None; bundle.expressions.len()],
        }
    }

    pub fn value_at(&mut self, entrypoint: Entrypoint) -> Result<Value> {
        if entrypoint.kind != EntityKind::Value {
            return Err(SerializationError::TypeMismatch { expected: "value" });
        }
        self.value(entrypoint.pos)
    }

    pub fn expression_at(&mut self, entrypoint: Entrypoint) -> Result<Expression> {
        if entrypoint.kind != EntityKind::Expression {
            return Err(SerializationError::TypeMismatch {
                expected: "expression",
            });
        }
        entry(&self.bundle.expressions, EntityKind::Expression, entrypoint.pos).cloned()
    }

    fn value(&mut self, index: usize) -> Result<Value> {
        match entry(&self.values, EntityKind::Value, index)? {
            Slot::Done(value) => return Ok(value.clone()),
            Slot::InProgress => {
                return Err(SerializationError::Decode(format!(
                    "value {index} refers to itself"
                )))
            }
            Slot::Empty => {}
        }
        self.values[index] = Slot::InProgress;
        let result = self.build_value(index);
        self.values[index] = match &result {
            Ok(value) => Slot::Done(value.clone()),
            Err(_) => Slot::Empty,
        };
        result
    }

    fn build_value(&mut self, index: usize) -> Result<Value> {
        let bundle = self.bundle;
        let serialized = entry(&bundle.values, EntityKind::Value, index)?;
        let value = match &serialized.value {
            SerializedValue::Void => Value::void(),
            SerializedValue::Number(n) => Value::number(*n),
            SerializedValue::Bool(b) => Value::bool(*b),
            SerializedValue::String(s) => Value::string(s.as_str()),
            SerializedValue::Date(ms) => Value::date(*ms),
            SerializedValue::Duration(ms) => Value::duration(*ms),
            SerializedValue::Array(items) => Value::array(
                items
                    .iter()
                    .map(|&item| self.value(item))
                    .collect::<Result<_>>()?,
            ),
            SerializedValue::Dict(pairs) => {
                let mut map = ValueMap::with_capacity(pairs.len());
                for (key, item) in pairs {
                    map.insert(key.clone(), self.value(*item)?);
                }
                Value::dict(map)
            }
            SerializedValue::Lambda(lambda) => Value::lambda(self.lambda(*lambda)?),
            SerializedValue::Dist(dist) => Value::dist(dist.clone()),
            SerializedValue::Domain(domain) => Value::domain(*domain),
            SerializedValue::Scale(scale) => Value::scale(scale.clone()),
            SerializedValue::Plot(plot) => Value::plot(match plot {
                SerializedPlot::Distributions {
                    distributions,
                    x_scale,
                    y_scale,
                    show_summary,
                } => Plot::Distributions {
                    distributions: distributions
                        .iter()
                        .map(|(name, dist)| LabeledDist {
                            name: name.clone(),
                            dist: dist.clone(),
                        })
                        .collect(),
                    x_scale: x_scale.clone(),
                    y_scale: y_scale.clone(),
                    show_summary: *show_summary,
                },
                SerializedPlot::NumericFn {
                    function,
                    x_scale,
                    y_scale,
                    points,
                } => Plot::NumericFn {
                    function: self.lambda(*function)?,
                    x_scale: x_scale.clone(),
                    y_scale: y_scale.clone(),
                    points: *points,
                },
            }),
            SerializedValue::Calculator(calculator) => Value::calculator(Calculator {
                function: self.lambda(calculator.function)?,
                inputs: calculator.inputs.clone(),
                autorun: calculator.autorun,
                title: calculator.title.clone(),
                description: calculator.description.clone(),
                sample_count: calculator.sample_count,
            }),
            SerializedValue::Input(input) => Value::input(input.clone()),
            SerializedValue::TableChart(table) => {
                let data = table
                    .data
                    .iter()
                    .map(|&item| self.value(item))
                    .collect::<Result<_>>()?;
                let mut columns = Vec::with_capacity(table.columns.len());
                for (name, function) in &table.columns {
                    columns.push(TableColumn {
                        name: name.clone(),
                        function: self.lambda(*function)?,
                    });
                }
                Value::table_chart(TableChart { data, columns })
            }
        };
        match serialized.tags {
            Some(tags) => Ok(value.replace_tags(self.tags(tags)?)),
            None => Ok(value),
        }
    }

    fn lambda(&mut self, index: usize) -> Result<Lambda> {
        let bundle = self.bundle;
        match entry(&bundle.lambdas, EntityKind::Lambda, index)? {
            SerializedLambda::Builtin { name } => self
                .registry
                .builtin(name)
                .map(|builtin| Lambda::Builtin(builtin.clone()))
                .ok_or_else(|| SerializationError::UnknownBuiltin(name.clone())),
            SerializedLambda::User {
                name,
                parameters,
                body,
                captures,
            } => {
                let mut rebuilt = Vec::with_capacity(parameters.len());
                for parameter in parameters {
                    let domain = match parameter.domain {
                        Some(domain) => match self.value(domain)?.kind() {
                            ValueKind::Domain(domain) => Some(**domain),
                            _ => return Err(SerializationError::TypeMismatch { expected: "domain" }),
                        },
                        None => None,
                    };
                    rebuilt.push(LambdaParameter {
                        name: parameter.name.clone(),
                        domain,
                    });
                }
                Ok(Lambda::User(UserLambda {
                    name: name.clone(),
                    parameters: rebuilt,
                    body: self.body(*body)?,
                    captures: captures
                        .iter()
                        .map(|&capture| self.value(capture))
                        .collect::<Result<_>>()?,
                }))
            }
        }
    }

    /// Lambda bodies are shared between lambdas built from the same entry.
    fn body(&mut self, index: usize) -> Result<Arc<Expression>> {
        if let Some(Some(body)) = self.bodies.get(index) {
            return Ok(body.clone());
        }
        let body = Arc::new(entry(&self.bundle.expressions, EntityKind::Expression, index)?.clone());
        self.bodies[index] = Some(body.clone());
        Ok(body)
    }

    fn tags(&mut self, index: usize) -> Result<ValueTags> {
        let bundle = self.bundle;
        let tags = entry(&bundle.tags, EntityKind::Tags, index)?;
        let show_as = match tags.show_as {
            Some(value) => Some(self.value(value)?),
            None => None,
        };
        Ok(ValueTags {
            name: tags.name.clone(),
            doc: tags.doc.clone(),
            description: tags.description.clone(),
            show_as,
            format: tags.format.clone(),
            hidden: tags.hidden,
            export_data: tags.export_data.clone(),
            location: tags.location.clone(),
        })
    }
}
