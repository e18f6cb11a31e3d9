//! `List.*` and `Dict.*`.

use sq_value::{Context, ErrorMessage, EvalError, FnDefinition, FrType as T, Lambda, Value, ValueMap};

use super::{array, count, dict, lambda, number, returned_bool, string};
use crate::Registry;

type Result = std::result::Result<Value, EvalError>;

/// Call `f` with `item`, adding its index when `f` takes two parameters.
fn call_with_index(context: &mut dyn Context, f: &Lambda, item: &Value, index: usize) -> Result {
    let args = if f.parameter_count() == Some(2) {
        vec![item.clone(), Value::number(index as f64)]
    } else {
        vec![item.clone()]
    };
    context.call(f, args)
}

fn non_empty(args: &[Value]) -> std::result::Result<&[Value], EvalError> {
    let items = array(args, 0)?;
    if items.is_empty() {
        return Err(EvalError::other("List must not be empty"));
    }
    Ok(items)
}

pub(super) fn register(registry: &mut Registry) {
    registry.define(
        "List.make",
        vec![
            FnDefinition::new(vec![T::Number, T::Lambda], |a, c| {
                let n = count(a, 0)?;
                let f = lambda(a, 1)?;
                let mut items = Vec::with_capacity(n);
                for i in 0..n {
                    let args = if f.parameter_count() == Some(1) {
                        vec![Value::number(i as f64)]
                    } else {
                        Vec::new()
                    };
                    items.push(c.call(f, args)?);
                }
                Ok(Value::array(items))
            }),
            FnDefinition::new(vec![T::Number, T::Any], |a, _| {
                Ok(Value::array(vec![a[1].clone(); count(a, 0)?]))
            }),
        ],
    );
    registry.define(
        "List.upTo",
        vec![FnDefinition::new(vec![T::Number, T::Number], |a, _| {
            let (low, high) = (number(a, 0)?, number(a, 1)?);
            if low.fract() != 0.0 || high.fract() != 0.0 {
                return Err(EvalError::other("Low and high values must both be integers"));
            }
            let mut items = Vec::new();
            let mut x = low;
            while x <= high {
                items.push(Value::number(x));
                x += 1.0;
            }
            Ok(Value::array(items))
        })],
    );
    registry.define(
        "List.length",
        vec![FnDefinition::new(vec![T::Array(Box::new(T::Any))], |a, _| {
            Ok(Value::number(array(a, 0)?.len() as f64))
        })],
    );
    registry.define(
        "List.map",
        vec![FnDefinition::new(
            vec![T::Array(Box::new(T::Any)), T::Lambda],
            |a, c| {
                let f = lambda(a, 1)?;
                let mut items = Vec::new();
                for (i, item) in array(a, 0)?.iter().enumerate() {
                    items.push(call_with_index(c, f, item, i)?);
                }
                Ok(Value::array(items))
            },
        )],
    );
    registry.define(
        "List.reduce",
        vec![FnDefinition::new(
            vec![T::Array(Box::new(T::Any)), T::Any, T::Lambda],
            |a, c| {
                let f = lambda(a, 2)?;
                let mut acc = a[1].clone();
                for item in array(a, 0)? {
                    acc = c.call(f, vec![acc, item.clone()])?;
                }
                Ok(acc)
            },
        )],
    );
    registry.define(
        "List.filter",
        vec![FnDefinition::new(
            vec![T::Array(Box::new(T::Any)), T::Lambda],
            |a, c| {
                let f = lambda(a, 1)?;
                let mut items = Vec::new();
                for item in array(a, 0)? {
                    if returned_bool(&c.call(f, vec![item.clone()])?)? {
                        items.push(item.clone());
                    }
                }
                Ok(Value::array(items))
            },
        )],
    );
    registry.define(
        "List.first",
        vec![FnDefinition::new(vec![T::Array(Box::new(T::Any))], |a, _| {
            Ok(non_empty(a)?[0].clone())
        })],
    );
    registry.define(
        "List.last",
        vec![FnDefinition::new(vec![T::Array(Box::new(T::Any))], |a, _| {
            let items = non_empty(a)?;
            Ok(items[items.len() - 1].clone())
        })],
    );
    registry.define(
        "List.reverse",
        vec![FnDefinition::new(vec![T::Array(Box::new(T::Any))], |a, _| {
            Ok(Value::array(array(a, 0)?.iter().rev().cloned().collect()))
        })],
    );
    registry.define(
        "List.concat",
        vec![FnDefinition::new(
            vec![T::Array(Box::new(T::Any)), T::Array(Box::new(T::Any))],
            |a, _| {
                let mut items = array(a, 0)?.to_vec();
                items.extend_from_slice(array(a, 1)?);
                Ok(Value::array(items))
            },
        )],
    );
    registry.define(
        "List.append",
        vec![FnDefinition::new(vec![T::Array(Box::new(T::Any)), T::Any], |a, _| {
            let mut items = array(a, 0)?.to_vec();
            items.push(a[1].clone());
            Ok(Value::array(items))
        })],
    );
    registry.define(
        "List.join",
        vec![FnDefinition::new(
            vec![
                T::Array(Box::new(T::String)),
                T::Optional(Box::new(T::String)),
            ],
            |a, _| {
                let separator = match a.get(1) {
                    Some(_) => string(a, 1)?,
                    None => ",",
                };
                let parts: Vec<&str> = array(a, 0)?.iter().filter_map(Value::as_str).collect();
                Ok(Value::string(parts.join(separator)))
            },
        )],
    );

    registry.define(
        "Dict.keys",
        vec![FnDefinition::new(vec![T::Dict], |a, _| {
            Ok(Value::array(
                dict(a, 0)?.keys().map(|k| Value::string(k.as_str())).collect(),
            ))
        })],
    );
    registry.define(
        "Dict.values",
        vec![FnDefinition::new(vec![T::Dict], |a, _| {
            Ok(Value::array(dict(a, 0)?.values().cloned().collect()))
        })],
    );
    registry.define(
        "Dict.toList",
        vec![FnDefinition::new(vec![T::Dict], |a, _| {
            Ok(Value::array(
                dict(a, 0)?
                    .iter()
                    .map(|(k, v)| Value::array(vec![Value::string(k.as_str()), v.clone()]))
                    .collect(),
            ))
        })],
    );
    registry.define(
        "Dict.fromList",
        vec![FnDefinition::new(
            vec![T::Array(Box::new(T::Array(Box::new(T::Any))))],
            |a, _| {
                let mut map = ValueMap::new();
                for pair in array(a, 0)? {
                    match pair.as_array() {
                        Some([key, value]) => {
                            let key = key.as_str().ok_or_else(|| {
                                EvalError::other("Dict.fromList keys must be strings")
                            })?;
                            map.insert(key.to_string(), value.clone());
                        }
                        _ => return Err(EvalError::other("Dict.fromList expects [key, value] pairs")),
                    }
                }
                Ok(Value::dict(map))
            },
        )],
    );
    registry.define(
        "Dict.set",
        vec![FnDefinition::new(vec![T::Dict, T::String, T::Any], |a, _| {
            let mut map = dict(a, 0)?.clone();
            map.insert(string(a, 1)?.to_string(), a[2].clone());
            Ok(Value::dict(map))
        })],
    );
    registry.define(
        "Dict.merge",
        vec![FnDefinition::new(vec![T::Dict, T::Dict], |a, _| {
            let mut map = dict(a, 0)?.clone();
            for (k, v) in dict(a, 1)? {
                map.insert(k.clone(), v.clone());
            }
            Ok(Value::dict(map))
        })],
    );
    registry.define(
        "Dict.has",
        vec![FnDefinition::new(vec![T::Dict, T::String], |a, _| {
            Ok(Value::bool(dict(a, 0)?.contains_key(string(a, 1)?)))
        })],
    );
    registry.define(
        "Dict.get",
        vec![FnDefinition::new(vec![T::Dict, T::String], |a, _| {
            let key = string(a, 1)?;
            dict(a, 0)?
                .get(key)
                .cloned()
                .ok_or_else(|| ErrorMessage::RecordPropertyNotFound(key.to_string()).into())
        })],
    );
    registry.define(
        "Dict.map",
        vec![FnDefinition::new(vec![T::Dict, T::Lambda], |a, c| {
            let f = lambda(a, 1)?;
            let mut map = ValueMap::new();
            for (k, v) in dict(a, 0)? {
                map.insert(k.clone(), c.call(f, vec![v.clone()])?);
            }
            Ok(Value::dict(map))
        })],
    );
    registry.define(
        "Dict.getOr",
        vec![FnDefinition::new(vec![T::Dict, T::String, T::Any], |a, _| {
            Ok(dict(a, 0)?
                .get(string(a, 1)?)
                .cloned()
                .unwrap_or_else(|| a[2].clone()))
        })],
    );
}
