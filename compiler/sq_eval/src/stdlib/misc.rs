//! Indexing, strings and introspection.

use sq_compile::INDEX_LOOKUP;
use sq_value::{ErrorMessage, FnDefinition, FrType as T, Value};

use super::{array, dict, number, string};
use crate::Registry;

pub(super) fn register(registry: &mut Registry) {
    registry.define(
        INDEX_LOOKUP,
        vec![
            FnDefinition::new(vec![T::Array(Box::new(T::Any)), T::Number], |a, _| {
                let items = array(a, 0)?;
                let index = number(a, 1)?;
                let found = if index >= 0.0 && index.fract() == 0.0 {
                    items.get(index as usize)
                } else {
                    None
                };
                found.cloned().ok_or_else(|| {
                    ErrorMessage::ArrayIndexNotFound {
                        index,
                        len: items.len(),
                    }
                    .into()
                })
            }),
            FnDefinition::new(vec![T::Dict, T::String], |a, _| {
                let key = string(a, 1)?;
                dict(a, 0)?
                    .get(key)
                    .cloned()
                    .ok_or_else(|| ErrorMessage::RecordPropertyNotFound(key.to_string()).into())
            }),
        ],
    );

    registry.define(
        "String.concat",
        vec![FnDefinition::new(vec![T::String, T::Any], |a, _| {
            let mut s = string(a, 0)?.to_string();
            match a[1].as_str() {
                Some(rhs) => s.push_str(rhs),
                None => s.push_str(&a[1].to_string()),
            }
            Ok(Value::string(s))
        })],
    );
    registry.define(
        "String.make",
        vec![FnDefinition::new(vec![T::Any], |a, _| {
            Ok(Value::string(match a[0].as_str() {
                Some(s) => s.to_string(),
                None => a[0].to_string(),
            }))
        })],
    );

    registry.define(
        "typeOf",
        vec![FnDefinition::new(vec![T::Any], |a, _| {
            Ok(Value::string(a[0].type_name()))
        })],
    );
    registry.define(
        "inspect",
        vec![FnDefinition::new(
            vec![T::Any, T::Optional(Box::new(T::String))],
            |a, _| {
                match a.get(1) {
                    Some(_) => tracing::info!(label = string(a, 1)?, value = %a[0], "inspect"),
                    None => tracing::info!(value = %a[0], "inspect"),
                }
                Ok(a[0].clone())
            },
        )],
    );
}

