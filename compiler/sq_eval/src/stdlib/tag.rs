//! `Tag.*`: decorators that attach metadata, and their getters.
//!
//! Every decorator takes the decorated value first. Tags never change a
//! value's identity for equality purposes.

use sq_value::{EvalError, FnDefinition, FrType as T, Value, ValueTags};

use super::{boolean, string};
use crate::Registry;

fn tagged(args: &[Value], tags: ValueTags) -> Result<Value, EvalError> {
    Ok(args[0].with_tags(&tags))
}

fn tags(value: &Value) -> ValueTags {
    value.tags().cloned().unwrap_or_default()
}

fn optional_string(value: Option<String>) -> Value {
    value.map_or_else(Value::void, Value::string)
}

pub(super) fn register(registry: &mut Registry) {
    registry.define_decorator(
        "Tag.name",
        vec![FnDefinition::new(vec![T::Any, T::String], |a, _| {
            let name = Some(string(a, 1)?.to_string());
            tagged(a, ValueTags { name, ..ValueTags::default() })
        })],
    );
    registry.define_decorator(
        "Tag.doc",
        vec![FnDefinition::new(vec![T::Any, T::String], |a, _| {
            let doc = Some(string(a, 1)?.to_string());
            tagged(a, ValueTags { doc, ..ValueTags::default() })
        })],
    );
    registry.define_decorator(
        "Tag.description",
        vec![FnDefinition::new(vec![T::Any, T::String], |a, _| {
            let description = Some(string(a, 1)?.to_string());
            tagged(a, ValueTags { description, ..ValueTags::default() })
        })],
    );
    registry.define_decorator(
        "Tag.format",
        vec![FnDefinition::new(vec![T::Any, T::String], |a, _| {
            let format = Some(string(a, 1)?.to_string());
            tagged(a, ValueTags { format, ..ValueTags::default() })
        })],
    );
    registry.define_decorator(
        "Tag.showAs",
        vec![FnDefinition::new(vec![T::Any, T::Any], |a, _| {
            let show_as = Some(a[1].clone());
            tagged(a, ValueTags { show_as, ..ValueTags::default() })
        })],
    );
    registry.define_decorator(
        "Tag.hide",
        vec![FnDefinition::new(
            vec![T::Any, T::Optional(Box::new(T::Bool))],
            |a, _| {
                let hidden = match a.get(1) {
                    Some(_) => boolean(a, 1)?,
                    None => true,
                };
                tagged(a, ValueTags { hidden: Some(hidden), ..ValueTags::default() })
            },
        )],
    );

    registry.define(
        "Tag.getName",
        vec![FnDefinition::new(vec![T::Any], |a, _| {
            Ok(optional_string(tags(&a[0]).name))
        })],
    );
    registry.define(
        "Tag.getDoc",
        vec![FnDefinition::new(vec![T::Any], |a, _| {
            Ok(optional_string(tags(&a[0]).doc))
        })],
    );
    registry.define(
        "Tag.getDescription",
        vec![FnDefinition::new(vec![T::Any], |a, _| {
            Ok(optional_string(tags(&a[0]).description))
        })],
    );
    registry.define(
        "Tag.getFormat",
        vec![FnDefinition::new(vec![T::Any], |a, _| {
            Ok(optional_string(tags(&a[0]).format))
        })],
    );
    registry.define(
        "Tag.getShowAs",
        vec![FnDefinition::new(vec![T::Any], |a, _| {
            Ok(tags(&a[0]).show_as.unwrap_or_else(Value::void))
        })],
    );
    registry.define(
        "Tag.getHide",
        vec![FnDefinition::new(vec![T::Any], |a, _| {
            Ok(Value::bool(tags(&a[0]).hidden.unwrap_or(false)))
        })],
    );
    registry.define(
        "Tag.clear",
        vec![FnDefinition::new(vec![T::Any], |a, _| {
            Ok(a[0].replace_tags(ValueTags::default()))
        })],
    );
}
