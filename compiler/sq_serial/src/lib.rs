//! Bundle codec for values and compiled IR.
//!
//! A [`Bundle`] flattens a value graph into per-kind tables that refer to
//! each other by index. Values that share an allocation are written once and
//! come back shared; identical expressions are written once. Builtin lambdas
//! travel as registry names and are looked up again on the way in, so the
//! receiving side needs the same [`sq_eval::Registry`].
//!
//! ```text
//! Value ──Serializer──▶ Bundle + Entrypoint ──bincode/json──▶ bytes
//! bytes ──────────────▶ Bundle + Entrypoint ──Deserializer──▶ Value
//! ```

mod bundle;
mod deserialize;
mod error;
mod serialize;

pub use bundle::{
    Bundle, EntityKind, Entrypoint, SerializedCalculator, SerializedLambda, SerializedParameter,
    SerializedPlot, SerializedTable, SerializedTags, SerializedValue, SerializedValueEntry,
};
pub use deserialize::Deserializer;
pub use error::SerializationError;
pub use serialize::Serializer;

use sq_eval::Registry;
use sq_value::Value;

/// Serialize one value into a fresh bundle.
pub fn serialize_value(value: &Value) -> (Bundle, Entrypoint) {
    let mut serializer = Serializer::new();
    let entrypoint = serializer.value(value);
    (serializer.finish(), entrypoint)
}

/// Inverse of [`serialize_value`].
pub fn deserialize_value(
    bundle: &Bundle,
    entrypoint: Entrypoint,
    registry: &Registry,
) -> Result<Value, SerializationError> {
    Deserializer::new(bundle, registry).value_at(entrypoint)
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
