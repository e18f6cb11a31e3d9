use crate::EntityKind;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SerializationError {
    #[error("{kind} reference {index} is out of bounds (table has {len} entries)")]
    OutOfBounds {
        kind: EntityKind,
        index: usize,
        len: usize,
    },
    #[error("Unknown builtin `{0}`")]
    UnknownBuiltin(String),
    #[error("Expected a {expected} entry")]
    TypeMismatch { expected: &'static str },
    #[error("Could not decode bundle: {0}")]
    Decode(String),
}

impl From<bincode::Error> for SerializationError {
    fn from(err: bincode::Error) -> Self {
        SerializationError::Decode(err.to_string())
    }
}

impl From<serde_json::Error> for SerializationError {
    fn from(err: serde_json::Error) -> Self {
        SerializationError::Decode(err.to_string())
    }
}
