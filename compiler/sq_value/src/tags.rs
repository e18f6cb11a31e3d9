//! Metadata attached to values by decorators and by the module layer.

use serde::{Deserialize, Serialize};
use sq_ir::Span;

use crate::Value;

/// Where in which module a value was defined.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub source_id: String,
    pub span: Span,
}

/// Provenance of an exported binding.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExportData {
    pub source_id: String,
    pub path: Vec<String>,
}

/// Tags never take part in the language's `==`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValueTags {
    pub name: Option<String>,
    pub doc: Option<String>,
    pub description: Option<String>,
    pub show_as: Option<Value>,
    pub format: Option<String>,
    pub hidden: Option<bool>,
    pub export_data: Option<ExportData>,
    pub location: Option<Location>,
}

impl ValueTags {
    pub fn is_empty(&self) -> bool {
        *self == ValueTags::default()
    }

    /// `other`'s tags win where both are set.
    #[must_use]
    pub fn merge(&self, other: &ValueTags) -> ValueTags {
        ValueTags {
            name: other.name.clone().or_else(|| self.name.clone()),
            doc: other.doc.clone().or_else(|| self.doc.clone()),
            description: other
                .description
                .clone()
                .or_else(|| self.description.clone()),
            show_as: other.show_as.clone().or_else(|| self.show_as.clone()),
            format: other.format.clone().or_else(|| self.format.clone()),
            hidden: other.hidden.or(self.hidden),
            export_data: other
                .export_data
                .clone()
                .or_else(|| self.export_data.clone()),
            location: other.location.clone().or_else(|| self.location.clone()),
        }
    }
}
