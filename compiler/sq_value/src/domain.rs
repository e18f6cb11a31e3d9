//! Parameter domains: the ranges a lambda parameter accepts.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::format_date;
use crate::{ErrorMessage, Value, ValueKind};

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Domain {
    NumericRange { min: f64, max: f64 },
    /// Bounds in milliseconds since the epoch.
    DateRange { min: f64, max: f64 },
}

impl Domain {
    /// A domain from an annotation value: a domain itself, or a
    /// two-element list of numbers or dates.
    pub fn from_annotation(value: &Value) -> Result<Domain, ErrorMessage> {
        match value.kind() {
            ValueKind::Domain(domain) => Ok(**domain),
            ValueKind::Array(items) if items.len() == 2 => {
                match (items[0].kind(), items[1].kind()) {
                    (ValueKind::Number(min), ValueKind::Number(max)) => {
                        Domain::numeric_range(*min, *max)
                    }
                    (ValueKind::Date(min), ValueKind::Date(max)) => {
                        if min > max {
                            return Err(ErrorMessage::Other(
                                "The range minimum must be lower than the range maximum"
                                    .to_string(),
                            ));
                        }
                        Ok(Domain::DateRange {
                            min: *min,
                            max: *max,
                        })
                    }
                    _ => Err(ErrorMessage::Other(
                        "Only numeric and date ranges are supported as domains".to_string(),
                    )),
                }
            }
            _ => Err(ErrorMessage::Other(format!(
                "Expected a domain, got {}",
                value.type_name()
            ))),
        }
    }

    pub fn numeric_range(min: f64, max: f64) -> Result<Domain, ErrorMessage> {
        if min > max {
            return Err(ErrorMessage::Other(
                "The range minimum must be lower than the range maximum".to_string(),
            ));
        }
        Ok(Domain::NumericRange { min, max })
    }

    pub fn contains(&self, value: &Value) -> bool {
        match (self, value.kind()) {
            (Domain::NumericRange { min, max }, ValueKind::Number(x))
            | (Domain::DateRange { min, max }, ValueKind::Date(x)) => x >= min && x <= max,
            _ => false,
        }
    }

    /// An `ArgumentDomainError` unless `value` lies in the domain.
    pub fn validate(&self, parameter: &str, value: &Value) -> Result<(), ErrorMessage> {
        if self.contains(value) {
            Ok(())
        } else {
            Err(ErrorMessage::ArgumentDomainError {
                parameter: parameter.to_string(),
                domain: self.to_string(),
                value: value.to_string(),
            })
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::NumericRange { min, max } => write!(
                f,
                "Number.rangeDomain({}, {})",
                sq_ir::format_number(*min),
                sq_ir::format_number(*max)
            ),
            Domain::DateRange { min, max } => write!(
                f,
                "Date.rangeDomain({}, {})",
                format_date(*min),
                format_date(*max)
            ),
        }
    }
}
