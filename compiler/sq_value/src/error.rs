//! Runtime errors.
//!
//! An [`EvalError`] is a message-only [`ErrorMessage`] plus the
//! [`StackTrace`] captured when it first crossed a call site. Builtins
//! return errors with an empty trace; the reducer fills it in.

use std::fmt;

use sq_diagnostic::{Diagnostic, ErrorCode};
use sq_dist::{DistError, OperationError};

use crate::Location;

#[derive(Clone, Debug, PartialEq)]
pub enum ErrorMessage {
    Arity { expected: usize, got: usize },
    SymbolNotFound(String),
    NotAFunction(String),
    NotADecorator(String),
    ArrayIndexNotFound { index: f64, len: usize },
    RecordPropertyNotFound(String),
    ExpectedType { expected: String, got: String },
    ArgumentDomainError { parameter: String, domain: String, value: String },
    DistributionError(DistError),
    OperationError(OperationError),
    StackOverflow { limit: usize },
    Other(String),
}

impl ErrorMessage {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            ErrorMessage::Arity { .. } => ErrorCode::E6001,
            ErrorMessage::SymbolNotFound(_) => ErrorCode::E6002,
            ErrorMessage::NotAFunction(_) | ErrorMessage::NotADecorator(_) => ErrorCode::E6003,
            ErrorMessage::ArrayIndexNotFound { .. } | ErrorMessage::RecordPropertyNotFound(_) => {
                ErrorCode::E6004
            }
            ErrorMessage::ArgumentDomainError { .. } => ErrorCode::E6005,
            ErrorMessage::DistributionError(_) | ErrorMessage::OperationError(_) => {
                ErrorCode::E6006
            }
            ErrorMessage::ExpectedType { .. } => ErrorCode::E6007,
            ErrorMessage::StackOverflow { .. } => ErrorCode::E6008,
            ErrorMessage::Other(_) => ErrorCode::E6099,
        }
    }
}

impl fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorMessage::Arity { expected, got } => write!(
                f,
                "{expected} arguments expected. Instead {got} argument(s) were passed."
            ),
            ErrorMessage::SymbolNotFound(name) => write!(f, "{name} is not defined"),
            ErrorMessage::NotAFunction(value) => write!(f, "{value} is not a function"),
            ErrorMessage::NotADecorator(value) => write!(f, "{value} is not a decorator"),
            ErrorMessage::ArrayIndexNotFound { index, len } => write!(
                f,
                "Array index not found: {} (length {len})",
                sq_ir::format_number(*index)
            ),
            ErrorMessage::RecordPropertyNotFound(key) => {
                write!(f, "Dict property not found: {key}")
            }
            ErrorMessage::ExpectedType { expected, got } => {
                write!(f, "Expected type: {expected} but got: {got}")
            }
            ErrorMessage::ArgumentDomainError {
                parameter,
                domain,
                value,
            } => write!(
                f,
                "Parameter {parameter} must be in domain {domain}, got {value}"
            ),
            ErrorMessage::DistributionError(err) => write!(f, "Distribution Math Error: {err}"),
            ErrorMessage::OperationError(err) => write!(f, "Math Error: {err}"),
            ErrorMessage::StackOverflow { limit } => {
                write!(f, "Maximum call stack size exceeded ({limit} calls)")
            }
            ErrorMessage::Other(message) => f.write_str(message),
        }
    }
}

impl From<DistError> for ErrorMessage {
    fn from(err: DistError) -> Self {
        match err {
            DistError::OperationError(op) => ErrorMessage::OperationError(op),
            other => ErrorMessage::DistributionError(other),
        }
    }
}

impl From<OperationError> for ErrorMessage {
    fn from(err: OperationError) -> Self {
        ErrorMessage::OperationError(err)
    }
}

/// One call in the chain leading to an error, innermost first.
#[derive(Clone, Debug, PartialEq)]
pub struct StackFrame {
    pub name: String,
    pub location: Option<Location>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct StackTrace {
    frames: Vec<StackFrame>,
}

impl StackTrace {
    pub fn new(frames: Vec<StackFrame>) -> Self {
        StackTrace { frames }
    }

    pub fn frames(&self) -> &[StackFrame] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// One line per frame, positions rendered by `position`.
    pub fn lines(&self, position: impl Fn(&Location) -> String) -> Vec<String> {
        self.frames
            .iter()
            .map(|frame| match &frame.location {
                Some(location) => format!("at {} ({})", frame.name, position(location)),
                None => format!("at {}", frame.name),
            })
            .collect()
    }
}

impl fmt::Display for StackTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines(|l| format!("{}:{}", l.source_id, l.span)) {
            writeln!(f, "  {line}")?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EvalError {
    pub message: ErrorMessage,
    pub trace: StackTrace,
}

impl EvalError {
    pub fn new(message: ErrorMessage) -> Self {
        EvalError {
            message,
            trace: StackTrace::default(),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        EvalError::new(ErrorMessage::Other(message.into()))
    }

    /// Attach `trace` unless one was attached closer to the throw site.
    #[must_use]
    pub fn with_trace_if_missing(mut self, trace: impl FnOnce() -> StackTrace) -> Self {
        if self.trace.is_empty() {
            self.trace = trace();
        }
        self
    }

    /// Error plus one note per frame. The innermost frame in `source_id`
    /// becomes the primary label.
    pub fn to_diagnostic(&self, source_id: &str, position: impl Fn(&Location) -> String) -> Diagnostic {
        let mut diagnostic = Diagnostic::error(self.message.error_code())
            .with_message(self.message.to_string());
        let primary = self
            .trace
            .frames()
            .iter()
            .filter_map(|frame| frame.location.as_ref())
            .find(|location| location.source_id == source_id);
        if let Some(location) = primary {
            diagnostic = diagnostic.with_label(location.span, "error occurred here");
        }
        for line in self.trace.lines(position) {
            diagnostic = diagnostic.with_note(line);
        }
        diagnostic
    }
}

impl From<ErrorMessage> for EvalError {
    fn from(message: ErrorMessage) -> Self {
        EvalError::new(message)
    }
}

impl From<DistError> for EvalError {
    fn from(err: DistError) -> Self {
        EvalError::new(err.into())
    }
}

impl From<OperationError> for EvalError {
    fn from(err: OperationError) -> Self {
        EvalError::new(err.into())
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if !self.trace.is_empty() {
            write!(f, "\nStack trace:\n{}", self.trace)?;
        }
        Ok(())
    }
}

impl std::error::Error for EvalError {}

#[cfg(test)]
mod tests {
    use super::*;
    use sq_ir::Span;

    #[test]
    fn test_arity_message() {
        let err = ErrorMessage::Arity {
            expected: 2,
            got: 1,
        };
        assert_eq!(
            err.to_string(),
            "2 arguments expected. Instead 1 argument(s) were passed."
        );
        assert_eq!(err.error_code(), ErrorCode::E6001);
    }

    #[test]
    fn test_dist_errors_split() {
        let op: ErrorMessage = DistError::OperationError(OperationError::DivisionByZero).into();
        assert_eq!(op, ErrorMessage::OperationError(OperationError::DivisionByZero));
        let dist: ErrorMessage = DistError::TooFewSamples.into();
        assert!(matches!(dist, ErrorMessage::DistributionError(_)));
    }

    #[test]
    fn test_trace_attached_once() {
        let frame = |name: &str| StackFrame {
            name: name.to_string(),
            location: None,
        };
        let err = EvalError::other("boom")
            .with_trace_if_missing(|| StackTrace::new(vec![frame("inner")]))
            .with_trace_if_missing(|| StackTrace::new(vec![frame("outer")]));
        assert_eq!(err.trace.frames()[0].name, "inner");
        assert_eq!(err.to_string(), "boom\nStack trace:\n  at inner\n");
    }

    #[test]
    fn test_to_diagnostic() {
        let err = EvalError {
            message: ErrorMessage::SymbolNotFound("x".to_string()),
            trace: StackTrace::new(vec![StackFrame {
                name: "f".to_string(),
                location: Some(Location {
                    source_id: "main".to_string(),
                    span: Span::new(3, 7),
                }),
            }]),
        };
        let diagnostic = err.to_diagnostic("main", |l| l.span.to_string());
        assert_eq!(diagnostic.code, ErrorCode::E6002);
        assert_eq!(diagnostic.primary_span(), Some(Span::new(3, 7)));
        assert_eq!(diagnostic.notes, vec!["at f (3..7)".to_string()]);
    }
}
