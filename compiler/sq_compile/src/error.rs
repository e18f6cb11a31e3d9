//! Compile errors.

use sq_diagnostic::{Diagnostic, ErrorCode};
use sq_ir::Span;

#[derive(Clone, Eq, PartialEq, Hash, Debug, thiserror::Error)]
pub enum CompileError {
    #[error("`{name}` is not defined")]
    UndefinedName { name: String, span: Span },

    #[error("Exports aren't allowed in blocks")]
    ExportInBlock { span: Span },

    #[error("Unknown decorator `@{name}`")]
    UnknownDecorator { name: String, span: Span },

    #[error("{expected} arguments expected. Instead {given} argument(s) were passed.")]
    ArityMismatch {
        expected: usize,
        given: usize,
        span: Span,
    },

    #[error("Unknown unit `{unit}`")]
    InvalidUnit { unit: String, span: Span },

    /// Each entry renders one constraint as `variables :: units`.
    #[error("Conflicting unit types:\n\t{}", .conflicts.join("\n\t"))]
    ConflictingUnitTypes { conflicts: Vec<String>, span: Span },
}

impl CompileError {
    pub fn span(&self) -> Span {
        match self {
            CompileError::UndefinedName { span, .. }
            | CompileError::ExportInBlock { span }
            | CompileError::UnknownDecorator { span, .. }
            | CompileError::ArityMismatch { span, .. }
            | CompileError::InvalidUnit { span, .. }
            | CompileError::ConflictingUnitTypes { span, .. } => *span,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            CompileError::UndefinedName { .. } | CompileError::InvalidUnit { .. } => {
                ErrorCode::E2001
            }
            CompileError::ExportInBlock { .. } => ErrorCode::E2002,
            CompileError::ArityMismatch { .. } => ErrorCode::E2003,
            CompileError::UnknownDecorator { .. } => ErrorCode::E2004,
            CompileError::ConflictingUnitTypes { .. } => ErrorCode::E2005,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let label = match self {
            CompileError::UndefinedName { .. } => "not found in this scope",
            CompileError::ExportInBlock { .. } => "move this to the top level",
            CompileError::UnknownDecorator { .. } => "no `Tag` function with this name",
            CompileError::ArityMismatch { .. } => "wrong number of arguments",
            CompileError::InvalidUnit { .. } => "unit has no conversion function",
            CompileError::ConflictingUnitTypes { .. } => "these unit types can't all hold",
        };
        Diagnostic::error(self.code())
            .with_message(self.to_string())
            .with_label(self.span(), label)
    }
}
