//! Parse error type.

use sq_diagnostic::{Diagnostic, ErrorCode};
use sq_ir::Span;
use sq_lexer::LexErrorKind;

/// A syntax error: where parsing stopped and what was expected there.
///
/// Parsing stops at the first error; there is no recovery.
#[derive(Clone, Eq, PartialEq, Hash, Debug, thiserror::Error)]
#[error("{message}")]
pub struct SyntaxError {
    pub code: ErrorCode,
    pub message: String,
    pub span: Span,
}

impl SyntaxError {
    #[cold]
    pub fn new(code: ErrorCode, message: impl Into<String>, span: Span) -> Self {
        SyntaxError {
            code,
            message: message.into(),
            span,
        }
    }

    /// `Expected <what>, but <found> found.`
    #[cold]
    pub(crate) fn expected(what: &str, found: &sq_lexer::Token) -> Self {
        if let sq_lexer::TokenKind::Error(kind) = &found.kind {
            return Self::from_lex_error(kind, found.span);
        }
        SyntaxError::new(
            ErrorCode::E1001,
            format!("Expected {what}, but {} found.", found.kind.describe()),
            found.span,
        )
    }

    #[cold]
    pub(crate) fn from_lex_error(kind: &LexErrorKind, span: Span) -> Self {
        let code = match kind {
            LexErrorKind::UnexpectedCharacter(_) | LexErrorKind::InvalidNumber => ErrorCode::E0001,
            LexErrorKind::UnterminatedString | LexErrorKind::UnterminatedComment => {
                ErrorCode::E0002
            }
            LexErrorKind::InvalidEscape(_) => ErrorCode::E0003,
        };
        SyntaxError::new(code, kind.to_string(), span)
    }

    /// Convert to a renderable diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.code)
            .with_message(self.message.clone())
            .with_label(self.span, "syntax error")
    }
}
