//! Recursive descent parser for Squiggle.
//!
//! Produces a [`SyntaxNode`] tree rooted at a `Program` node. Parsing stops
//! at the first error and reports it as a [`SyntaxError`]; it never panics.
//!
//! Newlines matter only at statement level: inside `(...)` and `[...]` they
//! are ordinary whitespace, while inside a program or `{ ... }` block a token
//! starting a new line ends the current statement unless it is an operator
//! that continues the expression.

mod cursor;
mod error;
mod grammar;

use cursor::Cursor;
use sq_ir::{Span, SyntaxNode};
use sq_lexer::{Token, TokenKind};

pub use error::SyntaxError;

/// Unit suffixes accepted directly after a number literal (`5k`, `10%`).
pub const UNIT_SUFFIXES: &[&str] = &[
    "%", "n", "m", "k", "M", "B", "G", "T", "P", "minutes", "hours", "days", "years",
];

/// Parser state.
pub struct Parser<'a> {
    cursor: Cursor<'a>,
    /// True while a newline may end a statement.
    newlines_significant: bool,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Parser {
            cursor: Cursor::new(tokens),
            newlines_significant: true,
        }
    }

    /// Run `f` with newline significance set, restoring it afterwards.
    fn with_newlines<T>(&mut self, significant: bool, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = std::mem::replace(&mut self.newlines_significant, significant);
        let result = f(self);
        self.newlines_significant = saved;
        result
    }

    /// True when the current token sits on a new line in a context where
    /// that ends the statement.
    fn at_line_break(&self) -> bool {
        self.newlines_significant && self.cursor.current().starts_line()
    }

    fn span_from(&self, start: Span) -> Span {
        start.merge(self.cursor.previous_span())
    }
}

/// Parse a complete source file into a `Program` node.
///
/// `source_id` only labels trace output; locations are byte spans into
/// `source`.
#[tracing::instrument(level = "debug", skip(source), fields(len = source.len()))]
pub fn parse(source: &str, source_id: &str) -> Result<SyntaxNode, SyntaxError> {
    let tokens = sq_lexer::lex(source);
    let lex_error = tokens.iter().find_map(|t| match &t.kind {
        TokenKind::Error(kind) => Some((kind, t.span)),
        _ => None,
    });
    if let Some((kind, span)) = lex_error {
        tracing::debug!(?span, "lex error");
        return Err(SyntaxError::from_lex_error(kind, span));
    }
    let mut parser = Parser::new(&tokens);
    let program = parser.parse_program()?;
    tracing::trace!(tokens = tokens.len(), "parsed program");
    Ok(program)
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
