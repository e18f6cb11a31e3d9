//! Token cursor for navigating the token stream.
//!
//! Provides low-level token access, lookahead, and consumption methods.

use crate::SyntaxError;
use sq_ir::Span;
use sq_lexer::{Token, TokenKind};

/// Cursor over a lexed token list.
///
/// Invariant: the last token is always `Eof`, so `current()` never runs off
/// the end. `advance` stops at `Eof`.
pub struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        debug_assert!(
            matches!(tokens.last().map(|t| &t.kind), Some(TokenKind::Eof)),
            "token list must end with Eof"
        );
        Cursor { tokens, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Roll back after speculative parsing.
    pub fn set_position(&mut self, pos: usize) {
        debug_assert!(pos < self.tokens.len(), "cursor position out of bounds");
        self.pos = pos;
    }

    #[inline]
    pub fn current(&self) -> &'a Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    #[inline]
    pub fn current_kind(&self) -> &'a TokenKind {
        &self.current().kind
    }

    #[inline]
    pub fn current_span(&self) -> Span {
        self.current().span
    }

    /// Token `n` positions ahead (0 is the current token), clamped to `Eof`.
    pub fn peek(&self, n: usize) -> &'a Token {
        let index = (self.pos + n).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    pub fn previous_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            Span::DUMMY
        }
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    /// Check if the current token has the same kind (payloads ignored).
    #[inline]
    pub fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.current_kind()) == std::mem::discriminant(kind)
    }

    #[inline]
    pub fn check_ident(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Ident(_))
    }

    /// Consume the current token and return it.
    pub fn advance(&mut self) -> &'a Token {
        let token = self.current();
        if !self.is_at_end() {
            self.pos += 1;
        }
        token
    }

    /// Consume the current token if it matches.
    pub fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume a token of the given kind or fail with `Expected "<sym>"`.
    pub fn expect(&mut self, kind: &TokenKind) -> Result<Span, SyntaxError> {
        if self.check(kind) {
            Ok(self.advance().span)
        } else {
            Err(SyntaxError::expected(
                &format!("\"{}\"", kind.symbol()),
                self.current(),
            ))
        }
    }

    /// Consume an identifier and return its name and span.
    pub fn expect_ident(&mut self) -> Result<(String, Span), SyntaxError> {
        match self.current_kind() {
            TokenKind::Ident(name) => {
                let span = self.advance().span;
                Ok((name.clone(), span))
            }
            _ => Err(SyntaxError::expected("identifier", self.current())),
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;

    #[test]
    fn test_advance_stops_at_eof() {
        let tokens = sq_lexer::lex("x");
        let mut cursor = Cursor::new(&tokens);
        assert!(cursor.check_ident());
        cursor.advance();
        assert!(cursor.is_at_end());
        cursor.advance();
        assert!(cursor.is_at_end());
        assert_eq!(cursor.previous_span(), Span::new(0, 1));
    }

    #[test]
    fn test_expect_reports_found_token() {
        let tokens = sq_lexer::lex("x");
        let mut cursor = Cursor::new(&tokens);
        let err = cursor.expect(&TokenKind::LParen).unwrap_err();
        assert_eq!(err.message, "Expected \"(\", but identifier `x` found.");
        assert_eq!(err.span, Span::new(0, 1));
    }

    #[test]
    fn test_check_ignores_payload() {
        let tokens = sq_lexer::lex("abc");
        let cursor = Cursor::new(&tokens);
        assert!(cursor.check(&TokenKind::Ident(String::new())));
        assert_eq!(cursor.peek(5).kind, TokenKind::Eof);
    }
}
