//! Primary expressions and postfix chains.

use crate::{Parser, SyntaxError, UNIT_SUFFIXES};
use sq_diagnostic::ErrorCode;
use sq_ir::{NodeKind, Span, SyntaxNode};
use sq_lexer::TokenKind;

impl Parser<'_> {
    /// Primary followed by calls, `[index]` and `.key` lookups.
    ///
    /// With `allow_calls` false (the callee of a pipe) the chain stops
    /// before `(`.
    pub(crate) fn parse_postfix(&mut self, allow_calls: bool) -> Result<SyntaxNode, SyntaxError> {
        let mut node = self.parse_primary()?;
        loop {
            match self.cursor.current_kind() {
                TokenKind::LParen if allow_calls && !self.at_line_break() => {
                    let args = self.parse_call_args()?;
                    let span = self.span_from(node.span);
                    node = SyntaxNode::new(
                        NodeKind::Call {
                            func: Box::new(node),
                            args,
                        },
                        span,
                    );
                }
                TokenKind::LBracket if !self.at_line_break() => {
                    self.cursor.advance();
                    let key = self.with_newlines(false, Self::parse_expr)?;
                    self.cursor.expect(&TokenKind::RBracket)?;
                    let span = self.span_from(node.span);
                    node = SyntaxNode::new(
                        NodeKind::BracketLookup {
                            arg: Box::new(node),
                            key: Box::new(key),
                        },
                        span,
                    );
                }
                TokenKind::Dot => {
                    self.cursor.advance();
                    let (key, _) = self.cursor.expect_ident()?;
                    let span = self.span_from(node.span);
                    node = SyntaxNode::new(
                        NodeKind::DotLookup {
                            arg: Box::new(node),
                            key,
                        },
                        span,
                    );
                }
                _ => return Ok(node),
            }
        }
    }

    /// `(a, b, c)` with an optional trailing comma.
    pub(crate) fn parse_call_args(&mut self) -> Result<Vec<SyntaxNode>, SyntaxError> {
        self.cursor.expect(&TokenKind::LParen)?;
        let args = self.with_newlines(false, |p| p.parse_comma_list(&TokenKind::RParen))?;
        self.cursor.expect(&TokenKind::RParen)?;
        Ok(args)
    }

    fn parse_comma_list(&mut self, closing: &TokenKind) -> Result<Vec<SyntaxNode>, SyntaxError> {
        let mut items = Vec::new();
        while !self.cursor.check(closing) {
            items.push(self.parse_expr()?);
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        Ok(items)
    }

    fn parse_primary(&mut self) -> Result<SyntaxNode, SyntaxError> {
        let token = self.cursor.current();
        match &token.kind {
            TokenKind::Number(value) => {
                self.cursor.advance();
                let number = SyntaxNode::new(NodeKind::Float(*value), token.span);
                self.parse_unit_suffix(number)
            }
            TokenKind::String(value) => {
                self.cursor.advance();
                Ok(SyntaxNode::new(NodeKind::String(value.clone()), token.span))
            }
            TokenKind::True | TokenKind::False => {
                self.cursor.advance();
                let value = matches!(token.kind, TokenKind::True);
                Ok(SyntaxNode::new(NodeKind::Boolean(value), token.span))
            }
            TokenKind::Ident(name) => {
                self.cursor.advance();
                Ok(self.parse_identifier(name.clone(), token.span))
            }
            TokenKind::LParen => {
                self.cursor.advance();
                let inner = self.with_newlines(false, Self::parse_expr)?;
                self.cursor.expect(&TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::LBracket => {
                self.cursor.advance();
                let items = self.with_newlines(false, |p| p.parse_comma_list(&TokenKind::RBracket))?;
                self.cursor.expect(&TokenKind::RBracket)?;
                Ok(SyntaxNode::new(
                    NodeKind::Array(items),
                    self.span_from(token.span),
                ))
            }
            TokenKind::LBrace => self.parse_brace(),
            _ => Err(SyntaxError::expected("expression", token)),
        }
    }

    /// `5k`, `10%`: a unit name glued to a number literal.
    fn parse_unit_suffix(&mut self, number: SyntaxNode) -> Result<SyntaxNode, SyntaxError> {
        let next = self.cursor.current();
        if !next.is_glued() {
            return Ok(number);
        }
        let unit = match &next.kind {
            TokenKind::Ident(name) => name.as_str(),
            TokenKind::Percent => "%",
            _ => return Ok(number),
        };
        if !UNIT_SUFFIXES.contains(&unit) {
            return Err(SyntaxError::new(
                ErrorCode::E1002,
                format!("Unknown unit `{unit}`"),
                next.span,
            ));
        }
        self.cursor.advance();
        let span = number.span.merge(next.span);
        Ok(SyntaxNode::new(
            NodeKind::UnitValue {
                value: Box::new(number),
                unit: unit.to_string(),
            },
            span,
        ))
    }

    /// An identifier. Capitalized names absorb glued `.name` segments, so
    /// `Dist.normal` is one identifier rather than a lookup on `Dist`.
    fn parse_identifier(&mut self, mut name: String, mut span: Span) -> SyntaxNode {
        if name.starts_with(|c: char| c.is_ascii_uppercase()) {
            loop {
                let dot = self.cursor.current();
                let segment = self.cursor.peek(1);
                match (&dot.kind, &segment.kind) {
                    (TokenKind::Dot, TokenKind::Ident(part)) if dot.is_glued() && segment.is_glued() => {
                        name.push('.');
                        name.push_str(part);
                        span = span.merge(segment.span);
                        self.cursor.advance();
                        self.cursor.advance();
                    }
                    _ => break,
                }
            }
        }
        SyntaxNode::new(NodeKind::Identifier(name), span)
    }

    /// `{` starts a lambda, a dict, or a block.
    fn parse_brace(&mut self) -> Result<SyntaxNode, SyntaxError> {
        let start = self.cursor.expect(&TokenKind::LBrace)?;
        let first = &self.cursor.current().kind;
        let second = &self.cursor.peek(1).kind;
        match (first, second) {
            (TokenKind::Bar | TokenKind::PipePipe, _) => self.parse_lambda(start),
            (TokenKind::RBrace, _)
            | (TokenKind::Ident(_) | TokenKind::String(_), TokenKind::Colon)
            | (TokenKind::Ident(_), TokenKind::Comma | TokenKind::RBrace) => self.parse_dict(start),
            _ => self.parse_block_body(start),
        }
    }

    /// `{|x, y: [0, 1]| body}`; the opening brace is already consumed.
    fn parse_lambda(&mut self, start: Span) -> Result<SyntaxNode, SyntaxError> {
        let args = if self.cursor.eat(&TokenKind::PipePipe) {
            Vec::new()
        } else {
            self.cursor.expect(&TokenKind::Bar)?;
            let args = self.with_newlines(false, |p| p.parse_parameters(&TokenKind::Bar))?;
            self.cursor.expect(&TokenKind::Bar)?;
            args
        };
        let body_start = self.cursor.current_span();
        let body = self.parse_block_body(body_start)?;
        Ok(SyntaxNode::new(
            NodeKind::Lambda {
                name: None,
                args,
                body: Box::new(body),
                return_unit: None,
            },
            self.span_from(start),
        ))
    }

    /// `{a: 1, "b": 2, c}`; the opening brace is already consumed.
    fn parse_dict(&mut self, start: Span) -> Result<SyntaxNode, SyntaxError> {
        let entries = self.with_newlines(false, |p| {
            let mut entries = Vec::new();
            while !p.cursor.check(&TokenKind::RBrace) {
                entries.push(p.parse_dict_entry()?);
                if !p.cursor.eat(&TokenKind::Comma) {
                    break;
                }
            }
            Ok(entries)
        })?;
        self.cursor.expect(&TokenKind::RBrace)?;
        Ok(SyntaxNode::new(
            NodeKind::Dict(entries),
            self.span_from(start),
        ))
    }

    fn parse_dict_entry(&mut self) -> Result<SyntaxNode, SyntaxError> {
        let token = self.cursor.current();
        let key = match (&token.kind, &self.cursor.peek(1).kind) {
            (TokenKind::Ident(name), TokenKind::Colon) => {
                self.cursor.advance();
                SyntaxNode::new(NodeKind::String(name.clone()), token.span)
            }
            (TokenKind::Ident(name), TokenKind::Comma | TokenKind::RBrace) => {
                self.cursor.advance();
                return Ok(SyntaxNode::new(
                    NodeKind::Identifier(name.clone()),
                    token.span,
                ));
            }
            _ => self.parse_expr()?,
        };
        self.cursor.expect(&TokenKind::Colon)?;
        let value = self.parse_expr()?;
        let span = key.span.merge(value.span);
        Ok(SyntaxNode::new(
            NodeKind::KeyValue {
                key: Box::new(key),
                value: Box::new(value),
            },
            span,
        ))
    }
}
