//! Unit-type annotations: `meters`, `meters/seconds^2`, `(kg*m)/s`.

use crate::{Parser, SyntaxError};
use sq_ir::{NodeKind, SyntaxNode, UnitOp};
use sq_lexer::TokenKind;

impl Parser<'_> {
    pub(crate) fn parse_unit_type(&mut self) -> Result<SyntaxNode, SyntaxError> {
        let mut left = self.parse_unit_term()?;
        loop {
            let op = match self.cursor.current_kind() {
                TokenKind::Star => UnitOp::Multiply,
                TokenKind::Slash => UnitOp::Divide,
                _ => return Ok(left),
            };
            self.cursor.advance();
            let right = self.parse_unit_term()?;
            let span = left.span.merge(right.span);
            left = SyntaxNode::new(
                NodeKind::InfixUnitType {
                    op,
                    lhs: Box::new(left),
                    rhs: Box::new(right),
                },
                span,
            );
        }
    }

    fn parse_unit_term(&mut self) -> Result<SyntaxNode, SyntaxError> {
        let base = if self.cursor.eat(&TokenKind::LParen) {
            let inner = self.parse_unit_type()?;
            self.cursor.expect(&TokenKind::RParen)?;
            inner
        } else {
            let (name, span) = self.cursor.expect_ident()?;
            SyntaxNode::new(NodeKind::UnitName(name), span)
        };
        if !self.cursor.eat(&TokenKind::Caret) {
            return Ok(base);
        }
        let negative = self.cursor.eat(&TokenKind::Minus);
        let TokenKind::Number(exponent) = self.cursor.current_kind() else {
            return Err(SyntaxError::expected("unit exponent", self.cursor.current()));
        };
        self.cursor.advance();
        let exponent = if negative {
            sq_ir::FloatBits::new(-exponent.get())
        } else {
            *exponent
        };
        let span = self.span_from(base.span);
        Ok(SyntaxNode::new(
            NodeKind::ExponentialUnitType {
                base: Box::new(base),
                exponent,
            },
            span,
        ))
    }
}
