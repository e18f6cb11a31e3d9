//! Expression parsing: ternaries and the binary operator precedence chain.
//!
//! Lowest to highest: ternary, `||`, `&&`, comparison, `to`, additive,
//! multiplicative, pipe `->`, power (right associative), unary, postfix.

use crate::{Parser, SyntaxError};
use sq_ir::{InfixOp, NodeKind, SyntaxNode, TernarySyntax, UnaryOp};
use sq_lexer::TokenKind;

type ParseFn<'a> = fn(&mut Parser<'a>) -> Result<SyntaxNode, SyntaxError>;

impl<'a> Parser<'a> {
    /// Parse an expression.
    ///
    /// Uses `ensure_sufficient_stack` to prevent stack overflow on deeply
    /// nested input.
    pub(crate) fn parse_expr(&mut self) -> Result<SyntaxNode, SyntaxError> {
        sq_stack::ensure_sufficient_stack(|| self.parse_ternary())
    }

    /// An operator on a new line continues the expression, except `-`,
    /// which would be ambiguous with a negated result expression.
    fn infix_continues(&self) -> bool {
        !self.at_line_break() || !self.cursor.check(&TokenKind::Minus)
    }

    pub(crate) fn parse_ternary(&mut self) -> Result<SyntaxNode, SyntaxError> {
        if self.cursor.check(&TokenKind::If) {
            return self.parse_if();
        }
        let condition = self.parse_or()?;
        if !self.cursor.check(&TokenKind::Question) {
            return Ok(condition);
        }
        self.cursor.advance();
        let true_expr = self.parse_ternary()?;
        self.cursor.expect(&TokenKind::Colon)?;
        let false_expr = self.parse_ternary()?;
        let span = condition.span.merge(false_expr.span);
        Ok(SyntaxNode::new(
            NodeKind::Ternary {
                condition: Box::new(condition),
                true_expr: Box::new(true_expr),
                false_expr: Box::new(false_expr),
                syntax: TernarySyntax::C,
            },
            span,
        ))
    }

    /// `if c then a else b`; `else if` chains nest naturally.
    fn parse_if(&mut self) -> Result<SyntaxNode, SyntaxError> {
        let start = self.cursor.expect(&TokenKind::If)?;
        let condition = self.parse_expr()?;
        self.cursor.expect(&TokenKind::Then)?;
        let true_expr = self.parse_expr()?;
        self.cursor.expect(&TokenKind::Else)?;
        let false_expr = self.parse_expr()?;
        Ok(SyntaxNode::new(
            NodeKind::Ternary {
                condition: Box::new(condition),
                true_expr: Box::new(true_expr),
                false_expr: Box::new(false_expr),
                syntax: TernarySyntax::IfThenElse,
            },
            self.span_from(start),
        ))
    }

    /// Left-associative loop over one precedence level.
    fn parse_binary_level(
        &mut self,
        op_for: fn(&TokenKind) -> Option<InfixOp>,
        next: ParseFn<'a>,
    ) -> Result<SyntaxNode, SyntaxError> {
        let mut left = next(self)?;
        while let Some(op) = op_for(self.cursor.current_kind()) {
            if !self.infix_continues() {
                break;
            }
            self.cursor.advance();
            let right = next(self)?;
            let span = left.span.merge(right.span);
            left = SyntaxNode::new(
                NodeKind::InfixCall {
                    op,
                    lhs: Box::new(left),
                    rhs: Box::new(right),
                },
                span,
            );
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> Result<SyntaxNode, SyntaxError> {
        self.parse_binary_level(
            |kind| matches!(kind, TokenKind::PipePipe).then_some(InfixOp::Or),
            Self::parse_and,
        )
    }

    fn parse_and(&mut self) -> Result<SyntaxNode, SyntaxError> {
        self.parse_binary_level(
            |kind| matches!(kind, TokenKind::AmpAmp).then_some(InfixOp::And),
            Self::parse_comparison,
        )
    }

    fn parse_comparison(&mut self) -> Result<SyntaxNode, SyntaxError> {
        self.parse_binary_level(
            |kind| match kind {
                TokenKind::EqEq => Some(InfixOp::Equal),
                TokenKind::NotEq => Some(InfixOp::NotEqual),
                TokenKind::Lt => Some(InfixOp::Less),
                TokenKind::LtEq => Some(InfixOp::LessEq),
                TokenKind::Gt => Some(InfixOp::Greater),
                TokenKind::GtEq => Some(InfixOp::GreaterEq),
                _ => None,
            },
            Self::parse_to,
        )
    }

    fn parse_to(&mut self) -> Result<SyntaxNode, SyntaxError> {
        self.parse_binary_level(
            |kind| matches!(kind, TokenKind::To).then_some(InfixOp::To),
            Self::parse_additive,
        )
    }

    fn parse_additive(&mut self) -> Result<SyntaxNode, SyntaxError> {
        self.parse_binary_level(
            |kind| match kind {
                TokenKind::Plus => Some(InfixOp::Add),
                TokenKind::Minus => Some(InfixOp::Subtract),
                TokenKind::DotPlus => Some(InfixOp::DotAdd),
                TokenKind::DotMinus => Some(InfixOp::DotSubtract),
                _ => None,
            },
            Self::parse_multiplicative,
        )
    }

    fn parse_multiplicative(&mut self) -> Result<SyntaxNode, SyntaxError> {
        self.parse_binary_level(
            |kind| match kind {
                TokenKind::Star => Some(InfixOp::Multiply),
                TokenKind::Slash => Some(InfixOp::Divide),
                TokenKind::DotStar => Some(InfixOp::DotMultiply),
                TokenKind::DotSlash => Some(InfixOp::DotDivide),
                _ => None,
            },
            Self::parse_pipe,
        )
    }

    /// `a -> f(b, c)`; the callee is a lookup chain, not a call.
    fn parse_pipe(&mut self) -> Result<SyntaxNode, SyntaxError> {
        let mut left = self.parse_power()?;
        while self.cursor.check(&TokenKind::Arrow) {
            self.cursor.advance();
            let func = self.parse_postfix(false)?;
            let right_args = if self.cursor.check(&TokenKind::LParen) && !self.at_line_break() {
                self.parse_call_args()?
            } else {
                Vec::new()
            };
            let span = self.span_from(left.span);
            left = SyntaxNode::new(
                NodeKind::Pipe {
                    left: Box::new(left),
                    func: Box::new(func),
                    right_args,
                },
                span,
            );
        }
        Ok(left)
    }

    /// `a ^ b ^ c` groups as `a ^ (b ^ c)`.
    fn parse_power(&mut self) -> Result<SyntaxNode, SyntaxError> {
        let base = self.parse_unary()?;
        let op = match self.cursor.current_kind() {
            TokenKind::Caret => InfixOp::Power,
            TokenKind::DotCaret => InfixOp::DotPower,
            _ => return Ok(base),
        };
        if !self.infix_continues() {
            return Ok(base);
        }
        self.cursor.advance();
        let exponent = sq_stack::ensure_sufficient_stack(|| self.parse_power())?;
        let span = base.span.merge(exponent.span);
        Ok(SyntaxNode::new(
            NodeKind::InfixCall {
                op,
                lhs: Box::new(base),
                rhs: Box::new(exponent),
            },
            span,
        ))
    }

    fn parse_unary(&mut self) -> Result<SyntaxNode, SyntaxError> {
        let op = match self.cursor.current_kind() {
            TokenKind::Minus => UnaryOp::Minus,
            TokenKind::Bang => UnaryOp::Not,
            _ => return self.parse_postfix(true),
        };
        let start = self.cursor.advance().span;
        let arg = sq_stack::ensure_sufficient_stack(|| self.parse_unary())?;
        let span = start.merge(arg.span);
        Ok(SyntaxNode::new(
            NodeKind::UnaryCall {
                op,
                arg: Box::new(arg),
            },
            span,
        ))
    }
}
