//! Grammar productions.
//!
//! - `mod.rs`: program, statements, blocks
//! - `expr.rs`: binary operator precedence chain, unary, pipes
//! - `primary.rs`: literals, identifiers, collections, lambdas, postfix
//! - `unit.rs`: unit-type annotations

mod expr;
mod primary;
mod unit;

use crate::{Parser, SyntaxError};
use sq_diagnostic::ErrorCode;
use sq_ir::{Decorator, Ident, Import, LambdaParameter, NodeKind, Span, SyntaxNode};
use sq_lexer::TokenKind;

/// Statements plus the optional trailing expression of a program or block.
type StatementList = (Vec<SyntaxNode>, Option<Box<SyntaxNode>>);

impl Parser<'_> {
    pub(crate) fn parse_program(&mut self) -> Result<SyntaxNode, SyntaxError> {
        let mut imports = Vec::new();
        self.skip_semicolons();
        while self.cursor.check(&TokenKind::Import) {
            imports.push(self.parse_import()?);
            self.expect_separator(&TokenKind::Eof)?;
            self.skip_semicolons();
        }
        let (statements, result) = self.parse_statement_list(&TokenKind::Eof)?;
        let end = self.cursor.current_span().end;
        Ok(SyntaxNode::new(
            NodeKind::Program {
                imports,
                statements,
                result,
            },
            Span::new(0, end),
        ))
    }

    fn parse_import(&mut self) -> Result<Import, SyntaxError> {
        let start = self.cursor.expect(&TokenKind::Import)?;
        let path = match self.cursor.current_kind() {
            TokenKind::String(path) => {
                self.cursor.advance();
                path.clone()
            }
            _ => return Err(SyntaxError::expected("import path", self.cursor.current())),
        };
        self.cursor.expect(&TokenKind::As)?;
        let (name, name_span) = self.cursor.expect_ident()?;
        Ok(Import {
            path,
            variable: Ident::new(name, name_span),
            span: self.span_from(start),
        })
    }

    fn skip_semicolons(&mut self) {
        while self.cursor.eat(&TokenKind::Semicolon) {}
    }

    /// A statement must be followed by `;`, a line break, or the closing token.
    fn expect_separator(&mut self, closing: &TokenKind) -> Result<(), SyntaxError> {
        if self.cursor.eat(&TokenKind::Semicolon)
            || self.cursor.current().starts_line()
            || self.cursor.check(closing)
        {
            Ok(())
        } else {
            Err(SyntaxError::expected(
                "\";\" or a new line",
                self.cursor.current(),
            ))
        }
    }

    /// Parse statements up to (not including) `closing`.
    fn parse_statement_list(&mut self, closing: &TokenKind) -> Result<StatementList, SyntaxError> {
        self.with_newlines(true, |p| {
            let mut statements = Vec::new();
            loop {
                p.skip_semicolons();
                if p.cursor.check(closing) {
                    return Ok((statements, None));
                }
                if p.cursor.check(&TokenKind::Import) {
                    return Err(SyntaxError::new(
                        ErrorCode::E1003,
                        "Imports must come before any other statement",
                        p.cursor.current_span(),
                    ));
                }
                if let Some(statement) = p.parse_statement()? {
                    statements.push(statement);
                    p.expect_separator(closing)?;
                    continue;
                }
                let result = p.parse_expr()?;
                p.skip_semicolons();
                if !p.cursor.check(closing) {
                    let expected = if matches!(closing, TokenKind::Eof) {
                        "end of input"
                    } else {
                        "\"}\""
                    };
                    return Err(SyntaxError::expected(expected, p.cursor.current()));
                }
                return Ok((statements, Some(Box::new(result))));
            }
        })
    }

    /// Parse a let or defun statement, or return `None` (consuming nothing)
    /// when the upcoming tokens start an expression.
    fn parse_statement(&mut self) -> Result<Option<SyntaxNode>, SyntaxError> {
        let start = self.cursor.current_span();
        let decorators = self.parse_decorators()?;
        let exported = self.cursor.eat(&TokenKind::Export);
        let prefixed = exported || !decorators.is_empty();

        if self.cursor.check_ident() {
            match self.cursor.peek(1).kind {
                TokenKind::Eq | TokenKind::DoubleColon => {
                    return self
                        .parse_let(start, decorators, exported)
                        .map(Some);
                }
                TokenKind::LParen if !self.cursor.peek(1).starts_line() => {
                    let checkpoint = self.cursor.position();
                    match self.parse_defun(start, decorators, exported) {
                        Ok(node) => return Ok(Some(node)),
                        Err(err) if prefixed => return Err(err),
                        Err(_) => self.cursor.set_position(checkpoint),
                    }
                }
                _ => {}
            }
        }

        if prefixed {
            return Err(SyntaxError::expected(
                "variable definition",
                self.cursor.current(),
            ));
        }
        Ok(None)
    }

    fn parse_decorators(&mut self) -> Result<Vec<Decorator>, SyntaxError> {
        let mut decorators = Vec::new();
        while self.cursor.check(&TokenKind::At) {
            let start = self.cursor.advance().span;
            let (name, name_span) = self.cursor.expect_ident()?;
            let args = if self.cursor.check(&TokenKind::LParen) && self.cursor.current().is_glued()
            {
                self.parse_call_args()?
            } else {
                Vec::new()
            };
            decorators.push(Decorator {
                name: Ident::new(name, name_span),
                args,
                span: self.span_from(start),
            });
        }
        Ok(decorators)
    }

    fn parse_let(
        &mut self,
        start: Span,
        decorators: Vec<Decorator>,
        exported: bool,
    ) -> Result<SyntaxNode, SyntaxError> {
        let (name, name_span) = self.cursor.expect_ident()?;
        let unit_type = if self.cursor.eat(&TokenKind::DoubleColon) {
            Some(Box::new(self.parse_unit_type()?))
        } else {
            None
        };
        self.cursor.expect(&TokenKind::Eq)?;
        let value = self.parse_expr()?;
        let value = match value.kind {
            NodeKind::Lambda {
                name: None,
                args,
                body,
                return_unit,
            } => SyntaxNode::new(
                NodeKind::Lambda {
                    name: Some(name.clone()),
                    args,
                    body,
                    return_unit,
                },
                value.span,
            ),
            _ => wrap_in_block(value),
        };
        Ok(SyntaxNode::new(
            NodeKind::LetStatement {
                variable: Ident::new(name, name_span),
                unit_type,
                exported,
                decorators,
                value: Box::new(value),
            },
            self.span_from(start),
        ))
    }

    /// `name(params) = body` or `name(params) :: unit = body`.
    fn parse_defun(
        &mut self,
        start: Span,
        decorators: Vec<Decorator>,
        exported: bool,
    ) -> Result<SyntaxNode, SyntaxError> {
        let (name, name_span) = self.cursor.expect_ident()?;
        let lambda_start = self.cursor.expect(&TokenKind::LParen)?;
        let args = self.with_newlines(false, |p| p.parse_parameters(&TokenKind::RParen))?;
        self.cursor.expect(&TokenKind::RParen)?;
        let return_unit = if self.cursor.eat(&TokenKind::DoubleColon) {
            Some(Box::new(self.parse_unit_type()?))
        } else {
            None
        };
        self.cursor.expect(&TokenKind::Eq)?;
        let body = wrap_in_block(self.parse_expr()?);
        let lambda = SyntaxNode::new(
            NodeKind::Lambda {
                name: Some(name.clone()),
                args,
                body: Box::new(body),
                return_unit,
            },
            self.span_from(lambda_start),
        );
        Ok(SyntaxNode::new(
            NodeKind::DefunStatement {
                variable: Ident::new(name, name_span),
                exported,
                decorators,
                value: Box::new(lambda),
            },
            self.span_from(start),
        ))
    }

    /// Comma-separated lambda parameters up to `closing` (not consumed).
    pub(crate) fn parse_parameters(
        &mut self,
        closing: &TokenKind,
    ) -> Result<Vec<LambdaParameter>, SyntaxError> {
        let mut params = Vec::new();
        while !self.cursor.check(closing) {
            let (name, span) = self.cursor.expect_ident()?;
            let annotation = if self.cursor.eat(&TokenKind::Colon) {
                Some(Box::new(self.parse_ternary()?))
            } else {
                None
            };
            let unit_type = if self.cursor.eat(&TokenKind::DoubleColon) {
                Some(Box::new(self.parse_unit_type()?))
            } else {
                None
            };
            params.push(LambdaParameter {
                variable: Ident::new(name, span),
                annotation,
                unit_type,
                span: self.span_from(span),
            });
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        Ok(params)
    }

    /// Body of `{ ... }` after the opening brace, through the closing brace.
    pub(crate) fn parse_block_body(&mut self, start: Span) -> Result<SyntaxNode, SyntaxError> {
        let (statements, result) = self.parse_statement_list(&TokenKind::RBrace)?;
        let Some(result) = result else {
            return Err(SyntaxError::expected(
                "a final expression in block",
                self.cursor.current(),
            ));
        };
        self.cursor.expect(&TokenKind::RBrace)?;
        Ok(SyntaxNode::new(
            NodeKind::Block { statements, result },
            self.span_from(start),
        ))
    }
}

/// Let values and function bodies are always blocks in the tree.
fn wrap_in_block(node: SyntaxNode) -> SyntaxNode {
    if matches!(node.kind, NodeKind::Block { .. }) {
        return node;
    }
    let span = node.span;
    SyntaxNode::new(
        NodeKind::Block {
            statements: Vec::new(),
            result: Box::new(node),
        },
        span,
    )
}
