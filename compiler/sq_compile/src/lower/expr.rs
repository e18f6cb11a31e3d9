//! Expression lowering: literals, identifiers, calls, operators, lambdas.

use std::sync::Arc;

use sq_ir::{
    ExprKind, Expression, InfixOp, LambdaExpr, LambdaExprParameter, LambdaParameter, Literal,
    NodeKind, Span, SyntaxNode, UnaryOp,
};
use sq_stack::ensure_sufficient_stack;

use super::{resolved_expr, Lowerer};
use crate::const_fold::{fold_binary, fold_unary, fold_unit};
use crate::scope::Resolved;
use crate::CompileError;

impl Lowerer<'_> {
    pub(crate) fn lower_expr(&mut self, node: &SyntaxNode) -> Result<Expression, CompileError> {
        ensure_sufficient_stack(|| self.lower_expr_inner(node))
    }

    fn lower_expr_inner(&mut self, node: &SyntaxNode) -> Result<Expression, CompileError> {
        let span = node.span;
        match &node.kind {
            NodeKind::Program {
                statements, result, ..
            } => self.lower_program(statements, result.as_deref(), span),
            NodeKind::Block { statements, result } => self.lower_block(statements, result, span),
            NodeKind::LetStatement { .. } | NodeKind::DefunStatement { .. } => {
                self.lower_statement(node)
            }
            NodeKind::Lambda { name, args, body, .. } => {
                self.lower_lambda(name.clone(), args, body, span)
            }
            NodeKind::Call { func, args } => {
                let (callee, arity) = self.lower_callee(func)?;
                let args = self.lower_list(args)?;
                check_arity(arity, args.len(), span)?;
                Ok(Expression::call(callee, args, span))
            }
            NodeKind::Pipe {
                left,
                func,
                right_args,
            } => {
                let left = self.lower_expr(left)?;
                let (callee, arity) = self.lower_callee(func)?;
                let mut args = Vec::with_capacity(right_args.len() + 1);
                args.push(left);
                args.extend(self.lower_list(right_args)?);
                check_arity(arity, args.len(), span)?;
                Ok(Expression::call(callee, args, span))
            }
            NodeKind::InfixCall { op, lhs, rhs } => self.lower_infix(*op, lhs, rhs, span),
            NodeKind::UnaryCall { op, arg } => self.lower_unary(*op, arg, span),
            NodeKind::DotLookup { arg, key } => {
                let arg = self.lower_expr(arg)?;
                self.index_lookup(arg, Expression::string(key.as_str(), span), span)
            }
            NodeKind::BracketLookup { arg, key } => {
                let arg = self.lower_expr(arg)?;
                let key = self.lower_expr(key)?;
                self.index_lookup(arg, key, span)
            }
            NodeKind::Array(elements) => {
                Ok(Expression::new(ExprKind::Array(self.lower_list(elements)?), span))
            }
            NodeKind::Dict(entries) => self.lower_dict(entries, span),
            NodeKind::KeyValue { .. } => self.lower_dict(std::slice::from_ref(node), span),
            NodeKind::Ternary {
                condition,
                true_expr,
                false_expr,
                ..
            } => Ok(Expression::new(
                ExprKind::Ternary {
                    condition: Box::new(self.lower_expr(condition)?),
                    if_true: Box::new(self.lower_expr(true_expr)?),
                    if_false: Box::new(self.lower_expr(false_expr)?),
                },
                span,
            )),
            NodeKind::Identifier(name) => self.lower_identifier(name, span),
            NodeKind::Float(value) => Ok(literal(Literal::Number(*value), span)),
            NodeKind::String(value) => Ok(literal(Literal::String(value.clone()), span)),
            NodeKind::Boolean(value) => Ok(literal(Literal::Bool(*value), span)),
            NodeKind::UnitValue { value, unit } => self.lower_unit_value(value, unit, span),
            // Unit types only appear inside annotations and carry no runtime value.
            NodeKind::UnitName(_)
            | NodeKind::ExponentialUnitType { .. }
            | NodeKind::InfixUnitType { .. } => Ok(literal(Literal::Void, span)),
        }
    }

    pub(crate) fn lower_list(
        &mut self,
        nodes: &[SyntaxNode],
    ) -> Result<Vec<Expression>, CompileError> {
        nodes.iter().map(|node| self.lower_expr(node)).collect()
    }

    /// Lower a callee, keeping its statically known arity when it is a plain
    /// identifier.
    fn lower_callee(
        &mut self,
        func: &SyntaxNode,
    ) -> Result<(Expression, Option<usize>), CompileError> {
        match &func.kind {
            NodeKind::Identifier(name) => {
                if let Some((resolved, arity)) = self.scopes.resolve(name) {
                    return Ok((resolved_expr(resolved, func.span), arity));
                }
                Ok((self.lower_identifier(name, func.span)?, None))
            }
            _ => Ok((self.lower_expr(func)?, None)),
        }
    }

    /// A plain or capitalized dotted identifier. `Dist.normal` is looked up as
    /// a whole first; failing that, the first segment is resolved and the
    /// rest become lookups, so an import bound to `Lib` still answers
    /// `Lib.value`.
    pub(crate) fn lower_identifier(
        &mut self,
        name: &str,
        span: Span,
    ) -> Result<Expression, CompileError> {
        if let Some((resolved, _)) = self.scopes.resolve(name) {
            return Ok(resolved_expr(resolved, span));
        }
        let undefined = || CompileError::UndefinedName {
            name: name.to_string(),
            span,
        };
        let mut segments = name.split('.');
        let head = segments.next().ok_or_else(undefined)?;
        if head.len() == name.len() {
            return Err(undefined());
        }
        let (resolved, _) = self.scopes.resolve(head).ok_or_else(undefined)?;
        let mut expr = resolved_expr(resolved, span);
        for segment in segments {
            expr = self.index_lookup(expr, Expression::string(segment, span), span)?;
        }
        Ok(expr)
    }

    fn lower_infix(
        &mut self,
        op: InfixOp,
        lhs: &SyntaxNode,
        rhs: &SyntaxNode,
        span: Span,
    ) -> Result<Expression, CompileError> {
        let function = op.function_name();
        let (resolved, _) = self.resolve_required(function, span)?;
        let lhs = self.lower_expr(lhs)?;
        let rhs = self.lower_expr(rhs)?;
        if is_builtin(&resolved, function) {
            if let Some(value) = fold_binary(function, &lhs, &rhs) {
                return Ok(Expression::number(value, span));
            }
        }
        Ok(Expression::call(
            resolved_expr(resolved, span),
            vec![lhs, rhs],
            span,
        ))
    }

    fn lower_unary(
        &mut self,
        op: UnaryOp,
        arg: &SyntaxNode,
        span: Span,
    ) -> Result<Expression, CompileError> {
        let function = op.function_name();
        let (resolved, _) = self.resolve_required(function, span)?;
        let arg = self.lower_expr(arg)?;
        if is_builtin(&resolved, function) {
            if let Some(value) = fold_unary(function, &arg) {
                return Ok(Expression::number(value, span));
            }
        }
        Ok(Expression::call(resolved_expr(resolved, span), vec![arg], span))
    }

    /// `5k` becomes `fromUnit_k(5)`, folded to `5000` when `fromUnit_k` is
    /// the builtin.
    fn lower_unit_value(
        &mut self,
        value: &SyntaxNode,
        unit: &str,
        span: Span,
    ) -> Result<Expression, CompileError> {
        let function = format!("fromUnit_{unit}");
        let Some((resolved, _)) = self.scopes.resolve(&function) else {
            return Err(CompileError::InvalidUnit {
                unit: unit.to_string(),
                span,
            });
        };
        let value = self.lower_expr(value)?;
        if is_builtin(&resolved, &function) {
            if let Some(folded) = fold_unit(unit, &value) {
                return Ok(Expression::number(folded, span));
            }
        }
        Ok(Expression::call(resolved_expr(resolved, span), vec![value], span))
    }

    /// Parameter annotations are lowered in the enclosing scope, before the
    /// function scope opens.
    fn lower_lambda(
        &mut self,
        name: Option<String>,
        args: &[LambdaParameter],
        body: &SyntaxNode,
        span: Span,
    ) -> Result<Expression, CompileError> {
        let mut parameters = Vec::with_capacity(args.len());
        for arg in args {
            let annotation = arg
                .annotation
                .as_deref()
                .map(|annotation| self.lower_expr(annotation))
                .transpose()?;
            parameters.push(LambdaExprParameter {
                name: arg.variable.name.clone(),
                annotation,
            });
        }

        self.scopes.start_function();
        for parameter in &parameters {
            self.scopes.define(&parameter.name, None);
        }
        let body = self.lower_expr(body);
        let captures = self.scopes.finish();

        Ok(Expression::new(
            ExprKind::Lambda(LambdaExpr {
                name,
                parameters,
                captures,
                body: Arc::new(body?),
            }),
            span,
        ))
    }
}

fn is_builtin(resolved: &Resolved, function: &str) -> bool {
    matches!(resolved, Resolved::Builtin(name) if name == function)
}

fn check_arity(expected: Option<usize>, given: usize, span: Span) -> Result<(), CompileError> {
    match expected {
        Some(expected) if expected != given => Err(CompileError::ArityMismatch {
            expected,
            given,
            span,
        }),
        _ => Ok(()),
    }
}

fn literal(literal: Literal, span: Span) -> Expression {
    Expression::new(ExprKind::Literal(literal), span)
}
