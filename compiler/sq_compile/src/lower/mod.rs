//! Syntax tree → expression IR lowering.
//!
//! Statements and program structure live here; expression forms are in
//! `expr`, collections and lookups in `collections`.

mod collections;
mod expr;

use sq_ir::{
    CallKind, Decorator, ExprKind, Expression, NodeKind, ProgramExpr, Span, SyntaxNode,
};

use crate::scope::{Resolved, Scopes};
use crate::{Builtins, CompileError};

/// Compile a parsed tree.
///
/// `externals` are the names bound by the program's imports; they resolve to
/// [`ExprKind::External`] and shadow builtins. Any node may be compiled, but
/// only a `Program` produces exports and top-level bindings.
#[tracing::instrument(level = "debug", skip_all, fields(root = ast.kind_name()))]
pub fn compile(
    ast: &SyntaxNode,
    builtins: &dyn Builtins,
    externals: &[String],
) -> Result<Expression, CompileError> {
    crate::check_unit_types(ast)?;
    let mut lowerer = Lowerer::new(builtins, externals);
    let expression = match &ast.kind {
        NodeKind::Program {
            statements, result, ..
        } => lowerer.lower_program(statements, result.as_deref(), ast.span)?,
        _ => lowerer.lower_expr(ast)?,
    };
    tracing::trace!("compiled");
    Ok(expression)
}

pub(crate) struct Lowerer<'a> {
    scopes: Scopes<'a>,
}

impl<'a> Lowerer<'a> {
    fn new(builtins: &'a dyn Builtins, externals: &'a [String]) -> Self {
        Lowerer {
            scopes: Scopes::new(builtins, externals),
        }
    }

    fn lower_program(
        &mut self,
        statements: &[SyntaxNode],
        result: Option<&SyntaxNode>,
        span: Span,
    ) -> Result<Expression, CompileError> {
        let mut lowered = Vec::with_capacity(statements.len());
        let mut exports = Vec::new();
        for statement in statements {
            if let Some(name) = exported_name(statement) {
                exports.push(name.to_string());
            }
            lowered.push(self.lower_statement(statement)?);
        }
        let result = result
            .map(|node| self.lower_expr(node).map(Box::new))
            .transpose()?;
        let bindings = self.scopes.local_bindings();
        tracing::debug!(
            statements = lowered.len(),
            exports = exports.len(),
            "lowered program"
        );
        Ok(Expression::new(
            ExprKind::Program(ProgramExpr {
                statements: lowered,
                result,
                exports,
                bindings,
            }),
            span,
        ))
    }

    /// `{ statements; result }`. A block without statements is its result.
    fn lower_block(
        &mut self,
        statements: &[SyntaxNode],
        result: &SyntaxNode,
        span: Span,
    ) -> Result<Expression, CompileError> {
        if statements.is_empty() {
            return self.lower_expr(result);
        }
        self.scopes.start_block();
        let block = self.lower_block_body(statements, result);
        self.scopes.finish();
        Ok(Expression::new(ExprKind::Block(block?), span))
    }

    fn lower_block_body(
        &mut self,
        statements: &[SyntaxNode],
        result: &SyntaxNode,
    ) -> Result<Vec<Expression>, CompileError> {
        let mut lowered = Vec::with_capacity(statements.len() + 1);
        for statement in statements {
            if exported_name(statement).is_some() {
                return Err(CompileError::ExportInBlock {
                    span: statement.span,
                });
            }
            lowered.push(self.lower_statement(statement)?);
        }
        lowered.push(self.lower_expr(result)?);
        Ok(lowered)
    }

    /// Let and defun statements become `Assign`. The value is lowered before
    /// the name is defined, so a binding cannot refer to itself.
    fn lower_statement(&mut self, statement: &SyntaxNode) -> Result<Expression, CompileError> {
        let (variable, decorators, value) = match &statement.kind {
            NodeKind::LetStatement {
                variable,
                decorators,
                value,
                ..
            }
            | NodeKind::DefunStatement {
                variable,
                decorators,
                value,
                ..
            } => (variable, decorators, value),
            _ => return self.lower_expr(statement),
        };
        let arity = lambda_arity(value);
        let mut right = self.lower_expr(value)?;
        for decorator in decorators.iter().rev() {
            right = self.apply_decorator(decorator, right, statement.span)?;
        }
        self.scopes.define(&variable.name, arity);
        Ok(Expression::new(
            ExprKind::Assign {
                left: variable.name.clone(),
                right: Box::new(right),
            },
            statement.span,
        ))
    }

    /// `@name(args)` on a value becomes `Tag.name(value, args)`.
    fn apply_decorator(
        &mut self,
        decorator: &Decorator,
        value: Expression,
        span: Span,
    ) -> Result<Expression, CompileError> {
        let function = format!("Tag.{}", decorator.name.name);
        let Some((resolved, _)) = self.scopes.resolve(&function) else {
            return Err(CompileError::UnknownDecorator {
                name: decorator.name.name.clone(),
                span: decorator.span,
            });
        };
        let func = resolved_expr(resolved, decorator.name.span);
        let mut args = Vec::with_capacity(decorator.args.len() + 1);
        args.push(value);
        for arg in &decorator.args {
            args.push(self.lower_expr(arg)?);
        }
        Ok(Expression::new(
            ExprKind::Call {
                func: Box::new(func),
                args,
                kind: CallKind::Decorate,
            },
            span,
        ))
    }

    /// Resolve a name that must exist, reporting `UndefinedName` otherwise.
    fn resolve_required(
        &mut self,
        name: &str,
        span: Span,
    ) -> Result<(Resolved, Option<usize>), CompileError> {
        self.scopes
            .resolve(name)
            .ok_or_else(|| CompileError::UndefinedName {
                name: name.to_string(),
                span,
            })
    }
}

pub(crate) fn resolved_expr(resolved: Resolved, span: Span) -> Expression {
    let kind = match resolved {
        Resolved::Stack(offset) => ExprKind::StackRef(offset),
        Resolved::Capture(index) => ExprKind::CaptureRef(index),
        Resolved::External(name) => ExprKind::External(name),
        Resolved::Builtin(name) => ExprKind::Builtin(name),
    };
    Expression::new(kind, span)
}

fn exported_name(statement: &SyntaxNode) -> Option<&str> {
    match &statement.kind {
        NodeKind::LetStatement {
            variable, exported, ..
        }
        | NodeKind::DefunStatement {
            variable, exported, ..
        } if *exported => Some(&variable.name),
        _ => None,
    }
}

fn lambda_arity(value: &SyntaxNode) -> Option<usize> {
    match &value.kind {
        NodeKind::Lambda { args, .. } => Some(args.len()),
        _ => None,
    }
}
