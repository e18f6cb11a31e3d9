//! Dict literals and index lookups.

use sq_ir::{ExprKind, Expression, NodeKind, Span, SyntaxNode};

use super::{resolved_expr, Lowerer};
use crate::{CompileError, INDEX_LOOKUP};

impl Lowerer<'_> {
    /// `{a: 1, b}`: the shorthand `b` is the pair `"b": b`.
    pub(crate) fn lower_dict(
        &mut self,
        entries: &[SyntaxNode],
        span: Span,
    ) -> Result<Expression, CompileError> {
        let mut pairs = Vec::with_capacity(entries.len());
        for entry in entries {
            let pair = match &entry.kind {
                NodeKind::KeyValue { key, value } => {
                    (self.lower_expr(key)?, self.lower_expr(value)?)
                }
                NodeKind::Identifier(name) => (
                    Expression::string(name.as_str(), entry.span),
                    self.lower_identifier(name, entry.span)?,
                ),
                _ => {
                    let value = self.lower_expr(entry)?;
                    (Expression::string(entry.kind_name(), entry.span), value)
                }
            };
            pairs.push(pair);
        }
        Ok(Expression::new(ExprKind::Dict(pairs), span))
    }

    /// `arg.key` and `arg[key]` both become `$_atIndex_$(arg, key)`.
    pub(crate) fn index_lookup(
        &mut self,
        arg: Expression,
        key: Expression,
        span: Span,
    ) -> Result<Expression, CompileError> {
        let (resolved, _) = self.resolve_required(INDEX_LOOKUP, span)?;
        Ok(Expression::call(
            resolved_expr(resolved, span),
            vec![arg, key],
            span,
        ))
    }
}
