//! Compiled expression IR.
//!
//! Free identifiers are gone: every reference is a stack slot, a capture
//! index, a builtin registry name, or an external (import) name. The tree is
//! immutable once compiled; lambda bodies are `Arc`-shared so runtime lambda
//! values can hold them without copying.

use crate::{format_number, FloatBits, Span};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};
use std::sync::Arc;

#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct Expression {
    pub kind: ExprKind,
    pub span: Span,
}

/// Compile-time constants.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub enum Literal {
    Number(FloatBits),
    String(String),
    Bool(bool),
    Void,
}

/// Whether a call is ordinary or a decorator application.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub enum CallKind {
    Call,
    Decorate,
}

/// Where a lambda's captured value comes from at closure-creation time.
///
/// Imports referenced from a lambda body are captured too, so a lambda
/// exported to another module carries everything it needs.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub enum CaptureSource {
    StackRef(usize),
    CaptureRef(usize),
    External(String),
}

#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct LambdaExprParameter {
    pub name: String,
    /// Domain annotation, evaluated in the enclosing scope.
    pub annotation: Option<Expression>,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct LambdaExpr {
    pub name: Option<String>,
    pub parameters: Vec<LambdaExprParameter>,
    pub captures: Vec<CaptureSource>,
    pub body: Arc<Expression>,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct ProgramExpr {
    pub statements: Vec<Expression>,
    pub result: Option<Box<Expression>>,
    /// Names of exported top-level bindings, in declaration order.
    pub exports: Vec<String>,
    /// Top-level binding name to absolute stack slot (latest definition wins).
    pub bindings: Vec<(String, usize)>,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub enum ExprKind {
    Program(ProgramExpr),
    Block(Vec<Expression>),
    /// Offset from the top of the value stack (0 is the most recent push).
    StackRef(usize),
    CaptureRef(usize),
    Builtin(String),
    External(String),
    Assign {
        left: String,
        right: Box<Expression>,
    },
    Call {
        func: Box<Expression>,
        args: Vec<Expression>,
        kind: CallKind,
    },
    Lambda(LambdaExpr),
    Ternary {
        condition: Box<Expression>,
        if_true: Box<Expression>,
        if_false: Box<Expression>,
    },
    Array(Vec<Expression>),
    Dict(Vec<(Expression, Expression)>),
    Literal(Literal),
}

impl Expression {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expression { kind, span }
    }

    pub fn number(value: f64, span: Span) -> Self {
        Expression::new(ExprKind::Literal(Literal::Number(FloatBits::new(value))), span)
    }

    pub fn string(value: impl Into<String>, span: Span) -> Self {
        Expression::new(ExprKind::Literal(Literal::String(value.into())), span)
    }

    pub fn call(func: Expression, args: Vec<Expression>, span: Span) -> Self {
        Expression::new(
            ExprKind::Call {
                func: Box::new(func),
                args,
                kind: CallKind::Call,
            },
            span,
        )
    }

    /// The numeric value if this is a number literal.
    pub fn as_number(&self) -> Option<f64> {
        match &self.kind {
            ExprKind::Literal(Literal::Number(n)) => Some(n.get()),
            _ => None,
        }
    }

    /// Render the IR as an s-expression, e.g.
    /// `(Program (.statements (Assign x 5)) (.bindings (x 0)))`.
    pub fn to_sexpr(&self) -> String {
        let mut out = String::new();
        let _ = self.write_sexpr(&mut out);
        out
    }

    fn write_sexpr(&self, out: &mut String) -> fmt::Result {
        match &self.kind {
            ExprKind::Program(program) => {
                out.push_str("(Program");
                if !program.statements.is_empty() {
                    out.push_str(" (.statements");
                    write_exprs(out, &program.statements)?;
                    out.push(')');
                }
                if let Some(result) = &program.result {
                    out.push_str(" (.result ");
                    result.write_sexpr(out)?;
                    out.push(')');
                }
                if !program.exports.is_empty() {
                    write!(out, " (.exports {})", program.exports.join(" "))?;
                }
                if !program.bindings.is_empty() {
                    out.push_str(" (.bindings");
                    for (name, slot) in &program.bindings {
                        write!(out, " ({name} {slot})")?;
                    }
                    out.push(')');
                }
                out.push(')');
            }
            ExprKind::Block(statements) => {
                out.push_str("(Block");
                write_exprs(out, statements)?;
                out.push(')');
            }
            ExprKind::StackRef(offset) => write!(out, "(StackRef {offset})")?,
            ExprKind::CaptureRef(index) => write!(out, "(CaptureRef {index})")?,
            ExprKind::Builtin(name) => write!(out, "(Builtin {name})")?,
            ExprKind::External(name) => write!(out, "(External {name})")?,
            ExprKind::Assign { left, right } => {
                write!(out, "(Assign {left} ")?;
                right.write_sexpr(out)?;
                out.push(')');
            }
            ExprKind::Call { func, args, kind } => {
                out.push_str(match kind {
                    CallKind::Call => "(Call ",
                    CallKind::Decorate => "(Decorate ",
                });
                func.write_sexpr(out)?;
                write_exprs(out, args)?;
                out.push(')');
            }
            ExprKind::Lambda(lambda) => {
                out.push_str("(Lambda");
                if let Some(name) = &lambda.name {
                    write!(out, " {name}")?;
                }
                out.push_str(" (.parameters");
                for parameter in &lambda.parameters {
                    match &parameter.annotation {
                        Some(annotation) => {
                            write!(out, " ({} ", parameter.name)?;
                            annotation.write_sexpr(out)?;
                            out.push(')');
                        }
                        None => write!(out, " {}", parameter.name)?,
                    }
                }
                out.push(')');
                if !lambda.captures.is_empty() {
                    out.push_str(" (.captures");
                    for capture in &lambda.captures {
                        match capture {
                            CaptureSource::StackRef(offset) => {
                                write!(out, " (StackRef {offset})")?;
                            }
                            CaptureSource::CaptureRef(index) => {
                                write!(out, " (CaptureRef {index})")?;
                            }
                            CaptureSource::External(name) => {
                                write!(out, " (External {name})")?;
                            }
                        }
                    }
                    out.push(')');
                }
                out.push(' ');
                lambda.body.write_sexpr(out)?;
                out.push(')');
            }
            ExprKind::Ternary {
                condition,
                if_true,
                if_false,
            } => {
                out.push_str("(Ternary ");
                condition.write_sexpr(out)?;
                out.push(' ');
                if_true.write_sexpr(out)?;
                out.push(' ');
                if_false.write_sexpr(out)?;
                out.push(')');
            }
            ExprKind::Array(elements) => {
                out.push_str("(Array");
                write_exprs(out, elements)?;
                out.push(')');
            }
            ExprKind::Dict(pairs) => {
                out.push_str("(Dict");
                for (key, value) in pairs {
                    out.push_str(" (");
                    key.write_sexpr(out)?;
                    out.push(' ');
                    value.write_sexpr(out)?;
                    out.push(')');
                }
                out.push(')');
            }
            ExprKind::Literal(literal) => match literal {
                Literal::Number(n) => out.push_str(&format_number(n.get())),
                Literal::String(s) => write!(out, "'{s}'")?,
                Literal::Bool(b) => write!(out, "{b}")?,
                Literal::Void => out.push_str("()"),
            },
        }
        Ok(())
    }
}

fn write_exprs(out: &mut String, exprs: &[Expression]) -> fmt::Result {
    for expr in exprs {
        out.push(' ');
        expr.write_sexpr(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_program_sexpr() {
        let program = Expression::new(
            ExprKind::Program(ProgramExpr {
                statements: vec![Expression::new(
                    ExprKind::Assign {
                        left: "x".into(),
                        right: Box::new(Expression::number(5.0, Span::DUMMY)),
                    },
                    Span::DUMMY,
                )],
                result: Some(Box::new(Expression::new(ExprKind::StackRef(0), Span::DUMMY))),
                exports: vec![],
                bindings: vec![("x".into(), 0)],
            }),
            Span::DUMMY,
        );
        assert_eq!(
            program.to_sexpr(),
            "(Program (.statements (Assign x 5)) (.result (StackRef 0)) (.bindings (x 0)))"
        );
    }

    #[test]
    fn test_call_sexpr() {
        let call = Expression::call(
            Expression::new(ExprKind::Builtin("add".into()), Span::DUMMY),
            vec![
                Expression::number(1.0, Span::DUMMY),
                Expression::string("a", Span::DUMMY),
            ],
            Span::DUMMY,
        );
        assert_eq!(call.to_sexpr(), "(Call (Builtin add) 1 'a')");
        assert_eq!(Expression::number(2.5, Span::DUMMY).as_number(), Some(2.5));
    }
}
