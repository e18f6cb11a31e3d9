//! Parsed syntax tree.
//!
//! The tree owns its children by value and every node carries the span it
//! was parsed from. It is produced by `sq_parse`, consumed by `sq_compile`,
//! and kept around for location queries (error highlighting).

use crate::{format_number, FloatBits, Span};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};

/// An identifier with its source span.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Ident {
            name: name.into(),
            span,
        }
    }
}

/// `import "path" as variable`
#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct Import {
    pub path: String,
    pub variable: Ident,
    pub span: Span,
}

/// `@name` or `@name(args)` attached to a statement.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct Decorator {
    pub name: Ident,
    pub args: Vec<SyntaxNode>,
    pub span: Span,
}

/// A lambda parameter, optionally annotated with a domain (`x: [0, 10]`)
/// and a unit type (`x :: meters`).
#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct LambdaParameter {
    pub variable: Ident,
    pub annotation: Option<Box<SyntaxNode>>,
    pub unit_type: Option<Box<SyntaxNode>>,
    pub span: Span,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub enum InfixOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    DotAdd,
    DotSubtract,
    DotMultiply,
    DotDivide,
    DotPower,
    Equal,
    NotEqual,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    And,
    Or,
    To,
}

impl InfixOp {
    /// Source spelling of the operator.
    pub fn as_str(self) -> &'static str {
        match self {
            InfixOp::Add => "+",
            InfixOp::Subtract => "-",
            InfixOp::Multiply => "*",
            InfixOp::Divide => "/",
            InfixOp::Power => "^",
            InfixOp::DotAdd => ".+",
            InfixOp::DotSubtract => ".-",
            InfixOp::DotMultiply => ".*",
            InfixOp::DotDivide => "./",
            InfixOp::DotPower => ".^",
            InfixOp::Equal => "==",
            InfixOp::NotEqual => "!=",
            InfixOp::Less => "<",
            InfixOp::LessEq => "<=",
            InfixOp::Greater => ">",
            InfixOp::GreaterEq => ">=",
            InfixOp::And => "&&",
            InfixOp::Or => "||",
            InfixOp::To => "to",
        }
    }

    /// Name of the builtin function the operator desugars to.
    pub fn function_name(self) -> &'static str {
        match self {
            InfixOp::Add => "add",
            InfixOp::Subtract => "subtract",
            InfixOp::Multiply => "multiply",
            InfixOp::Divide => "divide",
            InfixOp::Power => "pow",
            InfixOp::DotAdd => "dotAdd",
            InfixOp::DotSubtract => "dotSubtract",
            InfixOp::DotMultiply => "dotMultiply",
            InfixOp::DotDivide => "dotDivide",
            InfixOp::DotPower => "dotPow",
            InfixOp::Equal => "equal",
            InfixOp::NotEqual => "unequal",
            InfixOp::Less => "smaller",
            InfixOp::LessEq => "smallerEq",
            InfixOp::Greater => "larger",
            InfixOp::GreaterEq => "largerEq",
            InfixOp::And => "and",
            InfixOp::Or => "or",
            InfixOp::To => "to",
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub enum UnaryOp {
    Minus,
    Not,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Minus => "-",
            UnaryOp::Not => "!",
        }
    }

    pub fn function_name(self) -> &'static str {
        match self {
            UnaryOp::Minus => "unaryMinus",
            UnaryOp::Not => "not",
        }
    }
}

/// Operators allowed inside unit-type annotations.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub enum UnitOp {
    Multiply,
    Divide,
}

/// `c ? a : b` versus `if c then a else b`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub enum TernarySyntax {
    C,
    IfThenElse,
}

/// A node of the parsed tree.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    pub span: Span,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub enum NodeKind {
    Program {
        imports: Vec<Import>,
        statements: Vec<SyntaxNode>,
        result: Option<Box<SyntaxNode>>,
    },
    Block {
        statements: Vec<SyntaxNode>,
        result: Box<SyntaxNode>,
    },
    LetStatement {
        variable: Ident,
        unit_type: Option<Box<SyntaxNode>>,
        exported: bool,
        decorators: Vec<Decorator>,
        value: Box<SyntaxNode>,
    },
    DefunStatement {
        variable: Ident,
        exported: bool,
        decorators: Vec<Decorator>,
        /// Always a `Lambda` node.
        value: Box<SyntaxNode>,
    },
    Lambda {
        name: Option<String>,
        args: Vec<LambdaParameter>,
        body: Box<SyntaxNode>,
        return_unit: Option<Box<SyntaxNode>>,
    },
    Call {
        func: Box<SyntaxNode>,
        args: Vec<SyntaxNode>,
    },
    InfixCall {
        op: InfixOp,
        lhs: Box<SyntaxNode>,
        rhs: Box<SyntaxNode>,
    },
    UnaryCall {
        op: UnaryOp,
        arg: Box<SyntaxNode>,
    },
    Pipe {
        left: Box<SyntaxNode>,
        func: Box<SyntaxNode>,
        right_args: Vec<SyntaxNode>,
    },
    DotLookup {
        arg: Box<SyntaxNode>,
        key: String,
    },
    BracketLookup {
        arg: Box<SyntaxNode>,
        key: Box<SyntaxNode>,
    },
    Array(Vec<SyntaxNode>),
    /// Elements are `KeyValue` or `Identifier` (shorthand `{a}`) nodes.
    Dict(Vec<SyntaxNode>),
    KeyValue {
        key: Box<SyntaxNode>,
        value: Box<SyntaxNode>,
    },
    Ternary {
        condition: Box<SyntaxNode>,
        true_expr: Box<SyntaxNode>,
        false_expr: Box<SyntaxNode>,
        syntax: TernarySyntax,
    },
    Identifier(String),
    Float(FloatBits),
    String(String),
    Boolean(bool),
    UnitValue {
        value: Box<SyntaxNode>,
        unit: String,
    },
    UnitName(String),
    ExponentialUnitType {
        base: Box<SyntaxNode>,
        exponent: FloatBits,
    },
    InfixUnitType {
        op: UnitOp,
        lhs: Box<SyntaxNode>,
        rhs: Box<SyntaxNode>,
    },
}

impl SyntaxNode {
    pub fn new(kind: NodeKind, span: Span) -> Self {
        SyntaxNode { kind, span }
    }

    /// Short name of the node kind, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            NodeKind::Program { .. } => "Program",
            NodeKind::Block { .. } => "Block",
            NodeKind::LetStatement { .. } => "LetStatement",
            NodeKind::DefunStatement { .. } => "DefunStatement",
            NodeKind::Lambda { .. } => "Lambda",
            NodeKind::Call { .. } => "Call",
            NodeKind::InfixCall { .. } => "InfixCall",
            NodeKind::UnaryCall { .. } => "UnaryCall",
            NodeKind::Pipe { .. } => "Pipe",
            NodeKind::DotLookup { .. } => "DotLookup",
            NodeKind::BracketLookup { .. } => "BracketLookup",
            NodeKind::Array(_) => "Array",
            NodeKind::Dict(_) => "Dict",
            NodeKind::KeyValue { .. } => "KeyValue",
            NodeKind::Ternary { .. } => "Ternary",
            NodeKind::Identifier(_) => "Identifier",
            NodeKind::Float(_) => "Float",
            NodeKind::String(_) => "String",
            NodeKind::Boolean(_) => "Boolean",
            NodeKind::UnitValue { .. } => "UnitValue",
            NodeKind::UnitName(_) => "UnitName",
            NodeKind::ExponentialUnitType { .. } => "ExponentialUnitType",
            NodeKind::InfixUnitType { .. } => "InfixUnitType",
        }
    }

    /// Imports of a `Program` node; empty for any other node.
    pub fn imports(&self) -> &[Import] {
        match &self.kind {
            NodeKind::Program { imports, .. } => imports,
            _ => &[],
        }
    }

    /// Render the tree as an s-expression, e.g.
    /// `(Program (LetStatement :x (Block 1)))`.
    pub fn to_sexpr(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_sexpr(&mut out);
        out
    }

    fn write_sexpr(&self, out: &mut String) -> fmt::Result {
        match &self.kind {
            NodeKind::Program {
                imports,
                statements,
                result,
            } => {
                out.push_str("(Program");
                for import in imports {
                    write!(out, " (Import '{}' :{})", import.path, import.variable.name)?;
                }
                for statement in statements {
                    out.push(' ');
                    statement.write_sexpr(out)?;
                }
                if let Some(result) = result {
                    out.push(' ');
                    result.write_sexpr(out)?;
                }
                out.push(')');
            }
            NodeKind::Block { statements, result } => {
                out.push_str("(Block");
                for statement in statements {
                    out.push(' ');
                    statement.write_sexpr(out)?;
                }
                out.push(' ');
                result.write_sexpr(out)?;
                out.push(')');
            }
            NodeKind::LetStatement {
                variable,
                exported,
                decorators,
                value,
                ..
            } => {
                out.push_str("(LetStatement");
                write_decorators(out, decorators)?;
                if *exported {
                    out.push_str(" export");
                }
                write!(out, " :{} ", variable.name)?;
                value.write_sexpr(out)?;
                out.push(')');
            }
            NodeKind::DefunStatement {
                variable,
                exported,
                decorators,
                value,
            } => {
                out.push_str("(DefunStatement");
                write_decorators(out, decorators)?;
                if *exported {
                    out.push_str(" export");
                }
                write!(out, " :{} ", variable.name)?;
                value.write_sexpr(out)?;
                out.push(')');
            }
            NodeKind::Lambda { args, body, .. } => {
                out.push_str("(Lambda");
                for arg in args {
                    match &arg.annotation {
                        Some(annotation) => {
                            write!(out, " (IdentifierWithAnnotation :{} ", arg.variable.name)?;
                            annotation.write_sexpr(out)?;
                            out.push(')');
                        }
                        None => write!(out, " :{}", arg.variable.name)?,
                    }
                }
                out.push(' ');
                body.write_sexpr(out)?;
                out.push(')');
            }
            NodeKind::Call { func, args } => {
                out.push_str("(Call ");
                func.write_sexpr(out)?;
                write_list(out, args)?;
                out.push(')');
            }
            NodeKind::InfixCall { op, lhs, rhs } => {
                write!(out, "(InfixCall {} ", op.as_str())?;
                lhs.write_sexpr(out)?;
                out.push(' ');
                rhs.write_sexpr(out)?;
                out.push(')');
            }
            NodeKind::UnaryCall { op, arg } => {
                write!(out, "(UnaryCall {} ", op.as_str())?;
                arg.write_sexpr(out)?;
                out.push(')');
            }
            NodeKind::Pipe {
                left,
                func,
                right_args,
            } => {
                out.push_str("(Pipe ");
                left.write_sexpr(out)?;
                out.push(' ');
                func.write_sexpr(out)?;
                write_list(out, right_args)?;
                out.push(')');
            }
            NodeKind::DotLookup { arg, key } => {
                out.push_str("(DotLookup ");
                arg.write_sexpr(out)?;
                write!(out, " {key})")?;
            }
            NodeKind::BracketLookup { arg, key } => {
                out.push_str("(BracketLookup ");
                arg.write_sexpr(out)?;
                out.push(' ');
                key.write_sexpr(out)?;
                out.push(')');
            }
            NodeKind::Array(elements) => {
                out.push_str("(Array");
                write_list(out, elements)?;
                out.push(')');
            }
            NodeKind::Dict(elements) => {
                out.push_str("(Dict");
                write_list(out, elements)?;
                out.push(')');
            }
            NodeKind::KeyValue { key, value } => {
                out.push_str("(KeyValue ");
                key.write_sexpr(out)?;
                out.push(' ');
                value.write_sexpr(out)?;
                out.push(')');
            }
            NodeKind::Ternary {
                condition,
                true_expr,
                false_expr,
                ..
            } => {
                out.push_str("(Ternary ");
                condition.write_sexpr(out)?;
                out.push(' ');
                true_expr.write_sexpr(out)?;
                out.push(' ');
                false_expr.write_sexpr(out)?;
                out.push(')');
            }
            NodeKind::Identifier(name) => write!(out, ":{name}")?,
            NodeKind::Float(value) => out.push_str(&format_number(value.get())),
            NodeKind::String(value) => write!(out, "'{value}'")?,
            NodeKind::Boolean(value) => write!(out, "{value}")?,
            NodeKind::UnitValue { value, unit } => {
                out.push_str("(UnitValue ");
                value.write_sexpr(out)?;
                write!(out, " {unit})")?;
            }
            NodeKind::UnitName(name) => out.push_str(name),
            NodeKind::ExponentialUnitType { base, exponent } => {
                out.push_str("(ExponentialUnitType ");
                base.write_sexpr(out)?;
                write!(out, " {})", format_number(exponent.get()))?;
            }
            NodeKind::InfixUnitType { op, lhs, rhs } => {
                let op = match op {
                    UnitOp::Multiply => "*",
                    UnitOp::Divide => "/",
                };
                write!(out, "(InfixUnitType {op} ")?;
                lhs.write_sexpr(out)?;
                out.push(' ');
                rhs.write_sexpr(out)?;
                out.push(')');
            }
        }
        Ok(())
    }
}

fn write_list(out: &mut String, nodes: &[SyntaxNode]) -> fmt::Result {
    for node in nodes {
        out.push(' ');
        node.write_sexpr(out)?;
    }
    Ok(())
}

fn write_decorators(out: &mut String, decorators: &[Decorator]) -> fmt::Result {
    for decorator in decorators {
        write!(out, " (Decorator :{}", decorator.name.name)?;
        write_list(out, &decorator.args)?;
        out.push(')');
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn node(kind: NodeKind) -> SyntaxNode {
        SyntaxNode::new(kind, Span::DUMMY)
    }

    fn float(value: f64) -> SyntaxNode {
        node(NodeKind::Float(FloatBits::new(value)))
    }

    #[test]
    fn test_sexpr_let() {
        let program = node(NodeKind::Program {
            imports: vec![],
            statements: vec![node(NodeKind::LetStatement {
                variable: Ident::new("x", Span::DUMMY),
                unit_type: None,
                exported: true,
                decorators: vec![],
                value: Box::new(node(NodeKind::Block {
                    statements: vec![],
                    result: Box::new(float(5.0)),
                })),
            })],
            result: None,
        });
        assert_eq!(program.to_sexpr(), "(Program (LetStatement export :x (Block 5)))");
    }

    #[test]
    fn test_sexpr_dict_and_strings() {
        let dict = node(NodeKind::Dict(vec![
            node(NodeKind::KeyValue {
                key: Box::new(node(NodeKind::String("a".into()))),
                value: Box::new(float(1.0)),
            }),
            node(NodeKind::Identifier("b".into())),
        ]));
        assert_eq!(dict.to_sexpr(), "(Dict (KeyValue 'a' 1) :b)");
    }

    #[test]
    fn test_operator_function_names() {
        assert_eq!(InfixOp::Add.function_name(), "add");
        assert_eq!(InfixOp::Greater.function_name(), "larger");
        assert_eq!(InfixOp::DotPower.as_str(), ".^");
        assert_eq!(UnaryOp::Minus.function_name(), "unaryMinus");
    }
}
