//! Squiggle IR - syntax trees and compiled expressions
//!
//! This crate contains the data structures shared by every engine phase:
//! - Spans and line/column lookup for source locations
//! - `SyntaxNode`, the parsed tree produced by `sq_parse`
//! - `Expression`, the compiled form consumed by the reducer
//! - S-expression printers for both trees (used by tests and the CLI)
//!
//! # Salsa Compatibility
//!
//! Every tree type is `Clone + Eq + Hash + Debug` so it can be returned from
//! tracked queries. Floats are stored as `u64` bits ([`FloatBits`]) to keep
//! `Eq`/`Hash` derivable.

pub mod ast;
mod float;
pub mod ir;
mod span;

pub use ast::{
    Decorator, Ident, Import, InfixOp, LambdaParameter, NodeKind, SyntaxNode, TernarySyntax,
    UnaryOp, UnitOp,
};
pub use float::{format_number, FloatBits};
pub use ir::{
    CallKind, CaptureSource, ExprKind, Expression, LambdaExpr, LambdaExprParameter, Literal,
    ProgramExpr,
};
pub use span::{LineCol, Span, SpanError};
