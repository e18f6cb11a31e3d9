//! Lowering of Squiggle syntax trees to the expression IR.
//!
//! # Pipeline Position
//!
//! ```text
//! Source → Lex → Parse → **Compile** → sq_eval
//! ```
//!
//! # What Happens During Lowering
//!
//! 1. **Name resolution** (`scope`): every identifier becomes a stack offset,
//!    a capture index, an import (external) name, or a builtin name.
//!    Unknown names are compile errors.
//! 2. **Desugaring** (`lower`): operators become calls to their named
//!    builtins, lookups become `$_atIndex_$` calls, unit suffixes become
//!    `fromUnit_*` calls, decorators become `Tag.*` calls.
//! 3. **Constant folding** (`const_fold`): arithmetic on number literals and
//!    numeric unit suffixes.
//! 4. **Static arity checks** for calls whose callee is known at compile
//!    time.
//!
//! Before lowering, `unit_types` checks that `::` annotations agree.

mod const_fold;
mod error;
mod lower;
mod scope;
mod unit_types;

pub use const_fold::{numeric_units, unit_multiplier};
pub use error::CompileError;
pub use lower::compile;
pub use unit_types::{check_unit_types, InferredUnit, UnitTypes};

/// Name of the builtin that implements `a.b` and `a[b]`.
pub const INDEX_LOOKUP: &str = "$_atIndex_$";

/// The set of names the compiler may resolve to [`sq_ir::ExprKind::Builtin`].
///
/// Implemented by the runtime's function registry, so the compiler never
/// depends on the evaluator.
pub trait Builtins {
    fn contains(&self, name: &str) -> bool;

    /// Parameter count when every definition of `name` takes the same fixed
    /// number of arguments.
    fn fixed_arity(&self, _name: &str) -> Option<usize> {
        None
    }
}

impl<T: Builtins + ?Sized> Builtins for &T {
    fn contains(&self, name: &str) -> bool {
        (**self).contains(name)
    }

    fn fixed_arity(&self, name: &str) -> Option<usize> {
        (**self).fixed_arity(name)
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
