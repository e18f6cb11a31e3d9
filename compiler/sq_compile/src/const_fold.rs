//! Constant folding during lowering.
//!
//! Integrated into the lowering pass, not a separate traversal. After
//! lowering the operands of an operator call, the lowerer asks here whether
//! the call can be replaced by a number literal.
//!
//! Scope is deliberately small:
//! - unary minus on a number literal
//! - `add`, `subtract`, `multiply`, `divide`, `pow` on two number literals
//! - numeric unit suffixes on a number literal (`5k`, `10%`)
//!
//! Folding only applies when the operator resolved to the builtin of the same
//! name; a user binding that shadows `add` disables it.

use sq_ir::Expression;

/// Scale factors for unit suffixes that produce plain numbers.
const NUMERIC_UNITS: &[(&str, f64)] = &[
    ("%", 0.01),
    ("n", 1e-9),
    ("m", 1e-3),
    ("k", 1e3),
    ("M", 1e6),
    ("B", 1e9),
    ("G", 1e9),
    ("T", 1e12),
    ("P", 1e15),
];

/// Multiplier for a numeric unit suffix, `None` for time units and unknown
/// names.
pub fn unit_multiplier(unit: &str) -> Option<f64> {
    NUMERIC_UNITS
        .iter()
        .find(|(name, _)| *name == unit)
        .map(|(_, scale)| *scale)
}

/// All numeric unit suffixes and their multipliers.
pub fn numeric_units() -> impl Iterator<Item = (&'static str, f64)> {
    NUMERIC_UNITS.iter().copied()
}

pub(crate) fn fold_binary(function: &str, lhs: &Expression, rhs: &Expression) -> Option<f64> {
    let (a, b) = (lhs.as_number()?, rhs.as_number()?);
    match function {
        "add" => Some(a + b),
        "subtract" => Some(a - b),
        "multiply" => Some(a * b),
        "divide" => Some(a / b),
        "pow" => Some(a.powf(b)),
        _ => None,
    }
}

pub(crate) fn fold_unary(function: &str, arg: &Expression) -> Option<f64> {
    match function {
        "unaryMinus" => arg.as_number().map(|n| -n),
        _ => None,
    }
}

pub(crate) fn fold_unit(unit: &str, value: &Expression) -> Option<f64> {
    Some(value.as_number()? * unit_multiplier(unit)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sq_ir::Span;

    fn n(value: f64) -> Expression {
        Expression::number(value, Span::DUMMY)
    }

    #[test]
    fn test_fold_binary() {
        assert_eq!(fold_binary("add", &n(1.0), &n(2.0)), Some(3.0));
        assert_eq!(fold_binary("pow", &n(2.0), &n(10.0)), Some(1024.0));
        assert_eq!(fold_binary("equal", &n(1.0), &n(1.0)), None);
        assert_eq!(
            fold_binary("add", &n(1.0), &Expression::string("a", Span::DUMMY)),
            None
        );
    }

    #[test]
    fn test_fold_units() {
        assert_eq!(fold_unit("k", &n(5.0)), Some(5000.0));
        assert_eq!(fold_unit("minutes", &n(5.0)), None);
        assert_eq!(unit_multiplier("%"), Some(0.01));
        assert_eq!(numeric_units().count(), 9);
    }

    #[test]
    fn test_fold_unary() {
        assert_eq!(fold_unary("unaryMinus", &n(2.0)), Some(-2.0));
        assert_eq!(fold_unary("not", &n(2.0)), None);
    }
}
