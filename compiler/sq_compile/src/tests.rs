use super::*;
use pretty_assertions::assert_eq;
use sq_diagnostic::ErrorCode;
use sq_ir::Expression;

struct TestBuiltins;

const NAMES: &[&str] = &[
    "add",
    "subtract",
    "multiply",
    "divide",
    "pow",
    "unaryMinus",
    "not",
    "smaller",
    "to",
    INDEX_LOOKUP,
    "Math.pi",
    "Tag.hide",
    "Tag.name",
    "fromUnit_k",
    "fromUnit_minutes",
    "mean",
    "normal",
];

impl Builtins for TestBuiltins {
    fn contains(&self, name: &str) -> bool {
        NAMES.contains(&name)
    }

    fn fixed_arity(&self, name: &str) -> Option<usize> {
        match name {
            "mean" => Some(1),
            _ => None,
        }
    }
}

fn compile_with(source: &str, externals: &[String]) -> Result<Expression, CompileError> {
    let ast = sq_parse::parse(source, "test").unwrap();
    compile(&ast, &TestBuiltins, externals)
}

fn sexpr(source: &str) -> String {
    compile_with(source, &[]).unwrap().to_sexpr()
}

fn error(source: &str) -> CompileError {
    compile_with(source, &[]).unwrap_err()
}

#[test]
fn test_let_and_reference() {
    assert_eq!(
        sexpr("x = 1\nx"),
        "(Program (.statements (Assign x 1)) (.result (StackRef 0)) (.bindings (x 0)))"
    );
}

#[test]
fn test_stack_offsets_count_from_top() {
    assert_eq!(
        sexpr("a = \"s\"\nb = true\na < b"),
        "(Program (.statements (Assign a 's') (Assign b true)) \
         (.result (Call (Builtin smaller) (StackRef 1) (StackRef 0))) \
         (.bindings (a 0) (b 1)))"
    );
}

#[test]
fn test_constant_folding() {
    assert_eq!(sexpr("1 + 2 * 3"), "(Program (.result 7))");
    assert_eq!(sexpr("-(2 ^ 3)"), "(Program (.result -8))");
    assert_eq!(sexpr("5k"), "(Program (.result 5000))");
    assert_eq!(
        sexpr("1 to 2"),
        "(Program (.result (Call (Builtin to) 1 2)))"
    );
}

#[test]
fn test_shadowed_operator_is_not_folded() {
    assert_eq!(
        sexpr("add(a, b) = a\n1 + 2"),
        "(Program (.statements (Assign add (Lambda add (.parameters a b) (StackRef 1)))) \
         (.result (Call (StackRef 0) 1 2)) (.bindings (add 0)))"
    );
}

#[test]
fn test_time_units_stay_calls() {
    assert_eq!(
        sexpr("5minutes"),
        "(Program (.result (Call (Builtin fromUnit_minutes) 5)))"
    );
}

#[test]
fn test_unknown_unit_function() {
    let err = error("3hours");
    assert_eq!(
        err,
        CompileError::InvalidUnit {
            unit: "hours".into(),
            span: err.span(),
        }
    );
}

#[test]
fn test_lambda_captures() {
    assert_eq!(
        sexpr("x = 1\nf(y) = x + y\nf(2)"),
        "(Program (.statements (Assign x 1) \
         (Assign f (Lambda f (.parameters y) (.captures (StackRef 0)) \
         (Call (Builtin add) (CaptureRef 0) (StackRef 0))))) \
         (.result (Call (StackRef 0) 2)) (.bindings (x 0) (f 1)))"
    );
}

#[test]
fn test_nested_captures_chain() {
    assert_eq!(
        sexpr("x = 1\nf() = {g() = x; g}\nf"),
        "(Program (.statements (Assign x 1) \
         (Assign f (Lambda f (.parameters) (.captures (StackRef 0)) \
         (Block (Assign g (Lambda g (.parameters) (.captures (CaptureRef 0)) (CaptureRef 0))) \
         (StackRef 0))))) \
         (.result (StackRef 0)) (.bindings (x 0) (f 1)))"
    );
}

#[test]
fn test_builtins_are_not_captured() {
    assert_eq!(
        sexpr("f(x) = normal(x, 1)"),
        "(Program (.statements (Assign f (Lambda f (.parameters x) \
         (Call (Builtin normal) (StackRef 0) 1)))) (.bindings (f 0)))"
    );
}

#[test]
fn test_parameter_annotations_use_outer_scope() {
    assert_eq!(
        sexpr("lo = 0\nf(x: [lo, 10]) = x"),
        "(Program (.statements (Assign lo 0) \
         (Assign f (Lambda f (.parameters (x (Array (StackRef 0) 10))) (StackRef 0)))) \
         (.bindings (lo 0) (f 1)))"
    );
}

#[test]
fn test_block_scope() {
    assert_eq!(
        sexpr("x = {a = 1; a}\nx"),
        "(Program (.statements (Assign x (Block (Assign a 1) (StackRef 0)))) \
         (.result (StackRef 0)) (.bindings (x 0)))"
    );
}

#[test]
fn test_no_self_reference() {
    let err = error("f(x) = f(x)");
    assert!(matches!(err, CompileError::UndefinedName { ref name, .. } if name == "f"));
}

#[test]
fn test_undefined_name() {
    let err = error("y + 1");
    assert_eq!(err.to_string(), "`y` is not defined");
    assert_eq!(err.code(), ErrorCode::E2001);
    assert_eq!(err.to_diagnostic().code, ErrorCode::E2001);
}

#[test]
fn test_redefinition_uses_latest_slot() {
    assert_eq!(
        sexpr("x = 1\nx = 2\nx"),
        "(Program (.statements (Assign x 1) (Assign x 2)) (.result (StackRef 0)) (.bindings (x 1)))"
    );
}

#[test]
fn test_exports() {
    assert_eq!(
        sexpr("export x = 1\ny = 2"),
        "(Program (.statements (Assign x 1) (Assign y 2)) (.exports x) (.bindings (x 0) (y 1)))"
    );
    let err = error("x = {export y = 1; y}");
    assert!(matches!(err, CompileError::ExportInBlock { .. }));
    assert_eq!(err.span().start, 5);
}

#[test]
fn test_decorators() {
    assert_eq!(
        sexpr("@name(\"X\")\n@hide\nx = 1"),
        "(Program (.statements (Assign x (Decorate (Builtin Tag.name) \
         (Decorate (Builtin Tag.hide) 1) 'X'))) (.bindings (x 0)))"
    );
    assert!(matches!(
        error("@nope\nx = 1"),
        CompileError::UnknownDecorator { ref name, .. } if name == "nope"
    ));
}

#[test]
fn test_lookups() {
    assert_eq!(
        sexpr("a = [1]\na[0]"),
        "(Program (.statements (Assign a (Array 1))) \
         (.result (Call (Builtin $_atIndex_$) (StackRef 0) 0)) (.bindings (a 0)))"
    );
    assert_eq!(
        sexpr("d = {k: 1}\nd.k"),
        "(Program (.statements (Assign d (Dict ('k' 1)))) \
         (.result (Call (Builtin $_atIndex_$) (StackRef 0) 'k')) (.bindings (d 0)))"
    );
}

#[test]
fn test_dict_shorthand() {
    assert_eq!(
        sexpr("b = 1\n{a: 2, b}"),
        "(Program (.statements (Assign b 1)) (.result (Dict ('a' 2) ('b' (StackRef 0)))) \
         (.bindings (b 0)))"
    );
}

#[test]
fn test_qualified_builtin() {
    assert_eq!(sexpr("Math.pi"), "(Program (.result (Builtin Math.pi)))");
    assert!(matches!(
        error("Math.tau"),
        CompileError::UndefinedName { ref name, .. } if name == "Math.tau"
    ));
}

#[test]
fn test_externals() {
    let externals = vec!["lib".to_string(), "Lib".to_string()];
    let compiled = compile_with("lib.x + Lib.y", &externals).unwrap();
    assert_eq!(
        compiled.to_sexpr(),
        "(Program (.result (Call (Builtin add) \
         (Call (Builtin $_atIndex_$) (External lib) 'x') \
         (Call (Builtin $_atIndex_$) (External Lib) 'y'))))"
    );
}

#[test]
fn test_lambda_captures_external() {
    let externals = vec!["lib".to_string()];
    let compiled = compile_with("f() = lib", &externals).unwrap();
    assert_eq!(
        compiled.to_sexpr(),
        "(Program (.statements (Assign f (Lambda f (.parameters) \
         (.captures (External lib)) (CaptureRef 0)))) (.bindings (f 0)))"
    );
}

#[test]
fn test_arity_checks() {
    let err = error("f(x) = x\nf(1, 2)");
    assert_eq!(
        err.to_string(),
        "1 arguments expected. Instead 2 argument(s) were passed."
    );
    assert_eq!(err.code(), ErrorCode::E2003);
    assert!(matches!(
        error("mean(1, 2)"),
        CompileError::ArityMismatch {
            expected: 1,
            given: 2,
            ..
        }
    ));
    assert!(matches!(
        error("f = {|a, b| a}\n1 -> f"),
        CompileError::ArityMismatch {
            expected: 2,
            given: 1,
            ..
        }
    ));
}

#[test]
fn test_pipe() {
    assert_eq!(
        sexpr("1 -> normal(2)"),
        "(Program (.result (Call (Builtin normal) 1 2)))"
    );
}

fn unit_types(source: &str) -> UnitTypes {
    check_unit_types(&sq_parse::parse(source, "test").unwrap()).unwrap()
}

#[test]
fn test_conflicting_unit_annotations() {
    let source = "a :: meters = 1\nb :: seconds = a\nb";
    let err = error(source);
    assert_eq!(err.code(), ErrorCode::E2005);
    assert_eq!(
        err.to_string(),
        "Conflicting unit types:\n\ta :: meters\n\tb :: seconds\n\tb / a :: <unitless>"
    );
    assert_eq!(&source[err.span().to_range()], "b :: seconds = a");
}

#[test]
fn test_unit_types_are_inferred() {
    let source = "d :: meters = 10\nt :: seconds = 2\nv = d / t\narea = d * d\nr = d / d\nv";
    assert!(compile_with(source, &[]).is_ok());
    let types = unit_types(source);
    assert_eq!(types.get("d"), Some("meters"));
    assert_eq!(types.get("v"), Some("meters / seconds"));
    assert_eq!(types.get("area"), Some("meters^2"));
    assert_eq!(types.get("r"), Some("1"));
    let names: Vec<&str> = types.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, ["d", "t", "v", "area", "r"]);
}

#[test]
fn test_annotation_must_match_inferred_unit() {
    assert!(compile_with("d :: meters = 1\nt :: seconds = 1\nv :: meters/seconds = d / t", &[]).is_ok());
    let err = error("d :: meters = 1\nt :: seconds = 1\nv :: meters*seconds = d / t");
    assert_eq!(err.code(), ErrorCode::E2005);
}

#[test]
fn test_matching_operators_need_equal_units() {
    let source = "d :: meters = 1\nt :: seconds = 2\nd + t";
    let err = error(source);
    assert!(matches!(err, CompileError::ConflictingUnitTypes { .. }));
    assert_eq!(&source[err.span().to_range()], "d + t");
    assert!(err.to_string().ends_with("\td / t :: <unitless>"));

    let err = error("a :: meters = 1\nb :: kg = 2\na < b");
    assert_eq!(err.code(), ErrorCode::E2005);
    // Powers are unconstrained.
    assert!(compile_with("a :: meters = 1\nb :: kg = 2\nc = a ^ b", &[]).is_ok());
}

#[test]
fn test_function_unit_annotations() {
    assert!(compile_with(
        "speed(d :: meters, t :: seconds) :: meters/seconds = d / t\nspeed(1, 2)",
        &[]
    )
    .is_ok());
    let err = error("f(x :: meters) :: seconds = x\nf(1)");
    assert_eq!(err.code(), ErrorCode::E2005);
    // Parameters and locals in different functions are independent.
    assert!(compile_with("f(x :: meters) = x\ng(x :: seconds) = x\nf(1) + g(1)", &[]).is_ok());
}

#[test]
fn test_programs_without_units_are_unconstrained() {
    assert!(compile_with("f(x, y) = x + y\nz = f(1, 2) * 3\nz < 4", &[]).is_ok());
    assert_eq!(unit_types("x = 1\ny = x + 2").iter().count(), 0);
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_compile_is_deterministic(a in 0u32..1000, b in 0u32..1000) {
            let source = format!("x = {a}\ny(z) = x * z + {b}\ny({b})");
            prop_assert_eq!(sexpr(&source), sexpr(&source));
        }

        #[test]
        fn test_addition_folds(a in 0u32..1000, b in 0u32..1000) {
            let expected = format!("(Program (.result {}))", a + b);
            prop_assert_eq!(sexpr(&format!("{a} + {b}")), expected);
        }
    }
}
